//! The verification runner.
//!
//! One call to [`VerificationRunner::run`] owns one session from launch to
//! close:
//!
//! ```text
//! NotStarted -> SessionAcquired -> (Seeded) -> Stepping(i) -> {Success, Failure} -> Closed
//! ```
//!
//! Step errors never escape `run`; they become a `Failure` report with the
//! step index and a diagnostic screenshot. Only configuration errors and a
//! failed session launch are returned as `Err`.

use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::artifacts::ArtifactWriter;
use crate::config::RunConfig;
use crate::fixture::Fixture;
use crate::report::{CaptureIssue, RunPhase, RunReport, RunStatus, StepFailure};
use crate::result::{FailureKind, VerifyError, VerifyResult};
use crate::scenario::{Step, StepAction};
use crate::selector::Selector;
use crate::session::{ElementState, Session, SessionLauncher};
use crate::wait::{Poller, WaitOptions};

/// Runs scenarios against sessions from a launcher
#[derive(Debug, Clone)]
pub struct VerificationRunner<L> {
    launcher: L,
}

impl<L: SessionLauncher> VerificationRunner<L> {
    /// Create a runner
    #[must_use]
    pub const fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// The launcher sessions come from
    #[must_use]
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Execute one scenario end to end
    pub async fn run(
        &self,
        fixture: Option<&Fixture>,
        steps: &[Step],
        config: &RunConfig,
    ) -> VerifyResult<RunReport> {
        config.validate()?;
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            scenario = %config.scenario_name,
            base_url = %config.base_url,
            steps = steps.len(),
            seeded = fixture.is_some(),
            "starting verification run"
        );

        let mut run = RunState::new(config);
        let mut session = self.launcher.launch(config).await.map_err(|e| match e {
            VerifyError::SessionAcquisition { .. } => e,
            other => VerifyError::session(other),
        })?;
        run.enter(RunPhase::SessionAcquired);

        let outcome = run.drive(&mut session, fixture, steps).await;
        let status = match outcome {
            Ok(()) => {
                run.enter(RunPhase::Success);
                RunStatus::Success
            }
            Err(failed) => {
                run.fail(&mut session, failed).await;
                run.enter(RunPhase::Failure);
                RunStatus::Failure
            }
        };

        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close browser session");
        }
        run.enter(RunPhase::Closed);

        let report = RunReport {
            scenario: config.scenario_name.clone(),
            status,
            artifacts: run.artifacts,
            failure: run.failure,
            capture_issues: run.capture_issues,
            steps_completed: run.steps_completed,
            phases: run.phases,
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        match &report.failure {
            None => info!(scenario = %report.scenario, artifacts = report.artifacts.len(), "run passed"),
            Some(failure) => info!(scenario = %report.scenario, %failure, "run failed"),
        }
        Ok(report)
    }
}

/// A failure before the report is assembled
#[derive(Debug)]
struct Failed {
    step_index: Option<usize>,
    error: VerifyError,
}

impl Failed {
    const fn setup(error: VerifyError) -> Self {
        Self {
            step_index: None,
            error,
        }
    }

    const fn step(index: usize, error: VerifyError) -> Self {
        Self {
            step_index: Some(index),
            error,
        }
    }
}

/// Mutable bookkeeping for one run
struct RunState<'a> {
    config: &'a RunConfig,
    writer: ArtifactWriter,
    phases: Vec<RunPhase>,
    artifacts: Vec<PathBuf>,
    capture_issues: Vec<CaptureIssue>,
    failure: Option<StepFailure>,
    steps_completed: usize,
}

impl<'a> RunState<'a> {
    fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            writer: ArtifactWriter::new(&config.screenshot_dir, &config.scenario_name),
            phases: vec![RunPhase::NotStarted],
            artifacts: Vec::new(),
            capture_issues: Vec::new(),
            failure: None,
            steps_completed: 0,
        }
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(%phase, "run phase");
        self.phases.push(phase);
    }

    async fn drive<S: Session>(
        &mut self,
        session: &mut S,
        fixture: Option<&Fixture>,
        steps: &[Step],
    ) -> Result<(), Failed> {
        let url = self.config.base_url.clone();
        session
            .goto(&url)
            .await
            .map_err(|e| Failed::setup(as_navigation(&url, e)))?;

        if let Some(fixture) = fixture {
            self.seed(session, fixture).await.map_err(Failed::setup)?;
            self.enter(RunPhase::Seeded);
        }

        for (index, step) in steps.iter().enumerate() {
            self.enter(RunPhase::Stepping(index));
            debug!(index, %step, "executing step");
            self.execute(session, index, step)
                .await
                .map_err(|e| Failed::step(index, e))?;
            self.steps_completed += 1;
        }
        Ok(())
    }

    /// Write the fixture and reload so the application reads it at startup
    async fn seed<S: Session>(&mut self, session: &mut S, fixture: &Fixture) -> VerifyResult<()> {
        let seed = fixture.seed(&self.config.storage_key, self.config.clear_storage)?;
        debug!(
            key = %seed.key,
            bytes = seed.payload.len(),
            collections = ?fixture.collections(),
            "seeding storage"
        );
        let stored = session
            .evaluate(&seed.to_script())
            .await
            .map_err(|e| match e {
                VerifyError::SeedInjection { .. } => e,
                other => VerifyError::seed(other),
            })?;
        if stored != serde_json::Value::Bool(true) {
            return Err(VerifyError::seed(format!(
                "value under {:?} did not read back as written (got {stored})",
                seed.key
            )));
        }
        let url = self.config.base_url.clone();
        session
            .reload()
            .await
            .map_err(|e| as_navigation(&url, e))
    }

    async fn execute<S: Session>(
        &mut self,
        session: &mut S,
        index: usize,
        step: &Step,
    ) -> VerifyResult<()> {
        let started = Instant::now();
        match &step.action {
            StepAction::Click { selector } => {
                self.wait_for_visible(session, selector, step)
                    .await
                    .map_err(|(state, message)| VerifyError::ElementNotFound {
                        selector: selector.to_string(),
                        timeout_ms: step.timeout().as_millis() as u64,
                        message: not_found_message(state, message),
                    })?;
                let budget = step.timeout().saturating_sub(started.elapsed());
                let clicked = match tokio::time::timeout(budget, session.click(selector)).await {
                    Ok(result) => result.map_err(|e| format!("click failed: {e}")),
                    Err(_) => Err("click did not complete within the step timeout".to_string()),
                };
                clicked.map_err(|message| VerifyError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout_ms: step.timeout().as_millis() as u64,
                    message,
                })
            }
            StepAction::AssertVisible { selector } => self
                .wait_for_visible(session, selector, step)
                .await
                .map_err(|(state, message)| VerifyError::AssertionTimeout {
                    selector: selector.to_string(),
                    timeout_ms: step.timeout().as_millis() as u64,
                    message: not_visible_message(state, message),
                }),
            StepAction::Capture { selector } => {
                if let Some(selector) = selector {
                    self.wait_for_attached(session, selector, step)
                        .await
                        .map_err(|(state, message)| VerifyError::ElementNotFound {
                            selector: selector.to_string(),
                            timeout_ms: step.timeout().as_millis() as u64,
                            message: not_found_message(state, message),
                        })?;
                }
                let path = self.writer.capture_path(index, step.label.as_deref());
                match self.screenshot(session, selector.as_ref(), &path).await {
                    Ok(path) => {
                        debug!(path = %path.display(), "captured screenshot");
                        self.artifacts.push(path);
                    }
                    Err(e) => {
                        warn!(index, error = %e, "screenshot failed; continuing");
                        self.capture_issues.push(CaptureIssue {
                            step_index: Some(index),
                            diagnostic: false,
                            message: e.to_string(),
                        });
                    }
                }
                Ok(())
            }
            StepAction::Pause { ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
                Ok(())
            }
        }
    }

    async fn wait_for_visible<S: Session>(
        &self,
        session: &mut S,
        selector: &Selector,
        step: &Step,
    ) -> Result<(), (ElementState, Option<String>)> {
        self.wait_for_state(session, selector, step, ElementState::is_visible)
            .await
    }

    async fn wait_for_attached<S: Session>(
        &self,
        session: &mut S,
        selector: &Selector,
        step: &Step,
    ) -> Result<(), (ElementState, Option<String>)> {
        self.wait_for_state(session, selector, step, ElementState::is_attached)
            .await
    }

    /// Poll until `ready` holds; on timeout return the last observed state
    async fn wait_for_state<S: Session>(
        &self,
        session: &mut S,
        selector: &Selector,
        step: &Step,
        ready: fn(ElementState) -> bool,
    ) -> Result<(), (ElementState, Option<String>)> {
        let options = WaitOptions::new()
            .with_timeout(step.timeout().as_millis() as u64)
            .with_poll_interval(self.config.poll_interval_ms);
        let mut last = ElementState::Missing;
        let mut poller = Poller::start(options);
        let reached = loop {
            // A state query stuck in the page must not outlive the step
            match tokio::time::timeout(poller.remaining(), session.element_state(selector)).await
            {
                Ok(Ok(state)) => {
                    last = state;
                    if ready(state) {
                        break true;
                    }
                }
                Ok(Err(e)) => poller.record_error(&e),
                Err(_) => {
                    poller.record_error(&"element state query did not answer before the step timeout");
                    break false;
                }
            }
            if !poller.tick().await {
                break false;
            }
        };
        let result = poller.finish(reached.then_some(()));
        debug!(
            %selector,
            ready = result.is_ready(),
            attempts = result.attempts,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "wait finished"
        );
        if result.is_ready() {
            Ok(())
        } else {
            Err((last, result.last_error))
        }
    }

    /// Viewport screenshot, or the element's box when `target` is given
    async fn screenshot<S: Session>(
        &self,
        session: &mut S,
        target: Option<&Selector>,
        path: &std::path::Path,
    ) -> VerifyResult<PathBuf> {
        let shot = match target {
            Some(selector) => session.element_screenshot(selector).await,
            None => session.screenshot().await,
        };
        let bytes = shot.map_err(|e| match e {
            VerifyError::Capture { .. } => e,
            other => VerifyError::capture(other),
        })?;
        self.writer.write(path, &bytes).map_err(VerifyError::capture)
    }

    /// Record the failure and take the single diagnostic screenshot
    async fn fail<S: Session>(&mut self, session: &mut S, failed: Failed) {
        let Failed { step_index, error } = failed;
        let kind = error.kind().unwrap_or(FailureKind::NavigationFailure);
        warn!(step = ?step_index, %kind, error = %error, "run failed");

        let path = self.writer.diagnostic_path(step_index);
        let diagnostic = match self.screenshot(session, None, &path).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "diagnostic screenshot failed");
                self.capture_issues.push(CaptureIssue {
                    step_index,
                    diagnostic: true,
                    message: e.to_string(),
                });
                None
            }
        };

        let console = session.recent_console();
        if !console.is_empty() {
            debug!(lines = console.len(), "attaching page console output to failure");
        }

        self.failure = Some(StepFailure {
            step_index,
            kind,
            cause: error.to_string(),
            diagnostic,
            console,
        });
    }
}

fn as_navigation(url: &str, error: VerifyError) -> VerifyError {
    match error {
        VerifyError::Navigation { .. } => error,
        other => VerifyError::navigation(url, other),
    }
}

fn not_found_message(state: ElementState, last_error: Option<String>) -> String {
    let base = match state {
        ElementState::Missing => "selector never matched an element".to_string(),
        ElementState::Hidden => "element matched but never became visible".to_string(),
        ElementState::Visible => "element was not actionable".to_string(),
    };
    with_last_error(base, last_error)
}

fn not_visible_message(state: ElementState, last_error: Option<String>) -> String {
    let base = match state {
        ElementState::Missing => "selector never matched an element".to_string(),
        ElementState::Hidden | ElementState::Visible => {
            "element stayed hidden".to_string()
        }
    };
    with_last_error(base, last_error)
}

fn with_last_error(base: String, last_error: Option<String>) -> String {
    match last_error {
        Some(e) => format!("{base} (last error: {e})"),
        None => base,
    }
}

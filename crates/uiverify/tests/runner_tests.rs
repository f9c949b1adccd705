//! End-to-end runner behaviour against a scripted in-memory session.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use uiverify::{
    ElementState, FailureKind, Fixture, RunConfig, RunPhase, RunStatus, Selector, Session,
    SessionLauncher, Step, VerificationRunner, VerifyError, VerifyResult,
};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// ============================================================================
// Scripted session
// ============================================================================

/// What the fake page does
#[derive(Debug, Default, Clone)]
struct Script {
    /// States returned by successive queries of a selector; the last repeats
    states: HashMap<String, Vec<ElementState>>,
    /// Page hangs this long before answering a state query
    state_delay: Option<Duration>,
    /// Page hangs this long before a click lands
    click_delay: Option<Duration>,
    /// Console lines the page has printed
    console: Vec<String>,
    /// The stored value reads back different from what was written
    seed_mismatch: bool,
    fail_launch: bool,
    fail_goto: bool,
    fail_evaluate: bool,
    fail_click: bool,
    fail_screenshot: bool,
}

impl Script {
    fn with_state(mut self, selector: &str, states: &[ElementState]) -> Self {
        let key = Selector::parse(selector).unwrap().to_string();
        self.states.insert(key, states.to_vec());
        self
    }
}

/// What the fake page saw
#[derive(Debug, Default)]
struct Log {
    launches: u32,
    closes: u32,
    calls: Vec<String>,
    scripts: Vec<String>,
    queries: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct FakeLauncher {
    script: Arc<Script>,
    log: Arc<Mutex<Log>>,
}

impl FakeLauncher {
    fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            log: Arc::new(Mutex::new(Log::default())),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    fn scripts(&self) -> Vec<String> {
        self.log.lock().unwrap().scripts.clone()
    }

    fn closes(&self) -> u32 {
        self.log.lock().unwrap().closes
    }

    fn launches(&self) -> u32 {
        self.log.lock().unwrap().launches
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _config: &RunConfig) -> VerifyResult<FakeSession> {
        self.log.lock().unwrap().launches += 1;
        if self.script.fail_launch {
            return Err(VerifyError::session("chromium not found"));
        }
        Ok(FakeSession {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
        })
    }
}

#[derive(Debug)]
struct FakeSession {
    script: Arc<Script>,
    log: Arc<Mutex<Log>>,
}

impl FakeSession {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().unwrap().calls.push(call.into());
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn goto(&mut self, url: &str) -> VerifyResult<()> {
        self.record(format!("goto {url}"));
        if self.script.fail_goto {
            return Err(VerifyError::browser("net::ERR_CONNECTION_REFUSED"));
        }
        Ok(())
    }

    async fn reload(&mut self) -> VerifyResult<()> {
        self.record("reload");
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> VerifyResult<serde_json::Value> {
        self.record("evaluate");
        self.log.lock().unwrap().scripts.push(script.to_string());
        if self.script.fail_evaluate {
            return Err(VerifyError::browser("QuotaExceededError"));
        }
        if script.contains("localStorage.setItem") {
            return Ok(json!(!self.script.seed_mismatch));
        }
        Ok(json!(script.len()))
    }

    async fn element_state(&mut self, selector: &Selector) -> VerifyResult<ElementState> {
        if let Some(delay) = self.script.state_delay {
            tokio::time::sleep(delay).await;
        }
        let key = selector.to_string();
        let mut log = self.log.lock().unwrap();
        let seen = log.queries.entry(key.clone()).or_insert(0);
        let state = match self.script.states.get(&key) {
            Some(states) if !states.is_empty() => states[(*seen).min(states.len() - 1)],
            _ => ElementState::Missing,
        };
        *seen += 1;
        Ok(state)
    }

    async fn click(&mut self, selector: &Selector) -> VerifyResult<()> {
        if let Some(delay) = self.script.click_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(format!("click {selector}"));
        if self.script.fail_click {
            return Err(VerifyError::browser("node is detached"));
        }
        Ok(())
    }

    async fn screenshot(&mut self) -> VerifyResult<Vec<u8>> {
        self.record("screenshot");
        if self.script.fail_screenshot {
            return Err(VerifyError::browser("target crashed"));
        }
        Ok(PNG_MAGIC.to_vec())
    }

    async fn element_screenshot(&mut self, selector: &Selector) -> VerifyResult<Vec<u8>> {
        self.record(format!("element_screenshot {selector}"));
        if self.script.fail_screenshot {
            return Err(VerifyError::browser("target crashed"));
        }
        Ok(PNG_MAGIC.to_vec())
    }

    fn recent_console(&self) -> Vec<String> {
        self.script.console.clone()
    }

    async fn close(self) -> VerifyResult<()> {
        self.record("close");
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn config(dir: &Path, scenario: &str) -> RunConfig {
    RunConfig::new("http://localhost:5173")
        .with_screenshot_dir(dir)
        .with_scenario_name(scenario)
        .with_poll_interval(1)
}

fn wallet_fixture() -> Fixture {
    Fixture::new(json!({
        "wallets": [
            {"id": "w1", "name": "Main Bank", "type": "BANK", "balance": 5000, "color": "#10B981"}
        ],
        "transactions": [],
        "commitments": []
    }))
}

fn files_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Success paths
// ============================================================================

#[tokio::test]
async fn test_empty_scenario_succeeds_without_artifacts() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher.clone());

    let report = runner
        .run(None, &[], &config(dir.path(), "empty"))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Success);
    assert!(report.artifacts.is_empty());
    assert!(report.failure.is_none());
    assert_eq!(report.steps_completed, 0);
    assert_eq!(
        report.phases,
        vec![
            RunPhase::NotStarted,
            RunPhase::SessionAcquired,
            RunPhase::Success,
            RunPhase::Closed
        ]
    );
    assert_eq!(launcher.closes(), 1);
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_seeded_home_view_is_captured() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(
        Script::default().with_state("wallets-heading", &[ElementState::Visible]),
    );
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::assert_visible(Selector::test_id("wallets-heading")),
        Step::capture(),
    ];

    let report = runner
        .run(Some(&wallet_fixture()), &steps, &config(dir.path(), "home"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.steps_completed, 2);
    assert_eq!(report.artifacts, vec![dir.path().join("home-01-capture.png")]);
    assert_eq!(std::fs::read(&report.artifacts[0]).unwrap(), PNG_MAGIC);

    let calls = launcher.calls();
    assert_eq!(
        &calls[..3],
        &["goto http://localhost:5173", "evaluate", "reload"]
    );
    assert_eq!(calls.last().map(String::as_str), Some("close"));

    let seed = &launcher.scripts()[0];
    assert!(seed.contains("moneyfest_lite_v2"));
    assert!(seed.contains("Main Bank"));
    assert!(seed.contains("localStorage.clear()"));
    assert!(report.phases.contains(&RunPhase::Seeded));
}

#[tokio::test]
async fn test_keep_storage_skips_clear() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher.clone());
    let config = config(dir.path(), "keep")
        .with_clear_storage(false)
        .with_storage_key("custom_key");

    let report = runner
        .run(Some(&wallet_fixture()), &[], &config)
        .await
        .unwrap();

    assert!(report.is_success());
    let seed = &launcher.scripts()[0];
    assert!(seed.contains("custom_key"));
    assert!(!seed.contains("localStorage.clear()"));
}

#[tokio::test]
async fn test_click_waits_until_visible() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default().with_state(
        "commitments-button",
        &[
            ElementState::Missing,
            ElementState::Hidden,
            ElementState::Visible,
        ],
    ));
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![Step::click(Selector::test_id("commitments-button")).with_timeout(2_000)];

    let report = runner
        .run(None, &steps, &config(dir.path(), "click"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(launcher
        .calls()
        .contains(&"click testid=commitments-button".to_string()));
}

#[tokio::test]
async fn test_labels_and_pause() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher);
    let steps = vec![
        Step::capture().with_label("before"),
        Step::pause(5),
        Step::capture().with_label("after pause"),
    ];

    let report = runner
        .run(None, &steps, &config(dir.path(), "Commitments View"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        files_in(dir.path()),
        vec![
            "Commitments_View-00-before.png".to_string(),
            "Commitments_View-02-after_pause.png".to_string(),
        ]
    );
    assert_eq!(
        report.phases,
        vec![
            RunPhase::NotStarted,
            RunPhase::SessionAcquired,
            RunPhase::Stepping(0),
            RunPhase::Stepping(1),
            RunPhase::Stepping(2),
            RunPhase::Success,
            RunPhase::Closed,
        ]
    );
}

#[tokio::test]
async fn test_capture_with_selector_shoots_the_element() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default().with_state(
        "wallet-card-w1",
        &[ElementState::Missing, ElementState::Hidden],
    ));
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::capture_element(Selector::test_id("wallet-card-w1"))
            .with_label("card")
            .with_timeout(2_000),
    ];

    let report = runner
        .run(None, &steps, &config(dir.path(), "wallet"))
        .await
        .unwrap();

    // attached is enough; the element need not be visible
    assert!(report.is_success());
    assert_eq!(report.artifacts, vec![dir.path().join("wallet-00-card.png")]);
    assert_eq!(std::fs::read(&report.artifacts[0]).unwrap(), PNG_MAGIC);
    let calls = launcher.calls();
    assert!(calls.contains(&"element_screenshot testid=wallet-card-w1".to_string()));
    assert!(!calls.contains(&"screenshot".to_string()));
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_artifacts() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(
        Script::default().with_state("wallets-heading", &[ElementState::Visible]),
    );
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::assert_visible(Selector::test_id("wallets-heading")),
        Step::capture(),
    ];
    let config = config(dir.path(), "home");

    let first = runner
        .run(Some(&wallet_fixture()), &steps, &config)
        .await
        .unwrap();
    let second = runner
        .run(Some(&wallet_fixture()), &steps, &config)
        .await
        .unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(files_in(dir.path()).len(), 1);
    assert_eq!(launcher.launches(), 2);
    assert_eq!(launcher.closes(), 2);
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_missing_click_target_fails_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::click(Selector::test_id("commitments-button")).with_timeout(20),
        Step::capture(),
    ];

    let report = runner
        .run(Some(&wallet_fixture()), &steps, &config(dir.path(), "commitments"))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Failure);
    assert_eq!(report.failing_step(), Some(0));
    assert_eq!(report.failure_kind(), Some(FailureKind::ElementNotFound));
    assert_eq!(report.steps_completed, 0);
    assert!(report.artifacts.is_empty());

    let failure = report.failure.as_ref().unwrap();
    assert!(failure.cause.contains("commitments-button"));
    assert!(failure.cause.contains("never matched"));
    assert_eq!(
        failure.diagnostic.as_deref(),
        Some(dir.path().join("commitments-error-00.png").as_path())
    );
    assert_eq!(files_in(dir.path()), vec!["commitments-error-00.png"]);

    // later steps never ran and no click was attempted
    let calls = launcher.calls();
    assert!(!calls.iter().any(|c| c.starts_with("click")));
    assert_eq!(calls.iter().filter(|c| *c == "screenshot").count(), 1);
    assert_eq!(launcher.closes(), 1);
    assert_eq!(
        &report.phases[report.phases.len() - 2..],
        &[RunPhase::Failure, RunPhase::Closed]
    );
}

#[tokio::test]
async fn test_hidden_element_times_out_assertion() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(
        Script::default()
            .with_state("wallets-heading", &[ElementState::Visible])
            .with_state("css=.modal", &[ElementState::Hidden]),
    );
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::assert_visible(Selector::test_id("wallets-heading")),
        Step::assert_visible(Selector::css(".modal")).with_timeout(15),
    ];

    let report = runner
        .run(None, &steps, &config(dir.path(), "modal"))
        .await
        .unwrap();

    assert_eq!(report.failing_step(), Some(1));
    assert_eq!(report.failure_kind(), Some(FailureKind::AssertionTimeout));
    assert_eq!(report.steps_completed, 1);
    let failure = report.failure.unwrap();
    assert!(failure.cause.contains("stayed hidden"));
    assert!(failure.cause.contains("15ms"));
    assert!(dir.path().join("modal-error-01.png").exists());
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_capture_with_missing_selector_fails_step() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![
        Step::capture_element(Selector::test_id("wallet-card-w9")).with_timeout(20),
        Step::capture(),
    ];

    let report = runner
        .run(None, &steps, &config(dir.path(), "wallet"))
        .await
        .unwrap();

    assert_eq!(report.failing_step(), Some(0));
    assert_eq!(report.failure_kind(), Some(FailureKind::ElementNotFound));
    assert_eq!(report.steps_completed, 0);
    assert!(report.artifacts.is_empty());
    let failure = report.failure.as_ref().unwrap();
    assert!(failure.cause.contains("wallet-card-w9"));
    assert_eq!(
        failure.diagnostic.as_deref(),
        Some(dir.path().join("wallet-error-00.png").as_path())
    );
    assert_eq!(files_in(dir.path()), vec!["wallet-error-00.png"]);
    assert!(!launcher
        .calls()
        .iter()
        .any(|c| c.starts_with("element_screenshot")));
}

#[tokio::test]
async fn test_stalled_state_query_is_bounded_by_step_timeout() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        state_delay: Some(Duration::from_millis(1_500)),
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![Step::assert_visible(Selector::test_id("wallets-heading")).with_timeout(50)];

    let started = Instant::now();
    let report = runner
        .run(None, &steps, &config(dir.path(), "stall"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(1_000));
    assert_eq!(report.failing_step(), Some(0));
    assert_eq!(report.failure_kind(), Some(FailureKind::AssertionTimeout));
    assert!(report
        .failure
        .unwrap()
        .cause
        .contains("did not answer before the step timeout"));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_stalled_click_is_bounded_by_step_timeout() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        click_delay: Some(Duration::from_millis(1_500)),
        ..Script::default().with_state("add-card", &[ElementState::Visible])
    });
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![Step::click(Selector::test_id("add-card")).with_timeout(50)];

    let started = Instant::now();
    let report = runner
        .run(None, &steps, &config(dir.path(), "stall"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(1_000));
    assert_eq!(report.failure_kind(), Some(FailureKind::ElementNotFound));
    assert!(report
        .failure
        .unwrap()
        .cause
        .contains("click did not complete within the step timeout"));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_failure_carries_page_console() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        console: vec![
            "[log] loaded 1 wallet".to_string(),
            "[pageerror] TypeError: wallets.map is not a function".to_string(),
        ],
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher);
    let steps = vec![Step::assert_visible(Selector::test_id("wallets-heading")).with_timeout(5)];

    let report = runner
        .run(None, &steps, &config(dir.path(), "console"))
        .await
        .unwrap();

    let failure = report.failure.unwrap();
    assert_eq!(failure.console.len(), 2);
    assert!(failure.console[1].contains("wallets.map is not a function"));
}

#[tokio::test]
async fn test_click_error_is_element_not_found() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_click: true,
        ..Script::default().with_state("add-card", &[ElementState::Visible])
    });
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![Step::click(Selector::test_id("add-card"))];

    let report = runner
        .run(None, &steps, &config(dir.path(), "cards"))
        .await
        .unwrap();

    assert_eq!(report.failure_kind(), Some(FailureKind::ElementNotFound));
    assert!(report.failure.unwrap().cause.contains("node is detached"));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_launch_failure_is_an_error_without_artifacts() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_launch: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());

    let err = runner
        .run(Some(&wallet_fixture()), &[Step::capture()], &config(dir.path(), "x"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::SessionAcquisitionFailure));
    assert!(files_in(dir.path()).is_empty());
    assert_eq!(launcher.closes(), 0);
}

#[tokio::test]
async fn test_invalid_config_never_launches() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script::default());
    let runner = VerificationRunner::new(launcher.clone());
    let config = RunConfig::new("").with_screenshot_dir(dir.path());

    let err = runner.run(None, &[], &config).await.unwrap_err();

    assert!(matches!(err, VerifyError::Config { .. }));
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test]
async fn test_navigation_failure_has_no_step_index() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_goto: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());

    let report = runner
        .run(Some(&wallet_fixture()), &[Step::capture()], &config(dir.path(), "nav"))
        .await
        .unwrap();

    assert_eq!(report.failure_kind(), Some(FailureKind::NavigationFailure));
    assert_eq!(report.failing_step(), None);
    assert!(report.failure.as_ref().unwrap().cause.contains("ERR_CONNECTION_REFUSED"));
    assert_eq!(files_in(dir.path()), vec!["nav-error-seed.png"]);
    assert!(!report.phases.contains(&RunPhase::Seeded));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_seed_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_evaluate: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());

    let report = runner
        .run(Some(&wallet_fixture()), &[Step::capture()], &config(dir.path(), "seed"))
        .await
        .unwrap();

    assert_eq!(report.failure_kind(), Some(FailureKind::SeedInjectionFailure));
    assert_eq!(report.failing_step(), None);
    assert!(report.artifacts.is_empty());
    assert!(!launcher.calls().contains(&"reload".to_string()));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn test_seed_that_does_not_read_back_is_reported() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        seed_mismatch: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());

    let report = runner
        .run(Some(&wallet_fixture()), &[Step::capture()], &config(dir.path(), "seed"))
        .await
        .unwrap();

    assert_eq!(report.failure_kind(), Some(FailureKind::SeedInjectionFailure));
    assert_eq!(report.failing_step(), None);
    assert!(report
        .failure
        .as_ref()
        .unwrap()
        .cause
        .contains("did not read back as written"));
    assert!(!report.phases.contains(&RunPhase::Seeded));
    assert!(!launcher.calls().contains(&"reload".to_string()));
    assert_eq!(files_in(dir.path()), vec!["seed-error-seed.png"]);
}

#[tokio::test]
async fn test_capture_failure_does_not_fail_run() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_screenshot: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher);
    let steps = vec![Step::capture(), Step::pause(1)];

    let report = runner
        .run(None, &steps, &config(dir.path(), "shots"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.steps_completed, 2);
    assert!(report.artifacts.is_empty());
    assert_eq!(report.capture_issues.len(), 1);
    assert_eq!(report.capture_issues[0].step_index, Some(0));
    assert!(!report.capture_issues[0].diagnostic);
    assert!(report.capture_issues[0].message.contains("target crashed"));
}

#[tokio::test]
async fn test_failed_diagnostic_is_recorded_as_capture_issue() {
    let dir = TempDir::new().unwrap();
    let launcher = FakeLauncher::new(Script {
        fail_screenshot: true,
        ..Script::default()
    });
    let runner = VerificationRunner::new(launcher.clone());
    let steps = vec![Step::assert_visible(Selector::test_id("nowhere")).with_timeout(5)];

    let report = runner
        .run(None, &steps, &config(dir.path(), "diag"))
        .await
        .unwrap();

    assert_eq!(report.failure_kind(), Some(FailureKind::AssertionTimeout));
    assert!(report.failure.as_ref().unwrap().diagnostic.is_none());
    assert_eq!(report.capture_issues.len(), 1);
    assert!(report.capture_issues[0].diagnostic);
    assert_eq!(launcher.closes(), 1);
}

//! Run outcome reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::result::FailureKind;

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every step completed
    Success,
    /// A step (or seeding) failed
    Failure,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Failure => f.write_str("Failure"),
        }
    }
}

/// Lifecycle phases of a run, recorded in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "kebab-case")]
pub enum RunPhase {
    /// Nothing has happened yet
    NotStarted,
    /// A browser session is open
    SessionAcquired,
    /// The fixture was written and the page reloaded
    Seeded,
    /// Executing the step at this index
    Stepping(usize),
    /// All steps completed
    Success,
    /// A step or the seeding phase failed
    Failure,
    /// The session was released
    Closed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("NotStarted"),
            Self::SessionAcquired => f.write_str("SessionAcquired"),
            Self::Seeded => f.write_str("Seeded"),
            Self::Stepping(i) => write!(f, "Stepping({i})"),
            Self::Success => f.write_str("Success"),
            Self::Failure => f.write_str("Failure"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Index of the failing step; `None` when navigation or seeding failed
    pub step_index: Option<usize>,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable cause
    pub cause: String,
    /// Diagnostic screenshot, when one could be written
    pub diagnostic: Option<PathBuf>,
    /// Console output and page errors seen before the failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub console: Vec<String>,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_index {
            Some(i) => write!(f, "step {i} failed ({}): {}", self.kind, self.cause)?,
            None => write!(f, "setup failed ({}): {}", self.kind, self.cause)?,
        }
        match &self.diagnostic {
            Some(path) => write!(f, " [diagnostic: {}]", path.display()),
            None => f.write_str(" [no diagnostic screenshot]"),
        }
    }
}

/// A screenshot that could not be taken or written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureIssue {
    /// Step that requested it; `None` for a seeding-phase diagnostic
    pub step_index: Option<usize>,
    /// Whether it was the failure diagnostic
    pub diagnostic: bool,
    /// Error message
    pub message: String,
}

/// Outcome of one verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name
    pub scenario: String,
    /// Terminal status
    pub status: RunStatus,
    /// Screenshots from `capture` steps, in order
    pub artifacts: Vec<PathBuf>,
    /// Failure details when `status` is `Failure`
    pub failure: Option<StepFailure>,
    /// Screenshots that failed without failing the run
    pub capture_issues: Vec<CaptureIssue>,
    /// Number of steps that completed
    pub steps_completed: usize,
    /// Phases the run went through
    pub phases: Vec<RunPhase>,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Run duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Whether the run succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Index of the failing step, if a step failed
    #[must_use]
    pub fn failing_step(&self) -> Option<usize> {
        self.failure.as_ref().and_then(|f| f.step_index)
    }

    /// Failure category, if the run failed
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Every file written by the run, diagnostic last
    #[must_use]
    pub fn all_artifacts(&self) -> Vec<&PathBuf> {
        self.artifacts
            .iter()
            .chain(self.failure.as_ref().and_then(|f| f.diagnostic.as_ref()))
            .collect()
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} step(s) completed, {} artifact(s), {}ms)",
            self.scenario,
            self.status,
            self.steps_completed,
            self.artifacts.len(),
            self.elapsed_ms
        )?;
        if let Some(failure) = &self.failure {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

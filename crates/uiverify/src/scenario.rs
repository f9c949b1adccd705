//! Scenario schema: an ordered list of interaction steps.
//!
//! ```yaml
//! name: commitments-view
//! steps:
//!   - action: click
//!     selector: commitments-button
//!   - action: assert-visible
//!     selector: commitments-view
//!     timeout_ms: 10000
//!   - action: capture
//!     label: commitments
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::result::{VerifyError, VerifyResult};
use crate::selector::Selector;

/// Timeout applied to steps that don't set one (5 seconds)
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 5000;

/// What a step does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum StepAction {
    /// Wait for the target to become actionable, then click it
    Click {
        /// Element to click
        selector: Selector,
    },
    /// Wait for the target to become visible
    AssertVisible {
        /// Element expected to be visible
        selector: Selector,
    },
    /// Take a screenshot of the viewport, or of one element
    Capture {
        /// Element to capture; it must be attached before the screenshot
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<Selector>,
    },
    /// Sleep for a fixed duration, e.g. to let an animation settle
    Pause {
        /// Duration in milliseconds
        ms: u64,
    },
}

impl StepAction {
    /// Action name as written in scenario files
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::AssertVisible { .. } => "assert-visible",
            Self::Capture { .. } => "capture",
            Self::Pause { .. } => "pause",
        }
    }

    /// Target of the action, if any
    #[must_use]
    pub const fn selector(&self) -> Option<&Selector> {
        match self {
            Self::Click { selector } | Self::AssertVisible { selector } => Some(selector),
            Self::Capture { selector } => selector.as_ref(),
            Self::Pause { .. } => None,
        }
    }
}

/// One unit of interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Action and its target
    #[serde(flatten)]
    pub action: StepAction,
    /// Timeout for resolving the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Human-readable label, used in artifact names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Step {
    /// Create a step from an action
    #[must_use]
    pub const fn new(action: StepAction) -> Self {
        Self {
            action,
            timeout_ms: None,
            label: None,
        }
    }

    /// Click on an element
    #[must_use]
    pub fn click(selector: Selector) -> Self {
        Self::new(StepAction::Click { selector })
    }

    /// Assert an element becomes visible
    #[must_use]
    pub fn assert_visible(selector: Selector) -> Self {
        Self::new(StepAction::AssertVisible { selector })
    }

    /// Take a screenshot
    #[must_use]
    pub fn capture() -> Self {
        Self::new(StepAction::Capture { selector: None })
    }

    /// Screenshot of one element's box, once it is attached
    #[must_use]
    pub fn capture_element(selector: Selector) -> Self {
        Self::new(StepAction::Capture {
            selector: Some(selector),
        })
    }

    /// Sleep for `ms` milliseconds
    #[must_use]
    pub fn pause(ms: u64) -> Self {
        Self::new(StepAction::Pause { ms })
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Effective timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            StepAction::Pause { ms } => write!(f, "pause({ms}ms)")?,
            action => match action.selector() {
                Some(sel) => write!(f, "{}({sel})", action.name())?,
                None => write!(f, "{}", action.name())?,
            },
        }
        if let Some(label) = &self.label {
            write!(f, " [{label}]")?;
        }
        Ok(())
    }
}

/// A named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    #[serde(default)]
    pub name: String,
    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Parse a YAML scenario
    pub fn from_yaml_str(text: &str) -> VerifyResult<Self> {
        serde_yaml_ng::from_str(text).map_err(VerifyError::scenario)
    }

    /// Parse a JSON scenario
    pub fn from_json_str(text: &str) -> VerifyResult<Self> {
        serde_json::from_str(text).map_err(VerifyError::scenario)
    }

    /// Load a scenario file (`.json` as JSON, anything else as YAML).
    /// The file stem becomes the name when the file doesn't set one.
    pub fn from_path(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let mut scenario = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
        .map_err(|e| VerifyError::scenario(format!("{}: {e}", path.display())))?;

        if scenario.name.trim().is_empty() {
            scenario.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("scenario")
                .to_string();
        }
        Ok(scenario)
    }
}

//! Result and error types for uiverify.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for uiverify operations
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Category of a run failure, as surfaced in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Browser could not be launched or a page could not be opened
    SessionAcquisitionFailure,
    /// Fixture could not be serialized or written to storage
    SeedInjectionFailure,
    /// Navigation to (or reload of) the target application failed
    NavigationFailure,
    /// A `click` target never resolved within its timeout
    ElementNotFound,
    /// An `assert-visible` target never became visible within its timeout
    AssertionTimeout,
    /// A screenshot could not be taken or written
    CaptureFailure,
}

impl FailureKind {
    /// Stable name used in logs and text output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionAcquisitionFailure => "SessionAcquisitionFailure",
            Self::SeedInjectionFailure => "SeedInjectionFailure",
            Self::NavigationFailure => "NavigationFailure",
            Self::ElementNotFound => "ElementNotFound",
            Self::AssertionTimeout => "AssertionTimeout",
            Self::CaptureFailure => "CaptureFailure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while verifying a UI scenario
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Browser launch or page creation failed
    #[error("Failed to acquire browser session: {message}")]
    SessionAcquisition {
        /// Error message
        message: String,
    },

    /// Fixture could not be written into persisted storage
    #[error("Fixture injection failed: {message}")]
    SeedInjection {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Click target did not resolve
    #[error("Element {selector} not found within {timeout_ms}ms: {message}")]
    ElementNotFound {
        /// Selector that failed to resolve
        selector: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Error message
        message: String,
    },

    /// Visibility assertion timed out
    #[error("Element {selector} not visible after {timeout_ms}ms: {message}")]
    AssertionTimeout {
        /// Selector that was asserted
        selector: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Capture {
        /// Error message
        message: String,
    },

    /// Low-level browser protocol error
    #[error("Browser protocol error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Invalid run configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario or fixture file could not be parsed
    #[error("Invalid scenario: {message}")]
    Scenario {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerifyError {
    /// Create a session acquisition error
    #[must_use]
    pub fn session(message: impl fmt::Display) -> Self {
        Self::SessionAcquisition {
            message: message.to_string(),
        }
    }

    /// Create a seed injection error
    #[must_use]
    pub fn seed(message: impl fmt::Display) -> Self {
        Self::SeedInjection {
            message: message.to_string(),
        }
    }

    /// Create a navigation error
    #[must_use]
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a capture error
    #[must_use]
    pub fn capture(message: impl fmt::Display) -> Self {
        Self::Capture {
            message: message.to_string(),
        }
    }

    /// Create a browser protocol error
    #[must_use]
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser {
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create a scenario parse error
    #[must_use]
    pub fn scenario(message: impl fmt::Display) -> Self {
        Self::Scenario {
            message: message.to_string(),
        }
    }

    /// Failure kind reported for this error, if it belongs to the run taxonomy
    #[must_use]
    pub const fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::SessionAcquisition { .. } => Some(FailureKind::SessionAcquisitionFailure),
            Self::SeedInjection { .. } => Some(FailureKind::SeedInjectionFailure),
            Self::Navigation { .. } => Some(FailureKind::NavigationFailure),
            Self::ElementNotFound { .. } => Some(FailureKind::ElementNotFound),
            Self::AssertionTimeout { .. } => Some(FailureKind::AssertionTimeout),
            Self::Capture { .. } => Some(FailureKind::CaptureFailure),
            Self::Browser { .. }
            | Self::Config { .. }
            | Self::Scenario { .. }
            | Self::Io(_)
            | Self::Json(_) => None,
        }
    }
}

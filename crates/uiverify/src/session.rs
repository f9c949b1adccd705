//! The browser seam the runner drives.
//!
//! [`SessionLauncher`] acquires a [`Session`] for exactly one run. The runner
//! decides how a session error is classified (navigation, seeding, element
//! lookup, capture); sessions only report that an operation failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::result::VerifyResult;
use crate::selector::Selector;

/// Observed state of a step target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    /// Nothing matches the selector
    Missing,
    /// Attached but not rendered (display/visibility/zero size)
    Hidden,
    /// Attached and rendered
    Visible,
}

impl ElementState {
    /// Whether the selector resolved to an element
    #[must_use]
    pub const fn is_attached(self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// Whether the element is rendered
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// An open browser page owned by one run
#[async_trait]
pub trait Session: Send {
    /// Navigate to a URL and wait for it to load
    async fn goto(&mut self, url: &str) -> VerifyResult<()>;

    /// Reload the current page and wait for it to load
    async fn reload(&mut self) -> VerifyResult<()>;

    /// Evaluate a script, returning its JSON result
    async fn evaluate(&mut self, script: &str) -> VerifyResult<serde_json::Value>;

    /// Probe the current state of a target
    async fn element_state(&mut self, selector: &Selector) -> VerifyResult<ElementState>;

    /// Click a target that was already observed as visible
    async fn click(&mut self, selector: &Selector) -> VerifyResult<()>;

    /// Screenshot of the viewport as PNG bytes
    async fn screenshot(&mut self) -> VerifyResult<Vec<u8>>;

    /// Screenshot clipped to one element's box, as PNG bytes
    async fn element_screenshot(&mut self, selector: &Selector) -> VerifyResult<Vec<u8>>;

    /// Most recent console messages and uncaught page errors, oldest first
    fn recent_console(&self) -> Vec<String> {
        Vec::new()
    }

    /// Close the page and its browser; consumes the session
    async fn close(self) -> VerifyResult<()>
    where
        Self: Sized;
}

/// Acquires sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Session type produced by this launcher
    type Session: Session;

    /// Launch a browser and open a page configured for `config`.
    ///
    /// Failures here are fatal for the run and should be
    /// [`crate::VerifyError::SessionAcquisition`].
    async fn launch(&self, config: &RunConfig) -> VerifyResult<Self::Session>;
}

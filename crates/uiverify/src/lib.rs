//! uiverify: scripted UI verification for single-page web applications.
//!
//! A run seeds the application's persisted storage with a fixture, drives the
//! page through an ordered list of steps, asserts that expected elements
//! become visible and captures screenshots. The first failing step ends the
//! run with a diagnostic screenshot.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────────┐    ┌──────────────┐
//! │ Scenario     │    │ VerificationRunner   │    │ Session      │
//! │ + Fixture    │───►│ seed / step / report │───►│ (chromium    │
//! │ + RunConfig  │    │                      │    │  via CDP)    │
//! └──────────────┘    └──────────────────────┘    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use uiverify::{CdpLauncher, RunConfig, Selector, Step, VerificationRunner};
//!
//! let config = RunConfig::new("http://localhost:5173").with_scenario_name("home");
//! let steps = vec![
//!     Step::assert_visible(Selector::test_id("wallets-heading")),
//!     Step::capture(),
//! ];
//! let report = VerificationRunner::new(CdpLauncher::new())
//!     .run(None, &steps, &config)
//!     .await?;
//! assert!(report.is_success());
//! ```

#![warn(missing_docs)]

mod artifacts;
#[cfg(feature = "browser")]
mod browser;
mod config;
mod fixture;
mod report;
mod result;
mod runner;
mod scenario;
mod selector;
mod session;
mod wait;

pub use artifacts::{sanitize, ArtifactWriter, DEFAULT_CAPTURE_LABEL};
#[cfg(feature = "browser")]
pub use browser::{CdpLauncher, CdpSession};
pub use config::{
    RunConfig, Viewport, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_STORAGE_KEY,
};
pub use fixture::{Fixture, StorageSeed};
pub use report::{CaptureIssue, RunPhase, RunReport, RunStatus, StepFailure};
pub use result::{FailureKind, VerifyError, VerifyResult};
pub use runner::VerificationRunner;
pub use scenario::{Scenario, Step, StepAction, DEFAULT_STEP_TIMEOUT_MS};
pub use selector::Selector;
pub use session::{ElementState, Session, SessionLauncher};
pub use wait::{Poller, WaitOptions, WaitResult};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::CdpLauncher;
    pub use super::{
        ElementState, FailureKind, Fixture, RunConfig, RunReport, RunStatus, Scenario, Selector,
        Session, SessionLauncher, Step, StepAction, VerificationRunner, VerifyError, VerifyResult,
        Viewport,
    };
}

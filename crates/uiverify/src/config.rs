//! Run configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::result::{VerifyError, VerifyResult};

/// Storage key the target application reads its state from at startup
pub const DEFAULT_STORAGE_KEY: &str = "moneyfest_lite_v2";

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval for element waits (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Typical phone portrait viewport
    #[must_use]
    pub const fn mobile() -> Self {
        Self::new(375, 812)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Viewport {
    type Err = VerifyError;

    /// Parse `WIDTHxHEIGHT`, e.g. `375x812`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| VerifyError::config(format!("viewport must be WxH, got {s:?}")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| VerifyError::config(format!("bad viewport dimension {v:?}: {e}")))
        };
        let viewport = Self::new(parse(w)?, parse(h)?);
        if viewport.width == 0 || viewport.height == 0 {
            return Err(VerifyError::config("viewport dimensions must be non-zero"));
        }
        Ok(viewport)
    }
}

/// Configuration for a single verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Entry point of the application under test
    pub base_url: String,
    /// Run the browser without a visible window
    pub headless: bool,
    /// Viewport size
    pub viewport: Viewport,
    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,
    /// Scenario name, used as the artifact filename prefix
    pub scenario_name: String,
    /// localStorage key the fixture is written under
    pub storage_key: String,
    /// Clear localStorage before writing the fixture
    pub clear_storage: bool,
    /// Timeout for navigation and reload
    pub navigation_timeout_ms: u64,
    /// Polling interval for element waits
    pub poll_interval_ms: u64,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headless: true,
            viewport: Viewport::default(),
            screenshot_dir: PathBuf::from("screenshots"),
            scenario_name: "scenario".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            clear_storage: true,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl RunConfig {
    /// Create a configuration targeting `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Set scenario name
    #[must_use]
    pub fn with_scenario_name(mut self, name: impl Into<String>) -> Self {
        self.scenario_name = name.into();
        self
    }

    /// Set storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Keep or clear existing storage before seeding
    #[must_use]
    pub const fn with_clear_storage(mut self, clear: bool) -> Self {
        self.clear_storage = clear;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Check the configuration before a session is acquired
    pub fn validate(&self) -> VerifyResult<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(VerifyError::config("base URL is required"));
        }
        if !["http://", "https://", "file://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            return Err(VerifyError::config(format!(
                "base URL must be http(s):// or file://, got {url:?}"
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VerifyError::config("viewport dimensions must be non-zero"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(VerifyError::config("storage key must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(VerifyError::config("poll interval must be non-zero"));
        }
        Ok(())
    }
}

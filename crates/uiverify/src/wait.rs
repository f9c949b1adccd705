//! Polling waits with per-step timeouts.
//!
//! Every wait probes at least once, so a zero timeout still observes the
//! current page state. Probe errors count as "not ready yet" because the page
//! may be mid-navigation after a click; the last one is kept for the failure
//! message.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::DEFAULT_POLL_INTERVAL_MS;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: crate::scenario::DEFAULT_STEP_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a polling wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the probe, `None` on timeout
    pub value: Option<T>,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes made
    pub attempts: u32,
    /// Last probe error, if any
    pub last_error: Option<String>,
}

impl<T> WaitResult<T> {
    /// Whether the condition was met
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}

/// Deadline-driven polling loop.
///
/// The caller probes, then calls [`Poller::tick`] to sleep until the next
/// probe; `tick` returns `false` once the deadline has passed. A probe that
/// can block should itself be bounded by [`Poller::remaining`].
///
/// ```ignore
/// let mut poller = Poller::start(options);
/// let ready = loop {
///     match probe().await {
///         Ok(true) => break true,
///         Ok(false) => {}
///         Err(e) => poller.record_error(&e),
///     }
///     if !poller.tick().await {
///         break false;
///     }
/// };
/// ```
#[derive(Debug)]
pub struct Poller {
    options: WaitOptions,
    start: Instant,
    deadline: Instant,
    attempts: u32,
    last_error: Option<String>,
}

impl Poller {
    /// Start the clock; the first probe counts as attempt one
    #[must_use]
    pub fn start(options: WaitOptions) -> Self {
        let start = Instant::now();
        Self {
            options,
            start,
            deadline: start + options.timeout(),
            attempts: 1,
            last_error: None,
        }
    }

    /// Remember a failed probe
    pub fn record_error(&mut self, error: &impl fmt::Display) {
        tracing::trace!(%error, attempts = self.attempts, "probe failed, retrying");
        self.last_error = Some(error.to_string());
    }

    /// Sleep until the next probe; `false` once the deadline has passed
    pub async fn tick(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }
        tokio::time::sleep(self.options.poll_interval().min(self.deadline - now)).await;
        self.attempts += 1;
        true
    }

    /// Time left before the deadline; zero once it has passed
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Time since the poller started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish with the probed value (`None` on timeout)
    #[must_use]
    pub fn finish<T>(self, value: Option<T>) -> WaitResult<T> {
        WaitResult {
            value,
            elapsed: self.start.elapsed(),
            attempts: self.attempts,
            last_error: self.last_error,
        }
    }
}

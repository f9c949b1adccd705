//! Chromium sessions over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. Each [`CdpLauncher::launch`] starts a
//! dedicated chromium process with one page; [`CdpSession::close`] shuts the
//! process down and stops the protocol handler task.
//!
//! Console calls and uncaught exceptions on the page are logged under the
//! `page` tracing target and the most recent ones are kept for failure
//! reports.

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
};
use chromiumoxide::handler::viewport::Viewport as CdpViewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::result::{VerifyError, VerifyResult};
use crate::selector::Selector;
use crate::session::{ElementState, Session, SessionLauncher};

/// Page console lines kept for a failure report
pub const CONSOLE_HISTORY: usize = 20;

/// Marker attribute for element screenshots of text targets
const CAPTURE_ATTRIBUTE: &str = "data-uiverify-capture";

/// Bounded history of page console output, shared with the listener tasks
#[derive(Debug, Clone, Default)]
struct ConsoleLog {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl ConsoleLog {
    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == CONSOLE_HISTORY {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn remote_text(object: &RemoteObject) -> String {
    match (&object.value, &object.description) {
        (Some(serde_json::Value::String(text)), _) => text.clone(),
        (Some(value), _) => value.to_string(),
        (None, Some(description)) => description.clone(),
        (None, None) => String::new(),
    }
}

fn console_line(event: &EventConsoleApiCalled) -> String {
    let level = format!("{:?}", event.r#type).to_lowercase();
    let text = event
        .args
        .iter()
        .map(remote_text)
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{level}] {text}")
}

fn exception_line(event: &EventExceptionThrown) -> String {
    let details = &event.exception_details;
    let message = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone());
    format!("[pageerror] {message}")
}

/// Forward console calls and uncaught exceptions into tracing and `log`
async fn listen_to_console(page: &Page, log: &ConsoleLog) -> VerifyResult<Vec<JoinHandle<()>>> {
    let mut console = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(VerifyError::session)?;
    let mut errors = page
        .event_listener::<EventExceptionThrown>()
        .await
        .map_err(VerifyError::session)?;

    let sink = log.clone();
    let console_task = tokio::spawn(async move {
        while let Some(event) = console.next().await {
            let line = console_line(&event);
            info!(target: "page", "{line}");
            sink.push(line);
        }
    });
    let sink = log.clone();
    let error_task = tokio::spawn(async move {
        while let Some(event) = errors.next().await {
            let line = exception_line(&event);
            warn!(target: "page", "{line}");
            sink.push(line);
        }
    });
    Ok(vec![console_task, error_task])
}

/// Launches a fresh chromium per run
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpLauncher;

impl CdpLauncher {
    /// Create a launcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn browser_config(config: &RunConfig) -> VerifyResult<CdpConfig> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport.width, config.viewport.height)
            .viewport(CdpViewport {
                width: config.viewport.width,
                height: config.viewport.height,
                ..CdpViewport::default()
            });

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(VerifyError::session)
    }
}

#[async_trait]
impl SessionLauncher for CdpLauncher {
    type Session = CdpSession;

    async fn launch(&self, config: &RunConfig) -> VerifyResult<CdpSession> {
        let cdp_config = Self::browser_config(config)?;
        let (mut browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(VerifyError::session)?;

        // The handler drives the websocket; the browser is unusable without it
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler event loop ended");
                    break;
                }
            }
        });

        let console = ConsoleLog::default();
        let opened = match browser.new_page("about:blank").await {
            Ok(page) => listen_to_console(&page, &console)
                .await
                .map(|listeners| (page, listeners)),
            Err(e) => Err(VerifyError::session(format!("could not open page: {e}"))),
        };
        let (page, listeners) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    debug!(error = %close_err, "closing chromium after failed launch");
                }
                handler_task.abort();
                return Err(e);
            }
        };

        info!(
            headless = config.headless,
            viewport = %config.viewport,
            "chromium session acquired"
        );
        Ok(CdpSession {
            browser,
            page,
            handler_task,
            listeners,
            console,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        })
    }
}

/// One chromium process with one page
#[derive(Debug)]
pub struct CdpSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    listeners: Vec<JoinHandle<()>>,
    console: ConsoleLog,
    navigation_timeout: Duration,
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
        self.handler_task.abort();
    }
}

impl CdpSession {
    async fn bounded<T, E: std::fmt::Display>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, E>> + Send,
    ) -> VerifyResult<T> {
        match tokio::time::timeout(self.navigation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(VerifyError::browser(format!("{what}: {e}"))),
            Err(_) => Err(VerifyError::browser(format!(
                "{what} timed out after {}ms",
                self.navigation_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl Session for CdpSession {
    async fn goto(&mut self, url: &str) -> VerifyResult<()> {
        debug!(url, "navigating");
        self.bounded("navigation", self.page.goto(url))
            .await
            .map_err(|e| VerifyError::navigation(url, e))?;
        Ok(())
    }

    async fn reload(&mut self) -> VerifyResult<()> {
        debug!("reloading page");
        self.bounded("reload", self.page.reload()).await?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> VerifyResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(VerifyError::browser)?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn element_state(&mut self, selector: &Selector) -> VerifyResult<ElementState> {
        let value = self.evaluate(&selector.state_script()).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn click(&mut self, selector: &Selector) -> VerifyResult<()> {
        if let Some(css) = selector.as_css() {
            // Real input events through CDP, scrolled into view first
            let element = self
                .page
                .find_element(css)
                .await
                .map_err(VerifyError::browser)?;
            element.click().await.map_err(VerifyError::browser)?;
            return Ok(());
        }
        let clicked = self.evaluate(&selector.click_script()).await?;
        if clicked == serde_json::Value::Bool(true) {
            Ok(())
        } else {
            Err(VerifyError::browser(format!("{selector} detached before click")))
        }
    }

    async fn screenshot(&mut self) -> VerifyResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(VerifyError::capture)?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(VerifyError::capture)
    }

    async fn element_screenshot(&mut self, selector: &Selector) -> VerifyResult<Vec<u8>> {
        if let Some(css) = selector.as_css() {
            let element = self
                .page
                .find_element(css)
                .await
                .map_err(VerifyError::capture)?;
            return element
                .screenshot(CaptureScreenshotFormat::Png)
                .await
                .map_err(VerifyError::capture);
        }

        // Text targets have no CSS form; tag the match so CDP can resolve it
        let marked = self.evaluate(&selector.mark_script(CAPTURE_ATTRIBUTE)).await?;
        if marked != serde_json::Value::Bool(true) {
            return Err(VerifyError::capture(format!("{selector} detached before capture")));
        }
        let shot = match self.page.find_element(format!("[{CAPTURE_ATTRIBUTE}]")).await {
            Ok(element) => element.screenshot(CaptureScreenshotFormat::Png).await,
            Err(e) => Err(e),
        };
        let unmark = format!(
            "document.querySelectorAll('[{CAPTURE_ATTRIBUTE}]')\
             .forEach(e => e.removeAttribute('{CAPTURE_ATTRIBUTE}'))"
        );
        if let Err(e) = self.evaluate(&unmark).await {
            debug!(error = %e, "could not clear capture marker");
        }
        shot.map_err(VerifyError::capture)
    }

    fn recent_console(&self) -> Vec<String> {
        self.console.snapshot()
    }

    async fn close(mut self) -> VerifyResult<()> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(VerifyError::browser);
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "waiting for chromium to exit failed");
        }
        debug!("chromium session closed");
        closed
    }
}

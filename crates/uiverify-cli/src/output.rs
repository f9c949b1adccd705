//! Run summary output

use console::{style, Term};
use serde::{Deserialize, Serialize};
use uiverify::RunReport;

use crate::error::{CliError, CliResult};

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// Pretty JSON report on stdout
    Json,
}

/// Prints run results to the terminal
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new reporter writing to stderr
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    fn prefix(&self, symbol: &str, plain: &str, paint: fn(&str) -> String) -> String {
        if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", |s| style(s).green().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = self.prefix("✗", "FAIL", |s| style(s).red().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", |s| style(s).yellow().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an indented detail line
    pub fn detail(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(&format!("  {message}"));
    }

    /// Print the summary for a finished run
    pub fn run_finished(&self, report: &RunReport) {
        let headline = format!(
            "{} ({} step(s), {} artifact(s), {}ms)",
            report.scenario,
            report.steps_completed,
            report.artifacts.len(),
            report.elapsed_ms
        );
        match &report.failure {
            None => self.success(&headline),
            Some(_) => {
                self.failure(&headline);
                // Cause, index and diagnostic are printed together even when quiet
                for line in failure_lines(report) {
                    let _ = self.term.write_line(&format!("  {line}"));
                }
            }
        }
        for artifact in &report.artifacts {
            self.detail(&format!("artifact: {}", artifact.display()));
        }
        for issue in &report.capture_issues {
            let what = if issue.diagnostic {
                "diagnostic screenshot"
            } else {
                "screenshot"
            };
            match issue.step_index {
                Some(i) => self.warning(&format!("{what} for step {i} failed: {}", issue.message)),
                None => self.warning(&format!("{what} failed: {}", issue.message)),
            }
        }
    }
}

/// Failure details of a report, one per line
#[must_use]
pub fn failure_lines(report: &RunReport) -> Vec<String> {
    let Some(failure) = &report.failure else {
        return Vec::new();
    };
    let step = failure
        .step_index
        .map_or_else(|| "before first step".to_string(), |i| i.to_string());
    let diagnostic = failure.diagnostic.as_ref().map_or_else(
        || "none".to_string(),
        |p| p.display().to_string(),
    );
    let mut lines = vec![
        format!("kind: {}", failure.kind),
        format!("step: {step}"),
        format!("cause: {}", failure.cause),
        format!("diagnostic: {diagnostic}"),
    ];
    lines.extend(failure.console.iter().map(|line| format!("console: {line}")));
    lines
}

/// Pretty JSON rendering of a report
pub fn render_json(report: &RunReport) -> CliResult<String> {
    report
        .to_json()
        .map_err(|e| CliError::report_generation(e.to_string()))
}

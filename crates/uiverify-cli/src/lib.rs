//! uiverify CLI library
//!
//! Argument parsing, configuration mapping and terminal output for the
//! `uiverify` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, FormatArg};
pub use config::{run_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{failure_lines, render_json, OutputFormat, ProgressReporter};
pub use runner::{execute, write_report, LoadedInputs};

use uiverify::RunReport;

/// Every step completed
pub const EXIT_SUCCESS: u8 = 0;
/// The run reached `Failure`
pub const EXIT_FAILURE: u8 = 1;
/// Session acquisition, configuration or input error
pub const EXIT_ERROR: u8 = 2;

/// Exit code for a finished run
#[must_use]
pub fn exit_code(report: &RunReport) -> u8 {
    if report.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

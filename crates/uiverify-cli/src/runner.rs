//! Loads inputs and executes one scenario

use std::path::Path;
use tracing::{debug, info};
use uiverify::{Fixture, RunConfig, RunReport, Scenario};

use crate::error::{CliError, CliResult};

/// A scenario and its optional fixture, read from disk
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    /// Steps to run
    pub scenario: Scenario,
    /// Storage fixture
    pub fixture: Option<Fixture>,
}

impl LoadedInputs {
    /// Read the scenario file and, when given, the fixture file
    pub fn load(scenario: &Path, fixture: Option<&Path>) -> CliResult<Self> {
        let scenario = Scenario::from_path(scenario)?;
        let fixture = fixture.map(Fixture::from_path).transpose()?;
        debug!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            fixture = fixture.is_some(),
            "inputs loaded"
        );
        Ok(Self { scenario, fixture })
    }
}

/// Run the scenario against a fresh chromium on a multi-threaded runtime
#[cfg(feature = "browser")]
pub fn execute(inputs: &LoadedInputs, config: &RunConfig) -> CliResult<RunReport> {
    use uiverify::{CdpLauncher, VerificationRunner};

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    info!(scenario = %inputs.scenario.name, "launching chromium");
    let runner = VerificationRunner::new(CdpLauncher::new());
    let report = runtime.block_on(runner.run(
        inputs.fixture.as_ref(),
        &inputs.scenario.steps,
        config,
    ))?;
    Ok(report)
}

/// Without the `browser` feature there is nothing to drive
#[cfg(not(feature = "browser"))]
pub fn execute(inputs: &LoadedInputs, _config: &RunConfig) -> CliResult<RunReport> {
    info!(scenario = %inputs.scenario.name, "browser support not compiled in");
    Err(CliError::BrowserUnavailable)
}

/// Write the JSON report next to wherever the caller asked
pub fn write_report(path: &Path, json: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))
}

//! uiverify: scripted UI verification from the command line
//!
//! ## Usage
//!
//! ```bash
//! uiverify --base-url http://localhost:5173 --scenario home.yaml
//! uiverify --base-url http://localhost:5173 --fixture wallets.json \
//!     --scenario commitments.yaml --viewport 375x812 --report out/report.json
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use uiverify::RunReport;
use uiverify_cli::{
    execute, exit_code, render_json, run_config, write_report, Cli, CliConfig, CliResult,
    LoadedInputs, OutputFormat, ProgressReporter, Verbosity, EXIT_ERROR,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    init_tracing(config.verbosity);

    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    match run(&cli, &config, &reporter) {
        Ok(report) => ExitCode::from(exit_code(&report)),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, config: &CliConfig, reporter: &ProgressReporter) -> CliResult<RunReport> {
    let inputs = LoadedInputs::load(&cli.scenario, cli.fixture.as_deref())?;
    let run_config = run_config(cli, &inputs.scenario.name)?;

    if config.verbosity.is_verbose() {
        reporter.detail(&format!(
            "{}: {} step(s) against {} ({})",
            inputs.scenario.name,
            inputs.scenario.steps.len(),
            run_config.base_url,
            run_config.viewport
        ));
    }

    let report = execute(&inputs, &run_config)?;

    match config.format {
        OutputFormat::Text => reporter.run_finished(&report),
        OutputFormat::Json => {
            println!("{}", render_json(&report)?);
            if let Some(failure) = &report.failure {
                reporter.failure(&failure.to_string());
            }
        }
    }

    if let Some(path) = &config.report_path {
        write_report(path, &render_json(&report)?)?;
        reporter.detail(&format!("report: {}", path.display()));
    }

    Ok(report)
}

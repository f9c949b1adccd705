//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// uiverify: seed a web app's storage, drive a scenario, capture screenshots
#[derive(Parser, Debug)]
#[command(name = "uiverify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the running application
    #[arg(long, env = "UIVERIFY_BASE_URL")]
    pub base_url: String,

    /// Fixture file (JSON or YAML) written into persisted storage
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Scenario file (YAML or JSON)
    #[arg(long)]
    pub scenario: PathBuf,

    /// Run the browser without a window
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub headless: bool,

    /// Directory for screenshots
    #[arg(long, default_value = "screenshots")]
    pub screenshot_dir: PathBuf,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720")]
    pub viewport: String,

    /// Storage key the fixture is written under
    #[arg(long, default_value = uiverify::DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Keep existing storage instead of clearing it before seeding
    #[arg(long)]
    pub keep_storage: bool,

    /// Chromium executable
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Disable the chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Write the JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Output format for the run summary
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only failures are printed)
    #[arg(short, long)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorArg,
}

/// Summary output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// JSON report on stdout
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

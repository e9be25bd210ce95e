use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration_value;

use super::parsers::{parse_bool_env, parse_no_color_env};
use crate::runner::RunSettings;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Declarative HTTP load testing - resolves environment bindings, logs in once, and drives scenario assertions under ramped virtual users."
)]
pub struct LoadforgeArgs {
    /// Test definition to run (TOML or JSON)
    #[arg(value_name = "TEST_FILE", env = "LOADFORGE_TEST_FILE")]
    pub test_file: PathBuf,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADFORGE_LOG/RUST_LOG)
    #[arg(long, short = 'v', env = "LOADFORGE_VERBOSE", value_parser = parse_bool_env)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_no_color_env)]
    pub no_color: bool,

    /// Print the result as JSON instead of the text report
    #[arg(long, env = "LOADFORGE_JSON", value_parser = parse_bool_env)]
    pub json: bool,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        default_value = "30s",
        env = "LOADFORGE_REQUEST_TIMEOUT",
        value_parser = parse_duration_value
    )]
    pub request_timeout: Duration,

    /// How long to wait for virtual users after the run duration before cancelling them
    #[arg(
        long = "grace-period",
        default_value = "30s",
        env = "LOADFORGE_GRACE_PERIOD",
        value_parser = parse_duration_value
    )]
    pub grace_period: Duration,

    /// Interval between progress lines during continuous runs
    #[arg(
        long = "progress-interval",
        default_value = "1s",
        env = "LOADFORGE_PROGRESS_INTERVAL",
        value_parser = parse_duration_value
    )]
    pub progress_interval: Duration,
}

impl LoadforgeArgs {
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    #[must_use]
    pub const fn run_settings(&self) -> RunSettings {
        RunSettings {
            request_timeout: self.request_timeout,
            grace_period: self.grace_period,
            progress_interval: self.progress_interval,
        }
    }
}

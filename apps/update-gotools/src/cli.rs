//! Command line interface definition

use clap::{Parser, ValueEnum};
use gotools_config::constants::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

/// update-gotools - install and update Go tools in parallel
#[derive(Debug, Parser)]
#[command(name = "update-gotools")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install and update Go tools in parallel")]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file to load
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log level (ignored when RUST_LOG is set)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Output logs as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Number of packages to build in parallel (default: CPUs - 1)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Resolve versions and log the plan without running anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mirror the vehicle stock feed into a local document store
#[derive(Parser, Debug)]
#[command(name = "stock-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// DuckDB store path, overrides the configuration
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    /// Log level (RUST_LOG directives still apply)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output, same as `--log-level debug`
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one synchronization
    Sync {
        /// Output format for the run summary
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Fetch the first page and report what the source advertises
    Check,

    /// List identifiers currently in the store
    Ids,
}

impl Cli {
    /// Level the log subscriber should start at
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object
    Json,
    /// Human-readable summary
    Pretty,
}

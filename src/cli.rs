// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `flowdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdag",
    version,
    about = "Drive a success/failure/always workflow graph to completion.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow file (TOML).
    ///
    /// Default: `Workflow.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Workflow.toml")]
    pub config: String,

    /// Evaluate the snapshot in the file once and print the decision,
    /// without launching anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the workflow graph in Graphviz dot format and exit.
    #[arg(long)]
    pub dot: bool,

    /// Override `[config].tick_interval` (e.g. `250ms`, `2s`).
    #[arg(long, value_name = "DURATION")]
    pub tick_interval: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

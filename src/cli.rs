// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag here is optional; unset flags fall back to the environment
//! (`AUDITION_*`) and then to the config file.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `audition-runner`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "audition-runner",
    version,
    about = "Run one synthesis audition under a hard timeout, with optional audio capture.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Audition.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Wall-clock timeout for the engine, in seconds.
    ///
    /// Overrides `AUDITION_TIMEOUT` and `[timeouts].run_secs`.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Audition only this target, skipping discovery.
    #[arg(long, value_name = "LABEL")]
    pub only: Option<String>,

    /// Enable verbose diagnostics (same as setting `AUDITION_DEBUG`).
    #[arg(long)]
    pub debug: bool,

    /// Recording input device for the capture sidecar.
    #[arg(long, value_name = "NAME")]
    pub capture_device: Option<String>,

    /// Disable the capture sidecar for this run.
    #[arg(long)]
    pub no_capture: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUDITION_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and print the engine command, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
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

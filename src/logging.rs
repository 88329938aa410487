// src/logging.rs

//! Logging setup for `audition-runner` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `AUDITION_LOG` environment variable (e.g. "info", "debug")
//! 3. `debug` when debug mode is enabled (`AUDITION_DEBUG` / `--debug`)
//! 4. default to `info`
//!
//! Logs are sent to STDERR so that the engine's stdout stays untouched.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// `env_level` is the `AUDITION_LOG` value from the environment snapshot.
/// Safe to call once at startup.
pub fn init_logging(
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
    debug_mode: bool,
) -> Result<()> {
    let level = resolve_level(cli_level, env_level, debug_mode);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
    debug_mode: bool,
) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    if let Some(lvl) = env_level.and_then(parse_level_str) {
        return lvl;
    }
    if debug_mode {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

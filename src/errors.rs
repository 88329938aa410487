// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only failures that change the run's exit status (or stop it from being
//! configured at all) are errors. Best-effort operations such as capture or
//! stale-process cleanup report enumerated outcomes instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Could not launch {program}: {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AuditionError>;

// src/config/validate.rs

use std::time::Duration;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AuditionError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AuditionError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_timeouts(cfg)?;
    validate_capture(cfg)?;
    validate_discovery(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.program.trim().is_empty() {
        return Err(AuditionError::ConfigError(
            "[engine].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeouts(cfg: &RawConfigFile) -> Result<()> {
    for (name, value) in cfg.timeouts.named() {
        if !value.is_finite() || value <= 0.0 {
            return Err(AuditionError::ConfigError(format!(
                "[timeouts].{name} must be a positive number of seconds (got {value})"
            )));
        }
        if Duration::try_from_secs_f64(value).is_err() {
            return Err(AuditionError::ConfigError(format!(
                "[timeouts].{name} is too large (got {value})"
            )));
        }
    }
    Ok(())
}

fn validate_capture(cfg: &RawConfigFile) -> Result<()> {
    if cfg.capture.sample_rate == 0 {
        return Err(AuditionError::ConfigError(
            "[capture].sample_rate must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.capture.channels == 0 {
        return Err(AuditionError::ConfigError(
            "[capture].channels must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.capture.tool.trim().is_empty() {
        return Err(AuditionError::ConfigError(
            "[capture].tool must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_discovery(cfg: &RawConfigFile) -> Result<()> {
    Glob::new(&cfg.discovery.pattern).map_err(|e| {
        AuditionError::ConfigError(format!(
            "[discovery].pattern '{}' is not a valid glob: {}",
            cfg.discovery.pattern, e
        ))
    })?;
    Ok(())
}

// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Audition.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the config for this invocation, plus the directory relative paths
/// are anchored to.
///
/// - An explicit path must exist.
/// - Without one, `Audition.toml` in `cwd` is used if present; otherwise the
///   built-in defaults apply and paths are relative to `cwd`.
pub fn load_or_default(explicit: Option<&Path>, cwd: &Path) -> Result<(ConfigFile, PathBuf)> {
    if let Some(path) = explicit {
        let cfg = load_and_validate(path)?;
        return Ok((cfg, config_root_dir(path, cwd)));
    }

    let candidate = cwd.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        debug!(path = %candidate.display(), "using default config file");
        let cfg = load_and_validate(&candidate)?;
        return Ok((cfg, cwd.to_path_buf()));
    }

    debug!("no config file found; using built-in defaults");
    Ok((ConfigFile::try_from(RawConfigFile::default())?, cwd.to_path_buf()))
}

/// Figure out the directory relative config paths are anchored to.
///
/// - If the config path has a non-empty parent (e.g. "runner/Audition.toml"),
///   that directory is used (joined onto `cwd` when relative).
/// - If it's just a bare filename, fall back to `cwd`.
fn config_root_dir(config_path: &Path, cwd: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd.to_path_buf(),
    }
}

// src/config/settings.rs

//! Resolved, immutable per-invocation settings.
//!
//! Layering, lowest to highest priority:
//! 1. built-in defaults / config file (`ConfigFile`)
//! 2. environment snapshot (`AUDITION_*`)
//! 3. CLI flags
//!
//! Relative paths from the config file are anchored at `root`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::cli::CliArgs;
use crate::config::env::{
    ENV_CAPTURE_DEVICE, ENV_DEBUG, ENV_ONLY, ENV_TIMEOUT, EnvSnapshot,
};
use crate::config::model::ConfigFile;

/// Capture device used on macOS when nothing is configured.
pub const MACOS_DEFAULT_CAPTURE_DEVICE: &str = "MacBook Pro Speakers";

/// Capture device used on every other platform when nothing is configured.
pub const FALLBACK_CAPTURE_DEVICE: &str = "default";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory relative config paths were resolved against.
    pub root: PathBuf,
    /// Hard wall-clock budget for the engine.
    pub timeout: Duration,
    pub debug: bool,
    /// Explicit target label; bypasses discovery when set.
    pub only: Option<String>,
    pub engine: EngineSettings,
    pub discovery: DiscoverySettings,
    pub capture: CaptureSettings,
    pub escalation: EscalationBudgets,
    pub env: EnvSnapshot,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub program: String,
    pub script: PathBuf,
    pub conf: PathBuf,
    pub runtime_dir: PathBuf,
    pub kill_before_run: Vec<String>,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub dir: PathBuf,
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub enabled: bool,
    pub tool: String,
    /// May be empty when explicitly configured that way; start then skips.
    pub device: String,
    pub input_format: Option<String>,
    pub dir: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Operating system name as reported by `std::env::consts::OS`.
    pub platform: String,
    pub interrupt_wait: Duration,
    pub terminate_wait: Duration,
    pub kill_wait: Duration,
}

/// Wait budgets applied to a timed-out engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationBudgets {
    pub terminate_wait: Duration,
    pub kill_wait: Duration,
}

impl Settings {
    /// Resolve settings for one invocation.
    pub fn resolve(cfg: &ConfigFile, root: &Path, env: EnvSnapshot, cli: &CliArgs) -> Self {
        let platform = std::env::consts::OS.to_string();

        let mut timeout = Duration::from_secs_f64(cfg.timeouts.run_secs);
        if let Some(raw) = env.get(ENV_TIMEOUT) {
            match parse_timeout_secs(raw) {
                Ok(t) => timeout = t,
                Err(e) => warn!(
                    value = %raw,
                    error = %e,
                    "ignoring {ENV_TIMEOUT}; using {:.1}s",
                    timeout.as_secs_f64()
                ),
            }
        }
        if let Some(secs) = cli.timeout {
            match positive_duration(secs) {
                Ok(t) => timeout = t,
                Err(e) => warn!(error = %e, "ignoring --timeout; using {:.1}s", timeout.as_secs_f64()),
            }
        }

        let debug = cli.debug || env.flag(ENV_DEBUG);

        let only = cli
            .only
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| env.non_empty(ENV_ONLY))
            .map(str::to_string);

        let runtime_dir = anchor(root, &cfg.engine.runtime_dir);
        let engine = EngineSettings {
            program: resolve_program(root, &cfg.engine.program),
            script: anchor(root, &cfg.engine.script),
            conf: anchor(root, &cfg.engine.conf),
            runtime_dir: runtime_dir.clone(),
            kill_before_run: cfg.engine.kill_before_run.clone(),
            extra_args: cfg.engine.extra_args.clone(),
        };

        let discovery = DiscoverySettings {
            dir: anchor(root, &cfg.discovery.dir),
            pattern: cfg.discovery.pattern.clone(),
        };

        let device = cli
            .capture_device
            .clone()
            .or_else(|| env.get(ENV_CAPTURE_DEVICE).map(str::to_string))
            .or_else(|| cfg.capture.device.clone())
            .unwrap_or_else(|| default_capture_device(&platform).to_string())
            .trim()
            .to_string();

        let capture = CaptureSettings {
            enabled: cfg.capture.enabled && !cli.no_capture,
            tool: cfg.capture.tool.clone(),
            device,
            input_format: cfg.capture.input_format.clone(),
            dir: cfg
                .capture
                .dir
                .as_ref()
                .map(|d| anchor(root, d))
                .unwrap_or_else(|| runtime_dir.join("recordings")),
            sample_rate: cfg.capture.sample_rate,
            channels: cfg.capture.channels,
            platform,
            interrupt_wait: Duration::from_secs_f64(cfg.timeouts.capture_interrupt_wait_secs),
            terminate_wait: Duration::from_secs_f64(cfg.timeouts.capture_terminate_wait_secs),
            kill_wait: Duration::from_secs_f64(cfg.timeouts.capture_kill_wait_secs),
        };

        let escalation = EscalationBudgets {
            terminate_wait: Duration::from_secs_f64(cfg.timeouts.terminate_wait_secs),
            kill_wait: Duration::from_secs_f64(cfg.timeouts.kill_wait_secs),
        };

        Self {
            root: root.to_path_buf(),
            timeout,
            debug,
            only,
            engine,
            discovery,
            capture,
            escalation,
            env,
        }
    }
}

/// Parse a timeout given in (possibly fractional) seconds.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid timeout '{}': {}", raw.trim(), e))?;
    positive_duration(secs)
}

fn positive_duration(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds (got {secs})"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

pub fn default_capture_device(platform: &str) -> &'static str {
    if platform == "macos" {
        MACOS_DEFAULT_CAPTURE_DEVICE
    } else {
        FALLBACK_CAPTURE_DEVICE
    }
}

fn anchor(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Programs given with a directory part are anchored like other paths;
/// bare names are left for `PATH` lookup at launch.
fn resolve_program(root: &Path, program: &str) -> String {
    let path = Path::new(program);
    if path.components().count() > 1 && path.is_relative() {
        root.join(path).to_string_lossy().into_owned()
    } else {
        program.to_string()
    }
}

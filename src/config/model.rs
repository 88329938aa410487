// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Default engine binary (SuperCollider's language interpreter on macOS).
pub const DEFAULT_ENGINE_PROGRAM: &str = "/Applications/SuperCollider.app/Contents/MacOS/sclang";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// program = "/Applications/SuperCollider.app/Contents/MacOS/sclang"
/// script = "runner/audition.scd"
/// kill_before_run = ["sclang", "scsynth"]
///
/// [discovery]
/// dir = "synths"
/// pattern = "*.scd"
///
/// [capture]
/// device = "MacBook Pro Speakers"
///
/// [timeouts]
/// run_secs = 10.0
/// ```
///
/// All sections are optional and have defaults matching the stock layout of
/// an audition checkout. Use [`ConfigFile`] (via `TryFrom`) for a validated
/// view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub capture: CaptureSection,

    #[serde(default)]
    pub timeouts: TimeoutSection,
}

/// Validated configuration.
///
/// Constructed only through `TryFrom<RawConfigFile>`, so holders can rely on
/// positive timeouts and a compilable discovery pattern.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub discovery: DiscoverySection,
    pub capture: CaptureSection,
    pub timeouts: TimeoutSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            engine: raw.engine,
            discovery: raw.discovery,
            capture: raw.capture,
            timeouts: raw.timeouts,
        }
    }
}

/// `[engine]` section: how the synthesis engine is launched.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Engine executable. Bare names are looked up on `PATH` at launch.
    #[serde(default = "default_program")]
    pub program: String,

    /// Audition script handed to the engine.
    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Engine configuration file (`-l`).
    #[serde(default = "default_conf")]
    pub conf: PathBuf,

    /// Working directory for the engine (`-d`), created before launch.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,

    /// Process names asked to exit before the run starts.
    #[serde(default = "default_kill_before_run")]
    pub kill_before_run: Vec<String>,

    /// Extra arguments appended after the script.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_program() -> String {
    DEFAULT_ENGINE_PROGRAM.to_string()
}

fn default_script() -> PathBuf {
    PathBuf::from("runner/audition.scd")
}

fn default_conf() -> PathBuf {
    PathBuf::from("runner/sclang_conf.yaml")
}

fn default_runtime_dir() -> PathBuf {
    PathBuf::from("runner/runtime")
}

fn default_kill_before_run() -> Vec<String> {
    vec!["sclang".to_string(), "scsynth".to_string()]
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
            conf: default_conf(),
            runtime_dir: default_runtime_dir(),
            kill_before_run: default_kill_before_run(),
            extra_args: Vec::new(),
        }
    }
}

/// `[discovery]` section: where default audition targets are found.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    #[serde(default = "default_discovery_dir")]
    pub dir: PathBuf,

    /// Glob matched against file names inside `dir`.
    #[serde(default = "default_discovery_pattern")]
    pub pattern: String,
}

fn default_discovery_dir() -> PathBuf {
    PathBuf::from("synths")
}

fn default_discovery_pattern() -> String {
    "*.scd".to_string()
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            dir: default_discovery_dir(),
            pattern: default_discovery_pattern(),
        }
    }
}

/// `[capture]` section: the optional recording sidecar.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Recording tool, resolved on `PATH`.
    #[serde(default = "default_capture_tool")]
    pub tool: String,

    /// Input device. If `None`, a platform default is used.
    #[serde(default)]
    pub device: Option<String>,

    /// ffmpeg input format (`-f`). If `None`, only platforms with a known
    /// default (macOS: `avfoundation`) can capture.
    #[serde(default)]
    pub input_format: Option<String>,

    /// Output directory. Defaults to `<engine.runtime_dir>/recordings`.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_true() -> bool {
    true
}

fn default_capture_tool() -> String {
    "ffmpeg".to_string()
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_channels() -> u16 {
    2
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            enabled: true,
            tool: default_capture_tool(),
            device: None,
            input_format: None,
            dir: None,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

/// `[timeouts]` section. All values are seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSection {
    /// Hard wall-clock budget for the engine.
    #[serde(default = "default_run_secs")]
    pub run_secs: f64,

    /// Wait after terminating a timed-out engine.
    #[serde(default = "default_terminate_wait_secs")]
    pub terminate_wait_secs: f64,

    /// Wait after killing a timed-out engine.
    #[serde(default = "default_kill_wait_secs")]
    pub kill_wait_secs: f64,

    #[serde(default = "default_capture_interrupt_wait_secs")]
    pub capture_interrupt_wait_secs: f64,

    #[serde(default = "default_capture_terminate_wait_secs")]
    pub capture_terminate_wait_secs: f64,

    #[serde(default = "default_capture_kill_wait_secs")]
    pub capture_kill_wait_secs: f64,
}

fn default_run_secs() -> f64 {
    10.0
}

fn default_terminate_wait_secs() -> f64 {
    5.0
}

fn default_kill_wait_secs() -> f64 {
    2.0
}

fn default_capture_interrupt_wait_secs() -> f64 {
    5.0
}

fn default_capture_terminate_wait_secs() -> f64 {
    2.0
}

fn default_capture_kill_wait_secs() -> f64 {
    2.0
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            run_secs: default_run_secs(),
            terminate_wait_secs: default_terminate_wait_secs(),
            kill_wait_secs: default_kill_wait_secs(),
            capture_interrupt_wait_secs: default_capture_interrupt_wait_secs(),
            capture_terminate_wait_secs: default_capture_terminate_wait_secs(),
            capture_kill_wait_secs: default_capture_kill_wait_secs(),
        }
    }
}

impl TimeoutSection {
    /// Named view over every budget, used by validation.
    pub(crate) fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("run_secs", self.run_secs),
            ("terminate_wait_secs", self.terminate_wait_secs),
            ("kill_wait_secs", self.kill_wait_secs),
            ("capture_interrupt_wait_secs", self.capture_interrupt_wait_secs),
            ("capture_terminate_wait_secs", self.capture_terminate_wait_secs),
            ("capture_kill_wait_secs", self.capture_kill_wait_secs),
        ]
    }
}

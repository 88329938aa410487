use std::path::{Path, PathBuf};
use std::time::Duration;

use audition_runner::cli::CliArgs;
use audition_runner::config::{ConfigFile, EnvSnapshot, RawConfigFile, Settings};
use audition_runner::engine::EngineCommand;

/// Builder for `Settings` rooted at a test directory.
///
/// Starts from the stock defaults with the parts that would touch the host
/// switched off: no stale-engine cleanup, capture disabled, and an
/// environment without any `AUDITION_*` variables.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let mut raw = RawConfigFile::default();
        raw.engine.kill_before_run.clear();
        raw.capture.enabled = false;

        let cfg = ConfigFile::try_from(raw).expect("stock defaults must validate");
        let settings = Settings::resolve(&cfg, root.as_ref(), clean_env(), &CliArgs::default());
        Self { settings }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn escalation(mut self, terminate_wait: Duration, kill_wait: Duration) -> Self {
        self.settings.escalation.terminate_wait = terminate_wait;
        self.settings.escalation.kill_wait = kill_wait;
        self
    }

    pub fn only(mut self, label: &str) -> Self {
        self.settings.only = Some(label.to_string());
        self
    }

    pub fn debug(mut self, val: bool) -> Self {
        self.settings.debug = val;
        self
    }

    pub fn discovery(mut self, dir: impl Into<PathBuf>, pattern: &str) -> Self {
        self.settings.discovery.dir = dir.into();
        self.settings.discovery.pattern = pattern.to_string();
        self
    }

    pub fn runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.engine.runtime_dir = dir.into();
        self
    }

    pub fn env_var(mut self, key: &str, value: &str) -> Self {
        self.settings.env = self.settings.env.with(key, value);
        self
    }

    pub fn capture_enabled(mut self, val: bool) -> Self {
        self.settings.capture.enabled = val;
        self
    }

    pub fn capture_platform(mut self, platform: &str) -> Self {
        self.settings.capture.platform = platform.to_string();
        self
    }

    pub fn capture_input_format(mut self, format: &str) -> Self {
        self.settings.capture.input_format = Some(format.to_string());
        self
    }

    pub fn capture_device(mut self, device: &str) -> Self {
        self.settings.capture.device = device.to_string();
        self
    }

    pub fn capture_tool(mut self, tool: &str) -> Self {
        self.settings.capture.tool = tool.to_string();
        self
    }

    pub fn capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.capture.dir = dir.into();
        self
    }

    pub fn capture_waits(mut self, interrupt: Duration, terminate: Duration, kill: Duration) -> Self {
        self.settings.capture.interrupt_wait = interrupt;
        self.settings.capture.terminate_wait = terminate;
        self.settings.capture.kill_wait = kill;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Engine command running `script` under `sh -c`, with the environment the
/// real engine would get.
pub fn sh_command(settings: &Settings, label: Option<&str>, script: &str) -> EngineCommand {
    EngineCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        env: EngineCommand::environment(settings, label),
    }
}

fn clean_env() -> EnvSnapshot {
    let env = EnvSnapshot::from_process();
    EnvSnapshot::from_pairs(env.iter().filter(|(k, _)| !k.starts_with("AUDITION_")))
}

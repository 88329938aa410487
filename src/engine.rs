// src/engine.rs

//! Command line and environment for the synthesis engine.

use std::fmt;

use crate::config::env::{ENV_ENGINE_MARKER, ENV_ONLY};
use crate::config::{EnvSnapshot, Settings};
use crate::supervise::{LaunchSpec, SignalScope, StdioMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: EnvSnapshot,
}

impl EngineCommand {
    /// `<program> -D -d <runtime_dir> -l <conf> <script> [extra_args...]`
    pub fn from_settings(settings: &Settings, label: Option<&str>) -> Self {
        let engine = &settings.engine;
        let mut args = vec![
            "-D".to_string(),
            "-d".to_string(),
            engine.runtime_dir.to_string_lossy().into_owned(),
            "-l".to_string(),
            engine.conf.to_string_lossy().into_owned(),
            engine.script.to_string_lossy().into_owned(),
        ];
        args.extend(engine.extra_args.iter().cloned());

        Self {
            program: engine.program.clone(),
            args,
            env: Self::environment(settings, label),
        }
    }

    /// The invocation's environment plus the engine marker and, when a
    /// target was chosen, the target label.
    pub fn environment(settings: &Settings, label: Option<&str>) -> EnvSnapshot {
        let env = settings.env.with(ENV_ENGINE_MARKER, "1");
        match label {
            Some(label) => env.with(ENV_ONLY, label),
            None => env,
        }
    }

    /// The engine runs as leader of its own process group on the runner's
    /// terminal.
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.program.clone(),
            args: self.args.clone(),
            env: Some(self.env.clone()),
            scope: SignalScope::Group,
            stdio: StdioMode::Inherit,
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// src/runner.rs

//! The supervised audition run.
//!
//! One call to [`Runner::run`] is one audition: resolve the target, clean up
//! stale engines, start the capture sidecar, supervise the engine under the
//! timeout, stop the sidecar, report a single exit status.
//!
//! The capture handle is moved into `CaptureSidecar::stop`, and the only
//! code between `start` and `stop` returns a `Result` instead of using `?`,
//! so the stop step runs exactly once on every path.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::capture::{CaptureReport, CaptureRequest, CaptureSidecar};
use crate::cleanup::{CleanupOutcome, kill_stale_engines};
use crate::config::Settings;
use crate::discover::TargetDiscoverer;
use crate::engine::EngineCommand;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::supervise::{TerminationPlan, supervise};
use crate::types::{FinalState, GroupSignal};

/// Everything one invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub state: FinalState,
    /// The single status handed back to the caller.
    pub exit_code: i32,
    pub signals_sent: Vec<GroupSignal>,
    pub capture: CaptureReport,
    pub label: Option<String>,
}

/// Result of making sure a directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirOutcome {
    Ready,
    Failed(String),
}

pub struct Runner<S: CaptureSidecar> {
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    sidecar: S,
}

impl<S: CaptureSidecar> std::fmt::Debug for Runner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: CaptureSidecar> Runner<S> {
    pub fn new(settings: Settings, fs: Arc<dyn FileSystem>, sidecar: S) -> Self {
        Self {
            settings,
            fs,
            sidecar,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sidecar(&self) -> &S {
        &self.sidecar
    }

    /// Run the audition with the engine command built from settings.
    pub async fn run(&mut self) -> Result<RunReport> {
        self.run_with(EngineCommand::from_settings).await
    }

    /// Run the audition with a caller-built engine command.
    ///
    /// `build` receives the settings and the resolved target label.
    pub async fn run_with<F>(&mut self, build: F) -> Result<RunReport>
    where
        F: FnOnce(&Settings, Option<&str>) -> EngineCommand,
    {
        if self.settings.debug {
            debug!("debug mode enabled");
        }

        let label = self.resolve_label();

        let cleanup = kill_stale_engines(&self.settings.engine.kill_before_run).await;
        if cleanup.iter().any(|(_, o)| *o == CleanupOutcome::ToolMissing) {
            debug!("pkill unavailable; skipped stale engine cleanup");
        }

        if let DirOutcome::Failed(reason) = ensure_dir(self.fs.as_ref(), &self.settings.engine.runtime_dir) {
            debug!("unable to ensure runtime directory: {reason}");
        }

        let command = build(&self.settings, label.as_deref());
        let plan = TerminationPlan::for_engine(self.settings.escalation);
        let request = CaptureRequest::new(&self.settings, label.as_deref());

        // Sidecar brackets the engine: started strictly before launch,
        // stopped strictly after the outcome is known.
        let capture = self.sidecar.start(&request);
        let supervised = supervise(&command.launch_spec(), self.settings.timeout, &plan).await;
        let capture_report = self.sidecar.stop(capture).await;

        let supervision = supervised?;
        debug!(state = ?supervision.state, exit_code = supervision.exit_code, "audition finished");

        Ok(RunReport {
            state: supervision.state,
            exit_code: supervision.exit_code,
            signals_sent: supervision.signals_sent,
            capture: capture_report,
            label,
        })
    }

    /// Explicit override first, then the newest artifact on disk.
    fn resolve_label(&self) -> Option<String> {
        if let Some(only) = &self.settings.only {
            return Some(only.clone());
        }

        let discovery = &self.settings.discovery;
        let discoverer = match TargetDiscoverer::new(&discovery.dir, &discovery.pattern) {
            Ok(d) => d,
            Err(e) => {
                debug!(error = %e, "target discovery unavailable");
                return None;
            }
        };

        let target = discoverer.latest(self.fs.as_ref())?;
        info!("defaulting to SynthDef '{target}'");
        Some(target)
    }
}

/// Create `path` (and parents) if missing.
pub fn ensure_dir(fs: &dyn FileSystem, path: &Path) -> DirOutcome {
    match fs.create_dir_all(path) {
        Ok(()) => DirOutcome::Ready,
        Err(e) => DirOutcome::Failed(format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn ensure_dir_reports_failure_instead_of_erroring() {
        let fs = MockFileSystem::new();
        fs.deny_create_under("/ro");

        assert_eq!(ensure_dir(&fs, Path::new("/rw/runtime")), DirOutcome::Ready);
        assert!(matches!(ensure_dir(&fs, Path::new("/ro/runtime")), DirOutcome::Failed(_)));
    }
}

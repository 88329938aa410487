// src/capture/mod.rs

//! Capture sidecar: an optional recorder that brackets the engine run.
//!
//! The runner talks to a [`CaptureSidecar`] instead of spawning the recorder
//! itself, so tests can swap in a fake while production uses
//! [`ffmpeg::FfmpegSidecar`].
//!
//! Nothing here can fail the run. Unmet preconditions produce an inactive
//! [`CaptureHandle`] carrying a [`CaptureSkip`] reason; problems while
//! stopping are folded into the returned [`CaptureReport`].

pub mod ffmpeg;
pub mod label;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{CaptureSettings, Settings};
use crate::fs::FileSystem;
use crate::supervise::{SupervisedProcess, TerminationPlan};

pub use ffmpeg::FfmpegSidecar;
pub use label::{FALLBACK_LABEL, sanitize_capture_label};

/// Selection used for the label when no target was chosen.
pub const DEFAULT_SELECTION: &str = "all";

/// How long to wait for the recorder's stderr to reach EOF after it exited.
const STDERR_DRAIN_BUDGET: Duration = Duration::from_secs(1);

/// Inputs for starting a capture.
///
/// Debug-mode diagnostics are emitted at `debug` level; debug mode raises the
/// subscriber to that level (see [`crate::logging`]).
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub settings: CaptureSettings,
    /// Target selection the output file is named after (`all` if none).
    pub selection: String,
}

impl CaptureRequest {
    pub fn new(settings: &Settings, label: Option<&str>) -> Self {
        Self {
            settings: settings.capture.clone(),
            selection: label
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SELECTION)
                .to_string(),
        }
    }
}

/// Why no recorder was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSkip {
    Disabled,
    UnsupportedPlatform(String),
    EmptyDevice,
    ToolNotFound(String),
    DirectoryUnavailable { path: PathBuf, reason: String },
    SpawnFailed(String),
}

impl fmt::Display for CaptureSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSkip::Disabled => f.write_str("capture disabled"),
            CaptureSkip::UnsupportedPlatform(os) => {
                write!(f, "no capture input format configured for platform '{os}'")
            }
            CaptureSkip::EmptyDevice => f.write_str("empty device name"),
            CaptureSkip::ToolNotFound(tool) => write!(f, "{tool} not found"),
            CaptureSkip::DirectoryUnavailable { path, reason } => {
                write!(f, "unable to prepare directory {} ({reason})", path.display())
            }
            CaptureSkip::SpawnFailed(e) => write!(f, "failed to start recorder: {e}"),
        }
    }
}

/// A running recorder.
#[derive(Debug)]
pub struct ActiveCapture {
    process: SupervisedProcess,
    output: PathBuf,
    stderr: Option<JoinHandle<Vec<u8>>>,
    plan: TerminationPlan,
}

impl ActiveCapture {
    /// Wrap a launched recorder; its stderr is drained in the background from
    /// here on so the pipe can never fill up.
    pub fn new(mut process: SupervisedProcess, output: PathBuf, plan: TerminationPlan) -> Self {
        let stderr = process.take_stderr().map(spawn_drain);
        Self {
            process,
            output,
            stderr,
            plan,
        }
    }
}

/// Result of [`CaptureSidecar::start`]. Must be handed back to
/// [`CaptureSidecar::stop`], which consumes it.
#[derive(Debug)]
#[must_use = "a capture handle must be passed to CaptureSidecar::stop"]
pub struct CaptureHandle {
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Inactive(CaptureSkip),
    Active(ActiveCapture),
}

impl CaptureHandle {
    pub fn skipped(reason: CaptureSkip) -> Self {
        Self {
            state: HandleState::Inactive(reason),
        }
    }

    pub fn active(capture: ActiveCapture) -> Self {
        Self {
            state: HandleState::Active(capture),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, HandleState::Active(_))
    }

    pub fn skip_reason(&self) -> Option<&CaptureSkip> {
        match &self.state {
            HandleState::Inactive(reason) => Some(reason),
            HandleState::Active(_) => None,
        }
    }

    pub fn output_path(&self) -> Option<&Path> {
        match &self.state {
            HandleState::Active(a) => Some(&a.output),
            HandleState::Inactive(_) => None,
        }
    }
}

/// What stopping the sidecar found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureReport {
    /// No recorder was running.
    NotStarted,
    /// The recorder exited non-zero.
    Failed { code: i32, diagnostics: String },
    Saved(PathBuf),
    NoOutput,
}

/// Trait abstracting the recording sidecar.
pub trait CaptureSidecar: Send {
    /// Start recording if every precondition holds. Never fails; an
    /// unmet precondition yields an inactive handle.
    fn start(&mut self, request: &CaptureRequest) -> CaptureHandle;

    /// Stop a handle returned by `start`. A no-op for inactive handles.
    fn stop(&mut self, handle: CaptureHandle) -> Pin<Box<dyn Future<Output = CaptureReport> + Send + '_>>;
}

/// Escalate a recorder to exit, collect its diagnostics and report.
pub async fn stop_capture(handle: CaptureHandle, fs: &dyn FileSystem) -> CaptureReport {
    let active = match handle.state {
        HandleState::Inactive(_) => return CaptureReport::NotStarted,
        HandleState::Active(active) => active,
    };
    let ActiveCapture {
        mut process,
        output,
        stderr,
        plan,
    } = active;

    let escalation = plan.execute(&mut process).await;
    let code = escalation.exit_code();
    if code.is_none() {
        warn!(
            pid = process.pid(),
            signals = ?escalation.signals_sent,
            "audio capture did not stop within {:?}",
            plan.total_wait()
        );
    }

    let diagnostics = match stderr {
        Some(task) => collect_drain(task).await,
        None => String::new(),
    };

    match code {
        Some(code) if code != 0 => {
            if diagnostics.is_empty() {
                warn!("audio capture exited with code {code}");
            } else {
                warn!("audio capture exited with code {code}: {diagnostics}");
            }
            CaptureReport::Failed { code, diagnostics }
        }
        _ if fs.exists(&output) => {
            info!("audio capture saved to {}", output.display());
            CaptureReport::Saved(output)
        }
        _ => {
            debug!("audio capture produced no output");
            CaptureReport::NoOutput
        }
    }
}

fn spawn_drain(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            debug!(error = %e, "error reading recorder stderr");
        }
        buf
    })
}

async fn collect_drain(mut task: JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(STDERR_DRAIN_BUDGET, &mut task).await {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).trim().to_string(),
        Ok(Err(e)) => {
            debug!(error = %e, "recorder stderr reader failed");
            String::new()
        }
        Err(_) => {
            // Something else still holds the pipe open.
            task.abort();
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[tokio::test]
    async fn stopping_inactive_handle_is_a_noop() {
        let fs = MockFileSystem::new();
        let handle = CaptureHandle::skipped(CaptureSkip::EmptyDevice);
        assert!(!handle.is_active());
        assert_eq!(handle.output_path(), None);

        let report = tokio::time::timeout(Duration::from_millis(100), stop_capture(handle, &fs))
            .await
            .expect("stop of an inactive handle must not wait");
        assert_eq!(report, CaptureReport::NotStarted);
    }

    #[test]
    fn skip_reasons_render_for_diagnostics() {
        assert_eq!(CaptureSkip::ToolNotFound("ffmpeg".into()).to_string(), "ffmpeg not found");
        let skip = CaptureSkip::DirectoryUnavailable {
            path: PathBuf::from("/ro/rec"),
            reason: "denied".into(),
        };
        assert_eq!(skip.to_string(), "unable to prepare directory /ro/rec (denied)");
    }
}

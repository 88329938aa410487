// src/capture/ffmpeg.rs

//! Production capture sidecar recording with `ffmpeg`.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::capture::{
    ActiveCapture, CaptureHandle, CaptureReport, CaptureRequest, CaptureSidecar, CaptureSkip,
    sanitize_capture_label, stop_capture,
};
use crate::config::CaptureSettings;
use crate::fs::FileSystem;
use crate::supervise::{LaunchSpec, SignalScope, StdioMode, SupervisedProcess, TerminationPlan};

/// Looks a tool name up on the execution path.
pub type ToolResolver = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;

/// A capture whose preconditions all hold, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCapture {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub output: PathBuf,
}

pub struct FfmpegSidecar {
    fs: Arc<dyn FileSystem>,
    resolve_tool: ToolResolver,
}

impl fmt::Debug for FfmpegSidecar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FfmpegSidecar")
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl FfmpegSidecar {
    /// Sidecar resolving the tool on `PATH` with `which`.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            resolve_tool: Box::new(|tool| which::which(tool).ok()),
        }
    }

    /// Replace the tool lookup (tests point it at stubs or at nothing).
    pub fn with_resolver<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf> + Send + Sync + 'static,
    {
        self.resolve_tool = Box::new(resolve);
        self
    }

    /// Check every precondition, in order, and build the recorder command.
    ///
    /// Creates the output directory as a side effect.
    pub fn prepare(
        &self,
        request: &CaptureRequest,
        now: NaiveDateTime,
    ) -> Result<PreparedCapture, CaptureSkip> {
        let settings = &request.settings;
        if !settings.enabled {
            return Err(CaptureSkip::Disabled);
        }

        let input_format = effective_input_format(settings)
            .ok_or_else(|| CaptureSkip::UnsupportedPlatform(settings.platform.clone()))?;

        let device = settings.device.trim();
        if device.is_empty() {
            return Err(CaptureSkip::EmptyDevice);
        }

        let program = (self.resolve_tool)(&settings.tool)
            .ok_or_else(|| CaptureSkip::ToolNotFound(settings.tool.clone()))?;

        self.fs
            .create_dir_all(&settings.dir)
            .map_err(|e| CaptureSkip::DirectoryUnavailable {
                path: settings.dir.clone(),
                reason: format!("{e:#}"),
            })?;

        let label = sanitize_capture_label(&request.selection);
        let output = settings
            .dir
            .join(format!("{}-{}.wav", now.format("%Y%m%d-%H%M%S"), label));
        let args = recorder_args(settings, input_format, device, &output);

        Ok(PreparedCapture {
            program,
            args,
            output,
        })
    }

    fn launch(&self, prepared: PreparedCapture, settings: &CaptureSettings) -> CaptureHandle {
        let spec = LaunchSpec {
            program: prepared.program.to_string_lossy().into_owned(),
            args: prepared.args,
            env: None,
            scope: SignalScope::Process,
            stdio: StdioMode::DiagnosticsOnly,
        };

        match SupervisedProcess::launch(&spec) {
            Ok(process) => {
                debug!("capturing audio to {}", prepared.output.display());
                CaptureHandle::active(ActiveCapture::new(
                    process,
                    prepared.output,
                    TerminationPlan::for_capture(settings),
                ))
            }
            Err(e) => {
                let skip = CaptureSkip::SpawnFailed(e.to_string());
                debug!("audio capture skipped: {skip}");
                CaptureHandle::skipped(skip)
            }
        }
    }
}

impl CaptureSidecar for FfmpegSidecar {
    fn start(&mut self, request: &CaptureRequest) -> CaptureHandle {
        let now = chrono::Local::now().naive_local();
        match self.prepare(request, now) {
            Ok(prepared) => self.launch(prepared, &request.settings),
            Err(skip) => {
                debug!("audio capture skipped: {skip}");
                CaptureHandle::skipped(skip)
            }
        }
    }

    fn stop(&mut self, handle: CaptureHandle) -> Pin<Box<dyn Future<Output = CaptureReport> + Send + '_>> {
        let fs = Arc::clone(&self.fs);
        Box::pin(async move { stop_capture(handle, fs.as_ref()).await })
    }
}

/// Configured input format, or the platform's default one.
pub fn effective_input_format(settings: &CaptureSettings) -> Option<&str> {
    settings
        .input_format
        .as_deref()
        .or_else(|| default_input_format(&settings.platform))
}

fn default_input_format(platform: &str) -> Option<&'static str> {
    match platform {
        "macos" => Some("avfoundation"),
        _ => None,
    }
}

fn recorder_args(
    settings: &CaptureSettings,
    input_format: &str,
    device: &str,
    output: &Path,
) -> Vec<String> {
    // avfoundation addresses devices as "<video>:<audio>"; audio only here.
    let input = if input_format == "avfoundation" {
        format!(":{device}")
    } else {
        device.to_string()
    };

    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostdin".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        input_format.to_string(),
        "-i".to_string(),
        input,
        "-ac".to_string(),
        settings.channels.to_string(),
        "-ar".to_string(),
        settings.sample_rate.to_string(),
        "-c:a".to_string(),
        "pcm_s16le".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use audition_runner::capture::{
    CaptureHandle, CaptureReport, CaptureRequest, CaptureSidecar, CaptureSkip,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidecarEvent {
    Started {
        selection: String,
        /// Whether the marker file existed when `start` was called.
        marker_existed: bool,
    },
    Stopped {
        marker_existed: bool,
    },
}

/// A capture sidecar that never records anything but logs every call.
///
/// Point `marker` at a file the engine script creates to check that `start`
/// ran before the engine and `stop` ran after it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSidecar {
    events: Arc<Mutex<Vec<SidecarEvent>>>,
    marker: Option<PathBuf>,
}

impl RecordingSidecar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: impl Into<PathBuf>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn events(&self) -> Vec<SidecarEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SidecarEvent::Stopped { .. }))
            .count()
    }

    fn marker_exists(&self) -> bool {
        self.marker.as_ref().is_some_and(|m| m.exists())
    }
}

impl CaptureSidecar for RecordingSidecar {
    fn start(&mut self, request: &CaptureRequest) -> CaptureHandle {
        let event = SidecarEvent::Started {
            selection: request.selection.clone(),
            marker_existed: self.marker_exists(),
        };
        self.events.lock().unwrap().push(event);
        CaptureHandle::skipped(CaptureSkip::Disabled)
    }

    fn stop(&mut self, _handle: CaptureHandle) -> Pin<Box<dyn Future<Output = CaptureReport> + Send + '_>> {
        let event = SidecarEvent::Stopped {
            marker_existed: self.marker_exists(),
        };
        self.events.lock().unwrap().push(event);
        Box::pin(async { CaptureReport::NotStarted })
    }
}

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::SessionState;
use crate::traits::session_delegate::SessionDelegate;

/// Out-of-band notifications for the UI shell.
///
/// Serialized as `{"event": "recording-done", "output_path": "..."}` and
/// `{"event": "recording-error", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RecorderEvent {
    RecordingDone { output_path: String },
    RecordingError { message: String },
}

impl From<&RecordingResult> for RecorderEvent {
    fn from(result: &RecordingResult) -> Self {
        Self::RecordingDone {
            output_path: result.file_path.to_string_lossy().to_string(),
        }
    }
}

impl From<&CaptureError> for RecorderEvent {
    fn from(error: &CaptureError) -> Self {
        Self::RecordingError {
            message: error.to_string(),
        }
    }
}

/// SessionDelegate that forwards terminal events into a tokio channel.
pub struct ChannelDelegate {
    tx: mpsc::UnboundedSender<RecorderEvent>,
}

impl ChannelDelegate {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RecorderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn publish(&self, event: RecorderEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Recorder event dropped: no listener");
        }
    }
}

impl SessionDelegate for ChannelDelegate {
    fn on_state_changed(&self, state: &SessionState) {
        log::debug!("Recording state: {}", state.label());
    }

    fn on_recording_done(&self, result: &RecordingResult) {
        self.publish(result.into());
    }

    fn on_recording_error(&self, error: &CaptureError) {
        self.publish(error.into());
    }
}

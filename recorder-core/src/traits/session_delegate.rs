use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::SessionState;

/// Event delegate for recording session notifications.
///
/// Called from the session's coordinator task. For every accepted session
/// exactly one of `on_recording_done` / `on_recording_error` is called, after
/// the session slot has been released.
pub trait SessionDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called when the recording file is complete.
    fn on_recording_done(&self, result: &RecordingResult);

    /// Called when the recording ends without a usable file.
    fn on_recording_error(&self, error: &CaptureError);
}

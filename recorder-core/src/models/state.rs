use super::error::CaptureError;
use super::recording_result::RecordingResult;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → recording → completed / failed / timed out
///           ↓
///         failed (output directory or spawn error)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Starting,
    Recording,
    Completed(Box<RecordingResult>),
    Failed(CaptureError),
    TimedOut,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// `Starting` and `Recording` hold the session slot.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Starting | Self::Recording)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Recording => "recording",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::TimedOut => "timed out",
        }
    }
}

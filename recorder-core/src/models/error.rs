use std::fmt;

use thiserror::Error;

/// Errors that can occur while discovering devices or recording.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Recording is not supported on this platform")]
    PlatformUnsupported,

    #[error("Invalid device selection")]
    InvalidRequest,

    #[error("A recording is already in progress")]
    SessionBusy,

    #[error("Recording failed due to an internal error: {0}")]
    Spawn(String),

    #[error("Failed to access audio devices. Please check your device selection. ({cause})")]
    DeviceAccess { cause: DeviceFailure },

    #[error("Recording failed with exit code {}", ExitCode(.code))]
    NonZeroExit { code: Option<i32> },

    #[error("Recording timed out")]
    Timeout,

    #[error("Recording cancelled")]
    Cancelled,

    #[error("capture process error: {0}")]
    Process(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

struct ExitCode<'a>(&'a Option<i32>);

impl fmt::Display for ExitCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code}"),
            None => f.write_str("none (terminated by signal)"),
        }
    }
}

/// A known error signature in the capture binary's diagnostic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFailure {
    CouldNotOpenDevice,
    DeviceNotFound,
    InputOpenFailed,
}

impl DeviceFailure {
    const ALL: [DeviceFailure; 3] = [
        DeviceFailure::CouldNotOpenDevice,
        DeviceFailure::DeviceNotFound,
        DeviceFailure::InputOpenFailed,
    ];

    /// The literal text that identifies this failure in a diagnostic line.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::CouldNotOpenDevice => "Could not open audio device",
            Self::DeviceNotFound => "Device not found",
            Self::InputOpenFailed => "Error opening input",
        }
    }

    /// Returns the first failure whose signature occurs in `line`.
    pub fn detect(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| line.contains(f.signature()))
    }
}

impl fmt::Display for DeviceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CouldNotOpenDevice => "the audio device could not be opened",
            Self::DeviceNotFound => "the audio device was not found",
            Self::InputOpenFailed => "an input stream could not be opened",
        })
    }
}

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Direction of an audio endpoint as inferred from the capture binary's listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Unknown,
}

/// An audio endpoint reported by the capture binary.
///
/// Identity is the raw name string exactly as the binary printed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub direction: Direction,
}

/// Result of one enumeration run.
///
/// Both lists keep first-seen order and never contain duplicates. An empty
/// catalog means "no devices found" or "enumeration failed"; callers cannot
/// and need not distinguish the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCatalog {
    pub microphones: Vec<String>,
    pub speakers: Vec<String>,
}

impl DeviceCatalog {
    pub fn is_empty(&self) -> bool {
        self.microphones.is_empty() && self.speakers.is_empty()
    }

    /// Adds the device to the list matching its direction.
    ///
    /// Returns `false` if the name is already listed (in either list) or the
    /// direction is `Unknown`.
    pub fn insert(&mut self, device: &Device) -> bool {
        if self.contains(&device.name) {
            return false;
        }
        let list = match device.direction {
            Direction::Input => &mut self.microphones,
            Direction::Output => &mut self.speakers,
            Direction::Unknown => return false,
        };
        list.push(device.name.clone());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.microphones.iter().chain(&self.speakers).any(|n| n == name)
    }
}

/// The microphone/speaker pair a recording should capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingRequest {
    #[serde(alias = "mic")]
    pub microphone: String,
    pub speaker: String,
}

impl RecordingRequest {
    pub fn new(microphone: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            microphone: microphone.into(),
            speaker: speaker.into(),
        }
    }

    /// Rejects a request with a missing device selection.
    ///
    /// Names are not checked against hardware; that is the caller's job.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.microphone.trim().is_empty() || self.speaker.trim().is_empty() {
            return Err(CaptureError::InvalidRequest);
        }
        Ok(())
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::CaptureFormat;
use super::device::RecordingRequest;

/// Result returned when a recording completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    /// Absolute path of the finished recording.
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
}

/// Descriptive data about a finished recording. Kept in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub microphone: String,
    pub speaker: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordingMetadata {
    pub fn new(
        id: uuid::Uuid,
        request: &RecordingRequest,
        created_at: chrono::DateTime<chrono::Utc>,
        format: CaptureFormat,
    ) -> Self {
        Self {
            id: id.to_string(),
            microphone: request.microphone.clone(),
            speaker: request.speaker.clone(),
            created_at: created_at.to_rfc3339(),
            sample_rate: format.sample_rate,
            channels: format.channels,
        }
    }
}

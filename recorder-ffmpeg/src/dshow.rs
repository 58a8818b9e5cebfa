//! DirectShow capture through ffmpeg's `dshow` input device.
//!
//! The speaker endpoint is input 0 and the microphone input 1; `amerge`
//! combines both into one stream that is encoded to the output file.

use std::path::Path;

use recorder_core::models::config::CaptureFormat;
use recorder_core::models::device::RecordingRequest;
use recorder_core::traits::capture_backend::CaptureBackend;

/// First line of the audio part of ffmpeg's dshow device listing.
pub const DSHOW_SECTION_MARKER: &str = "DirectShow audio devices";

const MERGE_FILTER: &str = "[0:a][1:a]amerge=inputs=2[aout]";

/// Whether DirectShow capture can work on this platform.
pub fn capture_backend_available() -> bool {
    cfg!(target_os = "windows")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectShowBackend;

impl DirectShowBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureBackend for DirectShowBackend {
    fn name(&self) -> &str {
        "dshow"
    }

    fn is_available(&self) -> bool {
        capture_backend_available()
    }

    fn section_marker(&self) -> &str {
        DSHOW_SECTION_MARKER
    }

    fn list_devices_args(&self) -> Vec<String> {
        ["-list_devices", "true", "-f", "dshow", "-i", "dummy"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn record_args(
        &self,
        request: &RecordingRequest,
        output: &Path,
        format: &CaptureFormat,
    ) -> Vec<String> {
        vec![
            "-f".into(),
            "dshow".into(),
            "-i".into(),
            format!("audio={}", request.speaker),
            "-f".into(),
            "dshow".into(),
            "-i".into(),
            format!("audio={}", request.microphone),
            "-filter_complex".into(),
            MERGE_FILTER.into(),
            "-map".into(),
            "[aout]".into(),
            "-ac".into(),
            format.channels.to_string(),
            "-ar".into(),
            format.sample_rate.to_string(),
            "-y".into(),
            output.display().to_string(),
        ]
    }
}

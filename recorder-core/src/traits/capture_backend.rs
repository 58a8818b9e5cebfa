use std::path::Path;

use crate::models::config::CaptureFormat;
use crate::models::device::RecordingRequest;

/// Interface for a platform capture backend driven through the capture binary.
///
/// A backend knows which arguments put the binary into list or record mode and
/// which line opens the device section of the listing. Implemented by:
/// - `DirectShowBackend` (Windows, ffmpeg `dshow`)
pub trait CaptureBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Whether this backend can work on the current platform.
    ///
    /// Checked before every spawn.
    fn is_available(&self) -> bool;

    /// Line that marks the start of the audio device listing.
    fn section_marker(&self) -> &str;

    /// Arguments that make the binary print its device listing.
    fn list_devices_args(&self) -> Vec<String>;

    /// Arguments that record `request` into `output`, overwriting it.
    fn record_args(
        &self,
        request: &RecordingRequest,
        output: &Path,
        format: &CaptureFormat,
    ) -> Vec<String>;
}

use crate::models::error::CaptureError;
use crate::process::ProcessHandle;

/// Starts capture binary processes.
///
/// Each successful call creates exactly one OS process, owned by the returned
/// handle. A missing or unstartable binary yields `CaptureError::Spawn`, which
/// callers treat as final.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, args: &[String]) -> Result<ProcessHandle, CaptureError>;
}

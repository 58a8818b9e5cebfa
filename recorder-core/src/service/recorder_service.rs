use std::sync::Arc;

use crate::discovery::enumerator::DeviceEnumerator;
use crate::models::config::RecorderConfig;
use crate::models::device::{DeviceCatalog, RecordingRequest};
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::session::supervisor::SessionSupervisor;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::process_spawner::ProcessSpawner;
use crate::traits::session_delegate::SessionDelegate;

/// Transport-agnostic request surface for a UI shell.
///
/// | Request              | Response                                      |
/// |----------------------|-----------------------------------------------|
/// | `get_audio_devices`  | catalog, empty on any failure                 |
/// | `start_recording`    | nothing; outcome arrives as a delegate event  |
/// | `stop_recording`     | nothing; the file is finalized, then done     |
/// | `cancel_recording`   | nothing; the session ends with an error event |
pub struct RecorderService {
    config: RecorderConfig,
    enumerator: DeviceEnumerator,
    supervisor: SessionSupervisor,
    delegate: Arc<dyn SessionDelegate>,
}

impl RecorderService {
    pub fn new(
        config: RecorderConfig,
        backend: Arc<dyn CaptureBackend>,
        spawner: Arc<dyn ProcessSpawner>,
        delegate: Arc<dyn SessionDelegate>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            enumerator: DeviceEnumerator::new(Arc::clone(&backend), Arc::clone(&spawner)),
            supervisor: SessionSupervisor::new(backend, spawner, config.clone(), Arc::clone(&delegate)),
            config,
            delegate,
        })
    }

    pub async fn get_audio_devices(&self) -> DeviceCatalog {
        self.enumerator
            .enumerate(self.config.enumeration_timeout())
            .await
    }

    /// Fire-and-forget. Rejections are reported through
    /// `on_recording_error` like any other failure.
    pub fn start_recording(&self, request: RecordingRequest) {
        match self.supervisor.start_recording(request) {
            Ok(id) => log::info!("Recording session {} accepted", id),
            Err(e) => {
                log::warn!("Recording request rejected: {}", e);
                self.delegate.on_recording_error(&e);
            }
        }
    }

    pub fn stop_recording(&self) {
        self.supervisor.stop();
    }

    pub fn cancel_recording(&self) {
        self.supervisor.cancel();
    }

    pub fn state(&self) -> SessionState {
        self.supervisor.state()
    }
}

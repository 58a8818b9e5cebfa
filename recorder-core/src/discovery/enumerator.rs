//! One-shot device discovery through the capture binary.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::catalog::parser::DeviceCatalogParser;
use crate::models::device::{DeviceCatalog, Direction};
use crate::process::ProcessEvent;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::process_spawner::ProcessSpawner;

/// Runs the capture binary in list mode and turns its listing into a
/// [`DeviceCatalog`].
///
/// Discovery is best effort: every failure (unsupported platform, missing
/// binary, hang, broken stream) yields an empty catalog instead of an error.
pub struct DeviceEnumerator {
    backend: Arc<dyn CaptureBackend>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl DeviceEnumerator {
    pub fn new(backend: Arc<dyn CaptureBackend>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { backend, spawner }
    }

    /// Enumerates devices, giving the binary at most `timeout` to finish.
    ///
    /// The exit code is ignored: the binary exits non-zero after a listing
    /// because `dummy` is not a real input, yet the listing is still valid.
    pub async fn enumerate(&self, timeout: Duration) -> DeviceCatalog {
        if !self.backend.is_available() {
            log::error!(
                "Device enumeration via {} is not supported on this platform",
                self.backend.name()
            );
            return DeviceCatalog::default();
        }

        let mut process = match self.spawner.spawn(&self.backend.list_devices_args()) {
            Ok(process) => process,
            Err(e) => {
                log::error!("Failed to start device enumeration: {}", e);
                return DeviceCatalog::default();
            }
        };

        let mut parser = DeviceCatalogParser::new(self.backend.section_marker());
        let deadline = Instant::now() + timeout;

        loop {
            let event = match timeout_at(deadline, process.next_event()).await {
                Ok(event) => event,
                Err(_) => {
                    process.kill();
                    log::error!("Device enumeration timed out after {:?}", timeout);
                    return DeviceCatalog::default();
                }
            };

            match event {
                Some(ProcessEvent::Line(line)) => {
                    log::debug!("enumeration: {}", line);
                    if let Some(device) = parser.feed(&line) {
                        let kind = match device.direction {
                            Direction::Input => "microphone",
                            _ => "speaker",
                        };
                        log::info!("Found {}: {}", kind, device.name);
                    }
                }
                Some(ProcessEvent::Exited(status)) => {
                    log::debug!("Device enumeration exited with {:?}", status.code());
                    break;
                }
                Some(ProcessEvent::Error(message)) => {
                    process.kill();
                    log::error!("Device enumeration failed: {}", message);
                    return DeviceCatalog::default();
                }
                None => break,
            }
        }

        if !parser.in_section() {
            log::warn!(
                "Device listing never reached the \"{}\" section",
                self.backend.section_marker()
            );
        }

        let catalog = parser.finish();
        log::info!(
            "Detected {} microphone(s) and {} speaker(s)",
            catalog.microphones.len(),
            catalog.speakers.len()
        );
        if catalog.is_empty() {
            log::warn!("No audio devices detected");
        }
        catalog
    }
}

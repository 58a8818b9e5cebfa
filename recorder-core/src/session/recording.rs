use std::fs;
use std::future::pending;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::{sleep, Sleep};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::config::CaptureFormat;
use crate::models::device::RecordingRequest;
use crate::models::error::{CaptureError, DeviceFailure};
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::SessionState;
use crate::process::{ProcessEvent, ProcessHandle};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::process_spawner::ProcessSpawner;
use crate::traits::session_delegate::SessionDelegate;

/// Signals that end a running recording early.
///
/// Cloning shares the signals. Both are idempotent and may be raised before,
/// during or after the recording.
#[derive(Debug, Clone, Default)]
pub struct SessionControl {
    cancel: CancellationToken,
    stop: CancellationToken,
}

impl SessionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the capture process and fail the session with `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Ask the capture process to finalize the file and exit.
    pub fn stop(&self) {
        self.stop.cancel();
    }
}

/// Time limits applied while a session is recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Safety limit for the whole recording.
    pub timeout: Duration,
    /// How long a graceful stop may take before the process is killed.
    pub stop_grace: Duration,
}

/// One recording from request to terminal state.
///
/// A session is single-use:
/// ```text
/// new() → [Idle] ─start()─▶ [Starting] ─spawned─▶ [Recording] ─wait()─▶ terminal
/// ```
/// `start` rejects an invalid request or an unavailable backend without
/// leaving `Idle`. Once `wait` returns, the session is terminal and cannot be
/// started again.
pub struct RecordingSession {
    id: Uuid,
    request: RecordingRequest,
    output_path: PathBuf,
    format: CaptureFormat,
    started_at: Option<DateTime<Utc>>,
    state: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn SessionDelegate>>,
    process: Option<ProcessHandle>,
}

impl RecordingSession {
    pub fn new(request: RecordingRequest, output_path: PathBuf, format: CaptureFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            output_path,
            format,
            started_at: None,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            delegate: None,
            process: None,
        }
    }

    /// Receives `on_state_changed` for every transition of this session.
    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub(crate) fn shared_state(&self) -> Arc<Mutex<SessionState>> {
        Arc::clone(&self.state)
    }

    /// Spawns the capture process. Transitions: idle → starting → recording.
    ///
    /// `InvalidRequest` and `PlatformUnsupported` leave the session idle;
    /// any later failure leaves it failed.
    pub fn start(
        &mut self,
        backend: &dyn CaptureBackend,
        spawner: &dyn ProcessSpawner,
    ) -> Result<(), CaptureError> {
        if !self.state.lock().is_idle() {
            return Err(CaptureError::ConfigurationFailed(
                "can only start from idle state".into(),
            ));
        }
        self.request.validate()?;
        if !backend.is_available() {
            return Err(CaptureError::PlatformUnsupported);
        }

        self.set_state(SessionState::Starting);

        if let Some(dir) = self.output_path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                return Err(self.fail(CaptureError::StorageError(format!(
                    "cannot create {}: {}",
                    dir.display(),
                    e
                ))));
            }
        }

        let args = backend.record_args(&self.request, &self.output_path, &self.format);
        log::info!(
            "Starting recording with mic: {} and speaker: {}",
            self.request.microphone,
            self.request.speaker
        );
        log::info!("Output path: {}", self.output_path.display());

        match spawner.spawn(&args) {
            Ok(process) => {
                log::debug!("Capture process started (pid {:?})", process.pid());
                self.process = Some(process);
                self.started_at = Some(Utc::now());
                self.set_state(SessionState::Recording);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Supervises the capture process until the first terminal condition.
    /// Transitions: recording → completed / failed / timed out.
    ///
    /// Conditions, first one observed wins:
    /// - a known error signature on the diagnostic stream (process killed)
    /// - process exit (code 0 completes, anything else fails)
    /// - the safety timeout (process killed)
    /// - `control.cancel()` (process killed)
    /// - `control.stop()` followed by exit, or by the stop grace expiring
    pub async fn wait(
        &mut self,
        limits: SessionLimits,
        control: &SessionControl,
    ) -> Result<RecordingResult, CaptureError> {
        let Some(mut process) = self.process.take() else {
            return Err(match self.state() {
                SessionState::Failed(e) => e,
                _ => CaptureError::ConfigurationFailed("session is not recording".into()),
            });
        };

        let safety = sleep(limits.timeout);
        tokio::pin!(safety);
        let mut grace: Option<Pin<Box<Sleep>>> = None;
        let mut stopping = false;

        let outcome = loop {
            tokio::select! {
                biased;

                _ = control.cancel.cancelled() => {
                    process.kill();
                    log::info!("Recording cancelled");
                    break Err(CaptureError::Cancelled);
                }
                _ = &mut safety => {
                    process.kill();
                    log::error!("Recording timed out after {:?}", limits.timeout);
                    break Err(CaptureError::Timeout);
                }
                _ = expire(grace.as_mut()) => {
                    process.kill();
                    log::error!("Capture process ignored the stop request for {:?}", limits.stop_grace);
                    break Err(CaptureError::Timeout);
                }
                _ = control.stop.cancelled(), if !stopping => {
                    stopping = true;
                    log::info!("Stopping recording");
                    process.request_stop();
                    grace = Some(Box::pin(sleep(limits.stop_grace)));
                }
                event = process.next_event() => match event {
                    Some(ProcessEvent::Line(line)) => {
                        log::debug!("capture: {}", line);
                        if let Some(cause) = DeviceFailure::detect(&line) {
                            process.kill();
                            log::error!("Capture failed: {}", line);
                            break Err(CaptureError::DeviceAccess { cause });
                        }
                    }
                    Some(ProcessEvent::Exited(status)) if status.success() => {
                        log::info!("Recording completed successfully");
                        break Ok(());
                    }
                    Some(ProcessEvent::Exited(status)) => {
                        log::error!("Recording process exited with code {:?}", status.code());
                        break Err(CaptureError::NonZeroExit { code: status.code() });
                    }
                    Some(ProcessEvent::Error(message)) => {
                        process.kill();
                        log::error!("Recording process error: {}", message);
                        break Err(CaptureError::Process(message));
                    }
                    None => {
                        break Err(CaptureError::Process(
                            "capture process ended without an exit status".into(),
                        ));
                    }
                },
            }
        };
        drop(process);

        match outcome {
            Ok(()) => {
                let result = self.result();
                self.set_state(SessionState::Completed(Box::new(result.clone())));
                Ok(result)
            }
            Err(CaptureError::Timeout) => {
                self.set_state(SessionState::TimedOut);
                Err(CaptureError::Timeout)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // --- Internal helpers ---

    fn result(&self) -> RecordingResult {
        let started_at = self.started_at.unwrap_or_else(Utc::now);
        let duration_secs = (Utc::now() - started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        RecordingResult {
            file_path: self.output_path.clone(),
            duration_secs,
            metadata: RecordingMetadata::new(self.id, &self.request, started_at, self.format),
        }
    }

    fn fail(&self, error: CaptureError) -> CaptureError {
        self.set_state(SessionState::Failed(error.clone()));
        error
    }

    fn set_state(&self, new_state: SessionState) {
        {
            let mut s = self.state.lock();
            *s = new_state.clone();
        }
        log::debug!("Session {} is {}", self.id, new_state.label());
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }
}

/// Resolves when the timer fires; never resolves without a timer.
async fn expire(timer: Option<&mut Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.await,
        None => pending().await,
    }
}

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::RecorderConfig;
use crate::models::device::RecordingRequest;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::session::recording::{RecordingSession, SessionControl, SessionLimits};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::process_spawner::ProcessSpawner;
use crate::traits::session_delegate::SessionDelegate;

/// The session currently holding the slot.
struct ActiveSession {
    id: Uuid,
    state: Arc<Mutex<SessionState>>,
    control: SessionControl,
}

/// Owns at most one non-terminal [`RecordingSession`] at a time.
///
/// The capture binary can only mux one microphone/speaker pair into one file,
/// so a second `start_recording` while a session is active is rejected with
/// `SessionBusy` rather than queued.
///
/// Requests are two-phase: `start_recording` either rejects the request
/// immediately or accepts it; an accepted session ends with exactly one
/// `on_recording_done` or `on_recording_error` on the delegate.
pub struct SessionSupervisor {
    backend: Arc<dyn CaptureBackend>,
    spawner: Arc<dyn ProcessSpawner>,
    config: RecorderConfig,
    delegate: Arc<dyn SessionDelegate>,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

impl SessionSupervisor {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        spawner: Arc<dyn ProcessSpawner>,
        config: RecorderConfig,
        delegate: Arc<dyn SessionDelegate>,
    ) -> Self {
        Self {
            backend,
            spawner,
            config,
            delegate,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts a recording and returns its session id.
    ///
    /// Immediate rejections: `SessionBusy`, `InvalidRequest`,
    /// `PlatformUnsupported`, `ConfigurationFailed`. Every other outcome is
    /// delivered to the delegate. Must be called from within a tokio runtime.
    pub fn start_recording(&self, request: RecordingRequest) -> Result<Uuid, CaptureError> {
        let output_path = self.config.output_path()?;
        let mut session = RecordingSession::new(request, output_path, self.config.format());
        session.set_delegate(Arc::clone(&self.delegate));
        let id = session.id();
        let control = SessionControl::new();

        {
            let mut slot = self.active.lock();
            if slot.is_some() {
                log::warn!("Rejecting recording request: a session is already active");
                return Err(CaptureError::SessionBusy);
            }
            *slot = Some(ActiveSession {
                id,
                state: session.shared_state(),
                control: control.clone(),
            });
        }

        if let Err(e) = session.start(self.backend.as_ref(), self.spawner.as_ref()) {
            Self::release(&self.active, id);
            return match e {
                CaptureError::InvalidRequest | CaptureError::PlatformUnsupported => Err(e),
                e => {
                    log::error!("Recording failed to start: {}", e);
                    self.delegate.on_recording_error(&e);
                    Ok(id)
                }
            };
        }

        let limits = SessionLimits {
            timeout: self.config.recording_timeout(),
            stop_grace: self.config.stop_grace(),
        };
        let active = Arc::clone(&self.active);
        let delegate = Arc::clone(&self.delegate);

        tokio::spawn(async move {
            let outcome = session.wait(limits, &control).await;
            Self::release(&active, id);
            match outcome {
                Ok(result) => delegate.on_recording_done(&result),
                Err(e) => delegate.on_recording_error(&e),
            }
        });

        Ok(id)
    }

    /// Kills the active recording. No-op when idle.
    pub fn cancel(&self) {
        if let Some(active) = self.active.lock().as_ref() {
            log::info!("Cancelling session {}", active.id);
            active.control.cancel();
        }
    }

    /// Asks the active recording to finish its file. No-op when idle.
    pub fn stop(&self) {
        if let Some(active) = self.active.lock().as_ref() {
            log::info!("Stopping session {}", active.id);
            active.control.stop();
        }
    }

    /// State of the active session, or `Idle` when there is none.
    pub fn state(&self) -> SessionState {
        match self.active.lock().as_ref() {
            Some(active) => active.state.lock().clone(),
            None => SessionState::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.lock().is_some()
    }

    fn release(active: &Mutex<Option<ActiveSession>>, id: Uuid) {
        let mut slot = active.lock();
        if slot.as_ref().is_some_and(|a| a.id == id) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::service::events::{ChannelDelegate, RecorderEvent};
    use crate::testing::{settle, Ending, FakeBackend, Script, ScriptedSpawner};

    fn supervisor(
        spawner: Arc<ScriptedSpawner>,
        dir: &Path,
    ) -> (SessionSupervisor, tokio::sync::mpsc::UnboundedReceiver<RecorderEvent>) {
        let (delegate, events) = ChannelDelegate::new();
        let config = RecorderConfig {
            output_directory: dir.to_path_buf(),
            ..Default::default()
        };
        let supervisor = SessionSupervisor::new(
            Arc::new(FakeBackend { available: true }),
            spawner,
            config,
            Arc::new(delegate),
        );
        (supervisor, events)
    }

    fn request() -> RecordingRequest {
        RecordingRequest::new("Mic Array (Realtek)", "Speakers (Realtek)")
    }

    #[tokio::test]
    async fn busy_while_recording() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::hang()));
        let (supervisor, mut events) = supervisor(Arc::clone(&spawner), dir.path());

        supervisor.start_recording(request()).unwrap();
        assert!(supervisor.is_busy());
        assert!(supervisor.state().is_recording());

        assert_eq!(
            supervisor.start_recording(request()),
            Err(CaptureError::SessionBusy)
        );
        assert_eq!(spawner.log.spawn_count(), 1);

        supervisor.cancel();
        assert_eq!(
            events.recv().await,
            Some(RecorderEvent::RecordingError {
                message: "Recording cancelled".into()
            })
        );
        assert!(!supervisor.is_busy());

        supervisor.start_recording(request()).unwrap();
        assert_eq!(spawner.log.spawn_count(), 2);
        supervisor.cancel();
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::hang()));
        let (supervisor, mut events) = supervisor(Arc::clone(&spawner), dir.path());

        assert_eq!(
            supervisor.start_recording(RecordingRequest::new("", "X")),
            Err(CaptureError::InvalidRequest)
        );
        assert!(!supervisor.is_busy());
        assert_eq!(spawner.log.spawn_count(), 0);
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn clean_exit_publishes_done_once() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::new(
            ["size=  64kB time=00:00:04.00"],
            Ending::Exit(0),
        )));
        let (supervisor, mut events) = supervisor(spawner, dir.path());

        supervisor.start_recording(request()).unwrap();

        let expected = dir.path().join("meeting-recording.mp3");
        assert_eq!(
            events.recv().await,
            Some(RecorderEvent::RecordingDone {
                output_path: expected.display().to_string()
            })
        );
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(supervisor.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn first_terminal_condition_wins() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::new(
            ["[dshow @ 0x2] Device not found"],
            Ending::Exit(0),
        )));
        let (supervisor, mut events) = supervisor(Arc::clone(&spawner), dir.path());

        supervisor.start_recording(request()).unwrap();

        match events.recv().await {
            Some(RecorderEvent::RecordingError { message }) => {
                assert!(message.starts_with("Failed to access audio devices"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
        assert!(spawner.log.kill_count() >= 1);
    }

    #[tokio::test]
    async fn spawn_failure_is_published_as_event() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::missing_binary());
        let (supervisor, mut events) = supervisor(spawner, dir.path());

        assert!(supervisor.start_recording(request()).is_ok());
        match events.recv().await {
            Some(RecorderEvent::RecordingError { message }) => {
                assert!(message.starts_with("Recording failed due to an internal error"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(!supervisor.is_busy());
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn stop_completes_recording() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::new(
            Vec::<String>::new(),
            Ending::Hang { stop_code: Some(0) },
        )));
        let (supervisor, mut events) = supervisor(spawner, dir.path());

        supervisor.start_recording(request()).unwrap();
        supervisor.stop();
        supervisor.stop();

        assert!(matches!(
            events.recv().await,
            Some(RecorderEvent::RecordingDone { .. })
        ));
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_publishes_one_error() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::hang()));
        let (delegate, mut events) = ChannelDelegate::new();
        let supervisor = SessionSupervisor::new(
            Arc::new(FakeBackend { available: true }),
            Arc::clone(&spawner) as Arc<dyn ProcessSpawner>,
            RecorderConfig {
                output_directory: dir.path().to_path_buf(),
                recording_timeout_secs: 2,
                ..Default::default()
            },
            Arc::new(delegate),
        );

        supervisor.start_recording(request()).unwrap();
        assert_eq!(
            events.recv().await,
            Some(RecorderEvent::RecordingError {
                message: "Recording timed out".into()
            })
        );
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
        assert!(spawner.log.kill_count() >= 1);
        assert!(!supervisor.is_busy());
    }

    #[tokio::test]
    async fn cancel_and_stop_when_idle_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::hang()));
        let (supervisor, mut events) = supervisor(spawner, dir.path());

        supervisor.cancel();
        supervisor.stop();
        assert_eq!(supervisor.state(), SessionState::Idle);
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn cancel_after_exit_publishes_nothing_more() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = Arc::new(ScriptedSpawner::new(Script::new(
            Vec::<String>::new(),
            Ending::Exit(3),
        )));
        let (supervisor, mut events) = supervisor(spawner, dir.path());

        supervisor.start_recording(request()).unwrap();
        assert_eq!(
            events.recv().await,
            Some(RecorderEvent::RecordingError {
                message: "Recording failed with exit code 3".into()
            })
        );
        supervisor.cancel();
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }
}

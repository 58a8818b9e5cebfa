//! Scripted stand-ins for the capture binary, shared by the unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::CaptureFormat;
use crate::models::device::RecordingRequest;
use crate::models::error::CaptureError;
use crate::process::{ExitStatus, ProcessControl, ProcessDriver, ProcessEvent, ProcessHandle};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::process_spawner::ProcessSpawner;

pub const MARKER: &str = "DirectShow audio devices";

pub struct FakeBackend {
    pub available: bool,
}

impl CaptureBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn section_marker(&self) -> &str {
        MARKER
    }

    fn list_devices_args(&self) -> Vec<String> {
        vec!["--list".into()]
    }

    fn record_args(
        &self,
        request: &RecordingRequest,
        output: &Path,
        _format: &CaptureFormat,
    ) -> Vec<String> {
        vec![
            "--record".into(),
            request.microphone.clone(),
            request.speaker.clone(),
            output.display().to_string(),
        ]
    }
}

/// What a scripted process does after printing its lines.
#[derive(Debug, Clone)]
pub enum Ending {
    Exit(i32),
    Fail(String),
    /// Runs until killed; a stop request makes it exit with `stop_code`.
    Hang { stop_code: Option<i32> },
}

#[derive(Debug, Clone)]
pub struct Script {
    pub lines: Vec<String>,
    pub ending: Ending,
}

impl Script {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>, ending: Ending) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ending,
        }
    }

    pub fn hang() -> Self {
        Self::new(Vec::<String>::new(), Ending::Hang { stop_code: None })
    }
}

#[derive(Default)]
pub struct SpawnLog {
    pub spawns: Mutex<Vec<Vec<String>>>,
    pub kills: AtomicUsize,
    pub stops: AtomicUsize,
}

impl SpawnLog {
    pub fn spawn_count(&self) -> usize {
        self.spawns.lock().len()
    }

    pub fn kill_count(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Spawner whose processes replay a [`Script`].
pub struct ScriptedSpawner {
    script: Option<Script>,
    pub log: Arc<SpawnLog>,
}

impl ScriptedSpawner {
    pub fn new(script: Script) -> Self {
        Self {
            script: Some(script),
            log: Arc::default(),
        }
    }

    /// A spawner whose binary cannot be started.
    pub fn missing_binary() -> Self {
        Self {
            script: None,
            log: Arc::default(),
        }
    }
}

impl ProcessSpawner for ScriptedSpawner {
    fn spawn(&self, args: &[String]) -> Result<ProcessHandle, CaptureError> {
        let script = self
            .script
            .clone()
            .ok_or_else(|| CaptureError::Spawn("program not found".into()))?;
        self.log.spawns.lock().push(args.to_vec());

        let (handle, driver) = ProcessHandle::channel(Some(4242));
        tokio::spawn(replay(script, driver, Arc::clone(&self.log)));
        Ok(handle)
    }
}

async fn replay(script: Script, mut driver: ProcessDriver, log: Arc<SpawnLog>) {
    for line in script.lines {
        driver.send(ProcessEvent::Line(line));
    }

    let mut running = true;
    match &script.ending {
        Ending::Exit(code) => {
            driver.send(ProcessEvent::Exited(ExitStatus::from_code(Some(*code))));
            running = false;
        }
        Ending::Fail(message) => {
            driver.send(ProcessEvent::Error(message.clone()));
            running = false;
        }
        Ending::Hang { .. } => {}
    }

    while let Some(control) = driver.next_control().await {
        match control {
            ProcessControl::Kill => {
                log.kills.fetch_add(1, Ordering::SeqCst);
                if running {
                    running = false;
                    driver.send(ProcessEvent::Exited(ExitStatus::from_code(None)));
                }
            }
            ProcessControl::Stop => {
                log.stops.fetch_add(1, Ordering::SeqCst);
                if let (true, Ending::Hang { stop_code: Some(code) }) = (running, &script.ending) {
                    running = false;
                    driver.send(ProcessEvent::Exited(ExitStatus::from_code(Some(*code))));
                }
            }
        }
    }
}

/// Lets spawned tasks on the current-thread test runtime catch up.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

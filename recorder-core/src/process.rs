//! Backend-neutral view of one spawned capture process.
//!
//! A [`ProcessHandle`] is the consumer end: it yields [`ProcessEvent`]s in the
//! order the process produced them and sends [`ProcessControl`] requests back.
//! A [`ProcessDriver`] is the producer end, owned by whatever task actually
//! talks to the OS process (or by a scripted stand-in in tests).
//!
//! ```text
//! [child stderr] → driver task ── ProcessEvent ──▶ ProcessHandle::next_event()
//!        [child] ◀── kill / "q" ── ProcessControl ◀── ProcessHandle::kill()
//! ```

use tokio::sync::mpsc;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: Option<i32>,
}

impl ExitStatus {
    /// `None` means the process was terminated by a signal.
    pub fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something observed on a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// One line of the diagnostic stream.
    Line(String),
    /// The process ended. Always the last event.
    Exited(ExitStatus),
    /// The process could not be observed any further (stream read or wait
    /// failed). Always the last event.
    Error(String),
}

impl ProcessEvent {
    fn is_final(&self) -> bool {
        matches!(self, Self::Exited(_) | Self::Error(_))
    }
}

/// Request sent from a handle to its driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessControl {
    /// Ask the process to finish on its own terms.
    Stop,
    /// Terminate the process now.
    Kill,
}

/// Exclusive ownership of one spawned process.
///
/// Dropping a handle before the process has exited kills it.
pub struct ProcessHandle {
    pid: Option<u32>,
    events: mpsc::UnboundedReceiver<ProcessEvent>,
    control: mpsc::UnboundedSender<ProcessControl>,
    finished: bool,
}

impl ProcessHandle {
    /// Creates a connected handle/driver pair.
    pub fn channel(pid: Option<u32>) -> (Self, ProcessDriver) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let handle = Self {
            pid,
            events: event_rx,
            control: control_tx,
            finished: false,
        };
        let driver = ProcessDriver {
            events: event_tx,
            control: control_rx,
        };
        (handle, driver)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Waits for the next event. Returns `None` once the final event has been
    /// delivered or the driver went away.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await;
        match &event {
            Some(e) if !e.is_final() => {}
            _ => self.finished = true,
        }
        event
    }

    /// Kills the process. Safe to call repeatedly or after exit.
    pub fn kill(&self) {
        let _ = self.control.send(ProcessControl::Kill);
    }

    /// Asks the process to finish gracefully. Safe to call repeatedly or after
    /// exit.
    pub fn request_stop(&self) {
        let _ = self.control.send(ProcessControl::Stop);
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.finished {
            self.kill();
        }
    }
}

/// Producer end of a [`ProcessHandle`].
pub struct ProcessDriver {
    events: mpsc::UnboundedSender<ProcessEvent>,
    control: mpsc::UnboundedReceiver<ProcessControl>,
}

impl ProcessDriver {
    /// Delivers an event. Returns `false` if the handle has been dropped.
    pub fn send(&self, event: ProcessEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Waits for the next control request. `None` means the handle was
    /// dropped, which callers should treat like `Kill`.
    pub async fn next_control(&mut self) -> Option<ProcessControl> {
        self.control.recv().await
    }
}

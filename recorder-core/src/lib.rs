//! # recorder-core
//!
//! Platform-agnostic core of the meeting recorder.
//!
//! Parses the capture binary's device listing into microphones and speakers,
//! and supervises a single recording process at a time. The capture binary
//! itself is reached through two seams: a [`CaptureBackend`] that knows its
//! arguments and output format, and a [`ProcessSpawner`] that runs it.
//!
//! ## Architecture
//!
//! ```text
//! recorder-core (this crate)
//! ├── traits/       ← CaptureBackend, ProcessSpawner, SessionDelegate
//! ├── models/       ← CaptureError, SessionState, RecorderConfig, DeviceCatalog, etc.
//! ├── catalog/      ← DeviceCatalogParser (line-by-line listing classifier)
//! ├── discovery/    ← DeviceEnumerator (runs the listing with a deadline)
//! ├── session/      ← RecordingSession, SessionSupervisor (one at a time)
//! ├── service/      ← RecorderService facade, RecorderEvent, ChannelDelegate
//! └── process.rs    ← ProcessHandle / ProcessDriver event channel
//! ```

pub mod catalog;
pub mod discovery;
pub mod models;
pub mod process;
pub mod service;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use catalog::parser::{classify, parse, DeviceCatalogParser};
pub use discovery::enumerator::DeviceEnumerator;
pub use models::config::{CaptureFormat, RecorderConfig};
pub use models::device::{Device, DeviceCatalog, Direction, RecordingRequest};
pub use models::error::{CaptureError, DeviceFailure};
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::SessionState;
pub use process::{ExitStatus, ProcessControl, ProcessDriver, ProcessEvent, ProcessHandle};
pub use service::events::{ChannelDelegate, RecorderEvent};
pub use service::recorder_service::RecorderService;
pub use session::recording::{RecordingSession, SessionControl, SessionLimits};
pub use session::supervisor::SessionSupervisor;
pub use traits::capture_backend::CaptureBackend;
pub use traits::process_spawner::ProcessSpawner;
pub use traits::session_delegate::SessionDelegate;

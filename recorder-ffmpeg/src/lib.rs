//! # recorder-ffmpeg
//!
//! ffmpeg backend for recorder-core.
//!
//! Provides:
//! - `FfmpegSpawner`: runs ffmpeg as a tokio child process and streams its stderr
//! - `DirectShowBackend`: dshow listing and dual-input record arguments
//! - `locate_ffmpeg`: explicit path, then `FFMPEG_PATH`, then `PATH`
//!
//! ## Platform Requirements
//! - Recording and device listing need Windows (DirectShow)
//! - An ffmpeg build with the `dshow` input device
//!
//! ## Usage
//! ```ignore
//! use recorder_core::{ChannelDelegate, RecorderConfig};
//!
//! let (delegate, events) = ChannelDelegate::new();
//! let service = recorder_ffmpeg::build_service(RecorderConfig::default(), Arc::new(delegate))?;
//! let catalog = service.get_audio_devices().await;
//! ```

pub mod dshow;
pub mod locate;
pub mod process;

use std::sync::Arc;

use recorder_core::models::config::RecorderConfig;
use recorder_core::models::error::CaptureError;
use recorder_core::service::recorder_service::RecorderService;
use recorder_core::traits::session_delegate::SessionDelegate;

pub use dshow::{capture_backend_available, DirectShowBackend, DSHOW_SECTION_MARKER};
pub use locate::{locate_ffmpeg, resolve_ffmpeg, FFMPEG_PATH_ENV};
pub use process::{DiagnosticLines, FfmpegSpawner};

/// Wires a [`RecorderService`] to ffmpeg over DirectShow.
pub fn build_service(
    config: RecorderConfig,
    delegate: Arc<dyn SessionDelegate>,
) -> Result<RecorderService, CaptureError> {
    let binary = locate_ffmpeg(config.ffmpeg_path.as_deref());
    RecorderService::new(
        config,
        Arc::new(DirectShowBackend::new()),
        Arc::new(FfmpegSpawner::new(binary)),
        delegate,
    )
}

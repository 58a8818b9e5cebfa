//! Locating the ffmpeg binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the binary location.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Bare binary name, resolved through `PATH` at spawn time.
pub fn default_binary() -> &'static str {
    if cfg!(target_os = "windows") {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

/// Picks the binary: explicit path, then a non-empty `env` value, then the
/// bare name.
pub fn resolve_ffmpeg(explicit: Option<&Path>, env: Option<OsString>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default_binary()),
    }
}

/// [`resolve_ffmpeg`] against the process environment.
pub fn locate_ffmpeg(explicit: Option<&Path>) -> PathBuf {
    let binary = resolve_ffmpeg(explicit, std::env::var_os(FFMPEG_PATH_ENV));
    log::debug!("Using ffmpeg binary: {}", binary.display());
    binary
}

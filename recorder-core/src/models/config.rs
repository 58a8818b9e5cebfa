use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Output stream format handed to the capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Recorder configuration.
///
/// Every field has a default, so a JSON file only needs to name the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Explicit path to the capture binary. `None` falls back to the
    /// `FFMPEG_PATH` environment variable, then to `PATH` lookup.
    pub ffmpeg_path: Option<PathBuf>,

    /// Directory the recording is written to (default: current directory).
    pub output_directory: PathBuf,

    /// File name of the recording inside `output_directory`. An existing file
    /// with this name is overwritten.
    pub file_name: String,

    /// Output sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Output channel count (default: 2).
    pub channels: u16,

    /// Hard limit for one device enumeration run.
    pub enumeration_timeout_secs: u64,

    /// Safety limit for one recording.
    pub recording_timeout_secs: u64,

    /// How long a graceful stop may take before the process is killed.
    pub stop_grace_secs: u64,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.file_name.trim().is_empty() {
            return Err("file name must not be empty".into());
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(format!("file name must not contain a path separator: {}", self.file_name));
        }
        if self.enumeration_timeout_secs == 0
            || self.recording_timeout_secs == 0
            || self.stop_grace_secs == 0
        {
            return Err("timeouts must be positive".into());
        }
        Ok(())
    }

    /// Loads and validates a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, CaptureError> {
        let json = fs::read_to_string(path).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }

    /// Absolute path of the recording file.
    pub fn output_path(&self) -> Result<PathBuf, CaptureError> {
        std::path::absolute(self.output_directory.join(&self.file_name)).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("cannot resolve output path: {}", e))
        })
    }

    pub fn format(&self) -> CaptureFormat {
        CaptureFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    pub fn enumeration_timeout(&self) -> Duration {
        Duration::from_secs(self.enumeration_timeout_secs)
    }

    pub fn recording_timeout(&self) -> Duration {
        Duration::from_secs(self.recording_timeout_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            output_directory: PathBuf::from("."),
            file_name: "meeting-recording.mp3".into(),
            sample_rate: 44100,
            channels: 2,
            enumeration_timeout_secs: 10,
            recording_timeout_secs: 60 * 60,
            stop_grace_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RecorderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enumeration_timeout(), Duration::from_secs(10));
        assert_eq!(config.recording_timeout(), Duration::from_secs(3600));
        assert_eq!(
            config.format(),
            CaptureFormat {
                sample_rate: 44100,
                channels: 2
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            RecorderConfig {
                sample_rate: 0,
                ..Default::default()
            },
            RecorderConfig {
                channels: 6,
                ..Default::default()
            },
            RecorderConfig {
                file_name: "".into(),
                ..Default::default()
            },
            RecorderConfig {
                file_name: "../escape.mp3".into(),
                ..Default::default()
            },
            RecorderConfig {
                recording_timeout_secs: 0,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn output_path_is_absolute() {
        let config = RecorderConfig {
            output_directory: PathBuf::from("recordings"),
            ..Default::default()
        };
        let path = config.output_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("recordings/meeting-recording.mp3"));
    }

    #[test]
    fn loads_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"file_name": "standup.mp3", "recording_timeout_secs": 120}}"#).unwrap();

        let config = RecorderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.file_name, "standup.mp3");
        assert_eq!(config.recording_timeout_secs, 120);
        assert_eq!(config.sample_rate, 44100);
    }

    #[test]
    fn invalid_json_file_is_a_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"channels": 8}}"#).unwrap();

        assert!(matches!(
            RecorderConfig::from_json_file(file.path()),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }
}

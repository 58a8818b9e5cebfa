use std::future::pending;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use recorder_core::{ChannelDelegate, DeviceCatalog, RecorderConfig, RecorderEvent, RecordingRequest};

/// Builds the effective configuration.
///
/// Without a config file or `--output-dir`, recordings land on the desktop.
pub fn load_config(
    path: Option<&Path>,
    ffmpeg: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<RecorderConfig> {
    let mut config = match path {
        Some(path) => RecorderConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RecorderConfig {
            output_directory: dirs_next::desktop_dir().unwrap_or_else(|| PathBuf::from(".")),
            ..Default::default()
        },
    };
    if let Some(dir) = output_dir {
        config.output_directory = dir;
    }
    if ffmpeg.is_some() {
        config.ffmpeg_path = ffmpeg;
    }
    Ok(config)
}

/// Enumerate devices and print them
pub async fn devices(config: RecorderConfig, json: bool) -> Result<()> {
    let (delegate, _events) = ChannelDelegate::new();
    let service = recorder_ffmpeg::build_service(config, Arc::new(delegate))?;

    let catalog = service.get_audio_devices().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print_catalog(&catalog);
    }
    Ok(())
}

fn print_catalog(catalog: &DeviceCatalog) {
    if catalog.is_empty() {
        println!("No audio devices found");
        return;
    }
    println!("Microphones:");
    for name in &catalog.microphones {
        println!("  {}", name);
    }
    println!("Speakers:");
    for name in &catalog.speakers {
        println!("  {}", name);
    }
}

/// Record until the process finishes, Ctrl-C, or `duration` elapses.
///
/// The first Ctrl-C stops gracefully so the file is finalized; a second one
/// cancels.
pub async fn record(
    config: RecorderConfig,
    mic: String,
    speaker: String,
    duration: Option<u64>,
) -> Result<()> {
    let (delegate, mut events) = ChannelDelegate::new();
    let service = recorder_ffmpeg::build_service(config, Arc::new(delegate))?;

    service.start_recording(RecordingRequest::new(mic, speaker));
    if service.state().is_busy() {
        eprintln!("Recording... press Ctrl-C to stop");
    }

    let stop_after = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => pending().await,
        }
    };
    tokio::pin!(stop_after);
    let mut stop_sent = false;
    let mut interrupts = 0u32;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RecorderEvent::RecordingDone { output_path }) => {
                    println!("Saved recording to {}", output_path);
                    return Ok(());
                }
                Some(RecorderEvent::RecordingError { message }) => bail!(message),
                None => bail!("recorder stopped without a result"),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                interrupts += 1;
                if interrupts == 1 {
                    eprintln!("Stopping... press Ctrl-C again to discard");
                    service.stop_recording();
                } else {
                    service.cancel_recording();
                }
            }
            _ = &mut stop_after, if !stop_sent => {
                stop_sent = true;
                log::info!("Duration reached, stopping");
                service.stop_recording();
            }
        }
    }
}

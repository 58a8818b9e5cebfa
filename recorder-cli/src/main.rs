//! recorder - meeting recorder front end
//!
//! Subcommands:
//! - `recorder devices` - List microphones and speakers
//! - `recorder record --mic <name> --speaker <name>` - Record both into one file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "recorder")]
#[command(about = "Record a microphone and a speaker into one audio file")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ffmpeg binary (overrides the config file and FFMPEG_PATH)
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List capture devices
    Devices {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a microphone and a speaker
    Record {
        /// Microphone device name, as listed by `devices`
        #[arg(long)]
        mic: String,

        /// Speaker device name, as listed by `devices`
        #[arg(long)]
        speaker: String,

        /// Directory for the recording (defaults to the desktop)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Stop gracefully after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli.command {
        Commands::Devices { json } => {
            let config = commands::load_config(cli.config.as_deref(), cli.ffmpeg, None)?;
            commands::devices(config, json).await?;
        }
        Commands::Record {
            mic,
            speaker,
            output_dir,
            duration,
        } => {
            let config = commands::load_config(cli.config.as_deref(), cli.ffmpeg, output_dir)?;
            commands::record(config, mic, speaker, duration).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn record_requires_both_devices() {
        assert!(Cli::try_parse_from(["recorder", "record", "--mic", "Mic"]).is_err());

        let cli = Cli::try_parse_from([
            "recorder",
            "record",
            "--mic",
            "Mic Array (Realtek)",
            "--speaker",
            "Speakers (Realtek)",
            "-d",
            "30",
            "--ffmpeg",
            "C:\\ffmpeg\\bin\\ffmpeg.exe",
        ])
        .unwrap();
        assert_eq!(cli.ffmpeg, Some(PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe")));
        match cli.command {
            Commands::Record {
                mic,
                speaker,
                duration,
                output_dir,
            } => {
                assert_eq!(mic, "Mic Array (Realtek)");
                assert_eq!(speaker, "Speakers (Realtek)");
                assert_eq!(duration, Some(30));
                assert_eq!(output_dir, None);
            }
            Commands::Devices { .. } => panic!("expected record"),
        }
    }
}

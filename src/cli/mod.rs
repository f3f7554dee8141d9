use crate::recording::synthesize;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meeting-relay")]
#[command(about = "Relay between meeting webhooks, Recall.ai bots and a live dashboard", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: <config dir>/meeting-relay/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overriding the config file and PORT
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the relay server (default)
    Serve,
    /// Print version information
    Version,
    /// Print the recording config a bot would be started with
    RecordingConfig(RecordingConfigArgs),
}

#[derive(ClapArgs, Debug)]
pub struct RecordingConfigArgs {
    /// Real-time event to request (repeatable), e.g. transcript.data
    #[arg(short, long = "event")]
    pub events: Vec<String>,
    /// Address the bot should stream events back to
    #[arg(short, long, default_value = "")]
    pub websocket_url: String,
}

pub fn handle_recording_config_command(args: RecordingConfigArgs) -> Result<()> {
    let config = synthesize(&args.events, &args.websocket_url);
    let json =
        serde_json::to_string_pretty(&config).context("Failed to serialize recording config")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording_config_command() {
        let cli = Cli::try_parse_from([
            "meeting-relay",
            "recording-config",
            "--event",
            "transcript.data",
            "-e",
            "audio_mixed_raw.data",
            "--websocket-url",
            "example.com",
        ])
        .unwrap();

        match cli.command {
            Some(CliCommand::RecordingConfig(args)) => {
                assert_eq!(args.events, vec!["transcript.data", "audio_mixed_raw.data"]);
                assert_eq!(args.websocket_url, "example.com");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["meeting-relay", "-v", "--port", "9000"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.port, Some(9000));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_port_after_subcommand() {
        let cli = Cli::try_parse_from(["meeting-relay", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Some(CliCommand::Serve)));
        assert_eq!(cli.port, Some(9000));
    }
}

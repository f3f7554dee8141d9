use anyhow::Result;
use clap::Parser;
use meeting_relay::{
    app::{self, ServiceOptions},
    cli::{handle_recording_config_command, Cli, CliCommand},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("meeting-relay {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::RecordingConfig(args)) => {
            handle_recording_config_command(args)?;
            return Ok(());
        }
        Some(CliCommand::Serve) | None => {}
    }

    app::run_service(ServiceOptions {
        config_path: cli.config,
        port: cli.port,
    })
    .await
}

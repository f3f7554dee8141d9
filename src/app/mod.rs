use crate::api::{ApiServer, AppState};
use crate::config::Config;
use crate::hub::EventHub;
use crate::recall::RecallClient;
use crate::recording::RecordingOptionsHandle;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Default)]
pub struct ServiceOptions {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
}

pub async fn run_service(options: ServiceOptions) -> Result<()> {
    info!("Starting meeting relay");

    let mut config = Config::load(options.config_path.as_deref())?;
    if let Some(port) = options.port {
        config.server.port = port;
    }
    warn_missing_credentials(&config);

    let hub = Arc::new(EventHub::new());
    let bot = RecallClient::new(
        config.recall.api_key.clone(),
        config.recall.api_base.clone(),
        hub.clone(),
    );

    let state = AppState {
        hub,
        options: RecordingOptionsHandle::default(),
        bot: Arc::new(bot),
        config: Arc::new(config),
    };

    ApiServer::new(state).start().await
}

fn warn_missing_credentials(config: &Config) {
    if config.recall.api_key().is_none() {
        warn!("RECALL_API_KEY is not set; bots cannot be started");
    }
    if config.zoom.secret_token().is_none() {
        warn!("ZOOM_SECRET_TOKEN is not set; Zoom URL validation will fail");
    }
}

use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variables that override the config file.
pub mod env {
    pub const PORT: &str = "PORT";
    pub const RECALL_API_KEY: &str = "RECALL_API_KEY";
    pub const ZOOM_CLIENT_ID: &str = "ZOOM_CLIENT_ID";
    pub const ZOOM_CLIENT_SECRET: &str = "ZOOM_CLIENT_SECRET";
    pub const ZOOM_SECRET_TOKEN: &str = "ZOOM_SECRET_TOKEN";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub recall: RecallConfig,
    pub zoom: ZoomConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the dashboard's static files.
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub api_base: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Webhook secret token used to answer URL validation challenges.
    pub secret_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3456,
            public_dir: PathBuf::from("public"),
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            api_base: "https://us-east-1.recall.ai".to_string(),
            api_key: None,
        }
    }
}

impl RecallConfig {
    pub fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }
}

impl ZoomConfig {
    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    pub fn client_secret(&self) -> Option<&str> {
        non_empty(&self.client_secret)
    }

    pub fn secret_token(&self) -> Option<&str> {
        non_empty(&self.secret_token)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Config {
    /// Loads the config file (creating a default one if missing), then
    /// applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            info!("Loaded config from {:?}", config_path);
            config
        } else {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            config
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides settings from environment-style lookups. Empty values are
    /// ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = get(env::PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid {} value: {}", env::PORT, port))?;
        }
        if let Some(key) = get(env::RECALL_API_KEY) {
            self.recall.api_key = Some(key);
        }
        if let Some(id) = get(env::ZOOM_CLIENT_ID) {
            self.zoom.client_id = Some(id);
        }
        if let Some(secret) = get(env::ZOOM_CLIENT_SECRET) {
            self.zoom.client_secret = Some(secret);
        }
        if let Some(token) = get(env::ZOOM_SECRET_TOKEN) {
            self.zoom.secret_token = Some(token);
        }
        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

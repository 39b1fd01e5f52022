use serde::Deserialize;
use std::path::{Path, PathBuf};
use supportdesk_agent::ModelConfig;
use supportdesk_core::{SupportError, SupportResult};
use supportdesk_session::SessionConfig;

/// Environment variable consulted when `model.api_key` is empty.
pub const API_KEY_ENV: &str = "SUPPORTDESK_API_KEY";

#[derive(Debug, Deserialize)]
pub struct SupportdeskConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Longest accepted query, in characters.
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_query_length: default_max_query_length(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_query_length() -> usize {
    10_000
}

impl SupportdeskConfig {
    pub fn from_toml(raw: &str) -> SupportResult<Self> {
        toml::from_str(raw).map_err(|e| SupportError::Config(e.to_string()))
    }

    pub async fn load(path: &Path) -> SupportResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SupportError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.session.expiration_window()?;
        config.fill_api_keys(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Fill empty API keys (primary and fallback models) from `lookup(API_KEY_ENV)`.
    pub fn fill_api_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) else {
            return;
        };
        if self.model.api_key.is_empty() {
            self.model.api_key = key.clone();
        }
        for model in &mut self.model.fallback_models {
            if model.api_key.is_empty() {
                model.api_key = key.clone();
            }
        }
    }
}

use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Upstream weather API. The key is expected via the environment
/// (`WEATHERVANE__SOURCE__API_KEY`), never committed to the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub default_city: String,
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

/// Forecast model hyperparameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Lag depth: how many prior days feed one feature row.
    pub lag_days: usize,
    pub n_trees: usize,
    pub max_depth: Option<u16>,
    /// Fraction of feature rows used for training; the rest is held out
    /// for validation metrics.
    pub train_ratio: f64,
    /// Seed shared by the train/test shuffle and the forest.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            lag_days: 7,
            n_trees: 100,
            max_depth: None,
            train_ratio: 0.8,
            seed: 42,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("WEATHERVANE__").split("__"));
        Ok(figment.extract()?)
    }
}

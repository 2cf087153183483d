//! Configuration for the chat gateway.

use std::env;

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use tokio::sync::Semaphore;

pub use config::ConfigError;

/// Environment variable holding the hosting-service concurrency limit.
pub const MAX_CONCURRENCY_ENV: &str = "HOSTING_MAX_CONCURRENCY";

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hosting: HostingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Maximum simultaneous calls to the hosting service.
    ///
    /// Read from `HOSTING_MAX_CONCURRENCY` rather than the layered sources
    /// because invalid values fall back to the default instead of failing.
    #[serde(skip, default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the hosting service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct HostingConfig {
    #[serde(default = "default_hosting_url")]
    pub base_url: String,
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosting_url(),
            chat_timeout_secs: default_chat_timeout(),
            batch_timeout_secs: default_batch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            hosting: HostingConfig::default(),
            logging: LoggingConfig::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_hosting_url() -> String {
    "http://127.0.0.1:8001".to_string()
}
fn default_chat_timeout() -> u64 {
    120
}
fn default_batch_timeout() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_concurrency() -> usize {
    8
}

/// Parse a concurrency limit, falling back to the default of 8 for anything
/// that is not a positive integer a semaphore can hold.
pub fn parse_max_concurrency(value: Option<&str>) -> usize {
    match value.map(|v| v.trim().parse::<usize>()) {
        Some(Ok(n)) if n > 0 && n <= Semaphore::MAX_PERMITS => n,
        Some(_) => {
            tracing::warn!(
                "Ignoring invalid {} value, using default of {}",
                MAX_CONCURRENCY_ENV,
                default_max_concurrency()
            );
            default_max_concurrency()
        }
        None => default_max_concurrency(),
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (GATEWAY__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    ///
    /// The concurrency limit always comes from `HOSTING_MAX_CONCURRENCY`.
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = loader.try_deserialize()?;
        config.max_concurrency = parse_max_concurrency(env::var(MAX_CONCURRENCY_ENV).ok().as_deref());
        Ok(config)
    }
}

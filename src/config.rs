use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

/// Application configuration, layered from `config.toml` (optional) and
/// `NONTON_*` environment variables over built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub gemini: GeminiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            upstream: UpstreamConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://nonton.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the primary content provider
    pub base_url: String,
    /// Base URL of the Consumet mirror API
    pub consumet_base_url: String,
    /// Per-call timeout in seconds
    pub request_timeout_secs: u64,
    /// Token bucket capacity for the primary provider
    pub rate_capacity: u32,
    /// Token bucket refill interval in milliseconds (one token per interval)
    pub rate_refill_ms: u64,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_refill_interval(&self) -> Duration {
        Duration::from_millis(self.rate_refill_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sankavollerei.com".to_string(),
            consumet_base_url: "https://api.consumet.org".to_string(),
            request_timeout_secs: 30,
            // 70 requests per minute, i.e. one token every ~857ms
            rate_capacity: 70,
            rate_refill_ms: 857,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; enrichment degrades to store/cache-only when empty
    pub api_key: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("NONTON").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

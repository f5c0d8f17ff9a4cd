//! Configuration management for the MCP server.
//!
//! Everything is read once at startup from environment variables (after an
//! optional `.env` file is loaded) and falls back to defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domains::dart::credentials::{API_KEY_NAME, mask_key};

/// Default upstream base URL.
pub const DEFAULT_DART_API_URL: &str = "https://opendart.fss.or.kr/api";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,

    /// Upstream API endpoint and timeouts.
    pub dart: DartConfig,

    /// Response cache sizing and policy.
    pub cache: CacheConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Process-wide DART API key. Per-call keys in `arguments.env` take precedence.
    pub dart_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "dart_api_key",
                &self.dart_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DartConfig {
    /// Base URL, without a trailing endpoint.
    pub base_url: String,

    /// Timeout for JSON calls, in seconds.
    pub timeout_secs: u64,

    /// Timeout for archive and document downloads, in seconds.
    pub document_timeout_secs: u64,
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DART_API_URL.to_string(),
            timeout_secs: 30,
            document_timeout_secs: 60,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub capacity: usize,

    /// Tools whose "no data" outcomes are cached. `all` enables every tool.
    pub cache_not_found: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            cache_not_found: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "dart-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
            dart: DartConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_non_empty(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(name) = env_non_empty("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = env_non_empty("MCP_LOG_LEVEL").or_else(|| env_non_empty("LOG_LEVEL"))
        {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        match env_non_empty(API_KEY_NAME) {
            Some(key) => {
                info!("{} loaded from environment ({})", API_KEY_NAME, mask_key(&key));
                config.credentials.dart_api_key = Some(key);
            }
            None => warn!(
                "{} not set - tool calls must pass env.{} in their arguments",
                API_KEY_NAME, API_KEY_NAME
            ),
        }

        if let Some(url) = env_non_empty("DART_API_URL") {
            config.dart.base_url = url;
        }
        if let Some(secs) = env_parsed("DART_TIMEOUT_SECS") {
            config.dart.timeout_secs = secs;
        }
        if let Some(secs) = env_parsed("DART_DOCUMENT_TIMEOUT_SECS") {
            config.dart.document_timeout_secs = secs;
        }

        if let Some(capacity) = env_parsed("DART_CACHE_CAPACITY") {
            config.cache.capacity = capacity;
        }
        if let Some(tools) = env_non_empty("DART_CACHE_NOT_FOUND") {
            config.cache.cache_not_found = tools
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }

        config
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = self.dart.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config(format!(
                "DART_API_URL must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.dart.timeout_secs == 0 || self.dart.document_timeout_secs == 0 {
            return Err(Error::config("DART timeouts must be at least one second"));
        }
        if self.cache.capacity == 0 {
            return Err(Error::config("DART_CACHE_CAPACITY must be at least 1"));
        }
        Ok(())
    }
}

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

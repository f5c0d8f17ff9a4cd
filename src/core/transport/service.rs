//! Transport service: builds the server and hands it to the configured transport.

use tracing::{info, warn};

use super::{TransportConfig, TransportResult};
use crate::core::{Config, McpServer};

#[cfg(feature = "stdio")]
use super::stdio::StdioTransport;

#[cfg(feature = "http")]
use super::http::HttpTransport;

/// Runs one MCP server over one transport.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Build the server from `config` and serve it until the transport closes.
    ///
    /// Configuration the server cannot run with is reported before any
    /// transport is opened.
    pub async fn start(self, config: Config) -> TransportResult<()> {
        let server = McpServer::new(config)?;
        self.run(server).await
    }

    /// Serve an existing server. Blocks until the transport is shut down.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let config = server.config();
        info!(
            "Starting {} v{} | transport={}, upstream={}, cache_capacity={}",
            server.name(),
            server.version(),
            self.config.description(),
            config.dart.base_url,
            config.cache.capacity
        );
        if config.credentials.dart_api_key.is_none() {
            warn!("No server-wide DART API key; every tool call must carry env.DART_API_KEY");
        }

        match self.config {
            #[cfg(feature = "stdio")]
            TransportConfig::Stdio => StdioTransport::run(server).await,
            #[cfg(feature = "http")]
            TransportConfig::Http(cfg) => HttpTransport::new(cfg).run(server).await,
        }
    }
}

#[cfg(all(test, feature = "stdio"))]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;

    #[tokio::test]
    async fn test_invalid_config_fails_before_serving() {
        let mut config = Config::default();
        config.cache.capacity = 0;

        let err = TransportService::new(TransportConfig::Stdio)
            .start(config)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Config(_)));
        assert!(err.to_string().contains("DART_CACHE_CAPACITY"));
    }
}

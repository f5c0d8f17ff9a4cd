//! MCP Server implementation and lifecycle management.
//!
//! The server owns the [`Dispatcher`] (and through it the response cache) for
//! the lifetime of the process. Every transport, including each HTTP request,
//! works on clones of the same server, so they all share one cache.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool,
//! and the ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::tools::{Dispatcher, build_tool_router};

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

/// Usage notes sent to clients on initialization.
pub const INSTRUCTIONS: &str = "Korean corporate disclosure data from DART (Data Analysis, Retrieval and Transfer System). \
Find a company with search_company_tool, or pass company_name directly to any company tool; \
when a name matches several companies the call fails with the candidates, so retry with corp_code. \
Disclosure lists return receipt numbers (rcept_no) for download_disclosure_document_tool. \
Each call may carry env.DART_API_KEY to use a caller-specific API key.";

/// The main MCP server handler.
///
/// Implements `ServerHandler` from rmcp; tool calls are routed to the
/// dispatcher by the tool router.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared dispatcher and cache.
    dispatcher: Arc<Dispatcher>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Create a server around an existing dispatcher.
    pub fn with_dispatcher(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        info!(
            "Server created | cache_capacity={}",
            dispatcher.cache().capacity()
        );
        Self {
            tool_router: build_tool_router::<Self>(dispatcher.clone()),
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    ///
    /// Returns the tool payload, or the error message for failures.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.dispatcher.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DartConfig;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.dart = DartConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..DartConfig::default()
        };
        config
    }

    #[test]
    fn test_server_lists_all_tools() {
        let server = McpServer::new(test_config()).unwrap();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 10);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[test]
    fn test_server_info_advertises_tools_only() {
        let server = McpServer::new(test_config()).unwrap();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert!(info.instructions.unwrap().contains("corp_code"));
    }

    #[test]
    fn test_clones_share_cache() {
        let server = McpServer::new(test_config()).unwrap();
        let clone = server.clone();
        assert!(Arc::ptr_eq(server.dispatcher(), clone.dispatcher()));
    }
}

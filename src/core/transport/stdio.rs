//! MCP over stdin/stdout, the default transport.
//!
//! Stdout carries protocol frames only; logs go to stderr.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

pub struct StdioTransport;

impl StdioTransport {
    /// Serve one client until it disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let tools = server.list_tools().len();
        let dispatcher = server.dispatcher().clone();

        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;
        info!("Ready on stdin/stdout | tools={}", tools);

        let reason = service
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!(
            "STDIO session ended | reason={:?}, cached_responses={}",
            reason,
            dispatcher.cache().len()
        );
        Ok(())
    }
}

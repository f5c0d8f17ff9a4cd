//! DART MCP Server Library
//!
//! Exposes the DART (Korean Financial Supervisory Service) corporate
//! disclosure API as MCP tools, with a shared TTL cache in front of the
//! upstream.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server and its transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **dart**: Upstream client, credentials, cache and result types
//!   - **tools**: The MCP tools and the dispatcher every call goes through
//!
//! # Example
//!
//! ```rust,no_run
//! use dart_mcp_server::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};

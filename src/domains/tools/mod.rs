//! Tools domain module.
//!
//! Tools are the operations MCP clients call. Each one validates its
//! parameters, resolves the company when needed, and fetches from the DART
//! API through the shared [`Dispatcher`] and its cache.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `dispatcher.rs` - Credentials, identity resolution and caching for every call
//! - `router.rs` - Dynamic ToolRouter builder for the MCP transports
//! - `registry.rs` - Tool list and HTTP dispatch
//! - `common.rs` - Parameter parsing, validation and result rendering
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with params, `run()`, `to_tool()`
//!    and `create_route()`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its route in `router.rs` and its name in `registry.rs`
//! 4. Add its `run()` arm in `Dispatcher::invoke`

pub mod cache_key;
pub mod common;
pub mod definitions;
pub mod dispatcher;
mod error;
mod registry;
pub mod router;

pub use dispatcher::{CachePolicy, Dispatcher};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;

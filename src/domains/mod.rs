//! Domains module containing business logic organized by bounded contexts.
//!
//! - `dart`: everything that talks to the upstream API
//! - `tools`: the MCP tool surface built on top of it

pub mod dart;
pub mod tools;

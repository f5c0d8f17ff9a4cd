//! DART Open API integration.
//!
//! - `credentials`: per-call API key resolution
//! - `cache`: bounded TTL cache shared by all tool calls
//! - `client`: HTTP client and response interpretation
//! - `outcome`: the uniform [`UpstreamResult`] shape
//! - `identity`: corp codes and name-to-code candidate selection
//! - `xml`: archive unpacking and XML parsing

pub mod cache;
pub mod client;
pub mod credentials;
pub mod identity;
pub mod outcome;
pub mod xml;

pub use cache::TtlCache;
pub use client::{DartClient, Method, ResponseKind, UpstreamRequest};
pub use credentials::{CredentialResolver, Credentials, KeySource};
pub use identity::{CompanyIdentity, Identifier, Selection};
pub use outcome::{DocumentFormat, OutcomeKind, Payload, UpstreamResult};

//! Tool-specific error types.

use thiserror::Error;

use crate::domains::dart::{CompanyIdentity, UpstreamResult};

/// Errors that stop a tool call before or instead of an upstream result.
///
/// Upstream failures are not errors here; they travel as [`UpstreamResult`]
/// values. The one exception is [`ToolError::LookupFailed`], which carries a
/// failed name search out of the resolution step.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No API key could be resolved.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A company name matched more than one plausible company.
    #[error("Company name '{query}' is ambiguous ({} candidates); pass corp_code instead", .candidates.len())]
    AmbiguousIdentity {
        query: String,
        candidates: Vec<CompanyIdentity>,
    },

    /// A company name matched nothing.
    #[error("No company found matching '{0}'")]
    CompanyNotFound(String),

    /// The company search itself failed.
    #[error("Company lookup failed: {0:?}")]
    LookupFailed(Box<UpstreamResult>),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the caller can fix the call by changing its arguments.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments(_)
                | Self::AmbiguousIdentity { .. }
                | Self::CompanyNotFound(_)
                | Self::NotFound(_)
        )
    }
}

//! Company search over the upstream corp code directory.
//!
//! The directory is a zip archive holding one XML file with every registered
//! company. The unpacked XML is cached on its own so that searches for
//! different names share one download.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domains::dart::xml::search_directory;
use crate::domains::dart::{
    CompanyIdentity, Credentials, Payload, ResponseKind, UpstreamRequest, UpstreamResult,
};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::dispatch_route;
use crate::domains::tools::dispatcher::{Dispatcher, Fetched};
use crate::domains::tools::error::ToolError;

/// Parameters for company search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCompanyParams {
    /// Company name or a part of it.
    #[schemars(description = "Company name or part of it (case-insensitive substring match)")]
    pub company_name: String,
}

#[derive(Debug, Clone)]
pub struct SearchCompanyTool;

impl SearchCompanyTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_company_tool";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search companies registered with DART by name. Returns every company whose name contains the query (case-insensitive) with its 8-digit corp_code, stock_code (blank when unlisted) and last modification date. Use the corp_code with the other tools.";

    pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Cache namespace of the unpacked directory.
    pub const DIRECTORY_KEY: &'static str = "corp_directory";

    const ENDPOINT: &'static str = "corpCode.xml";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: SearchCompanyParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let name = params.company_name.trim();
        if name.is_empty() {
            return Err(ToolError::invalid_arguments("company_name must not be empty"));
        }
        Ok(Self::search(dispatcher, name, credentials).await)
    }

    /// Cached search; also used for name-to-code resolution.
    pub async fn search(
        dispatcher: &Dispatcher,
        name: &str,
        credentials: &Credentials,
    ) -> UpstreamResult {
        let query = name.trim().to_lowercase();
        let key = CacheKey::builder(Self::NAME)
            .with("company_name", &query)
            .build();

        dispatcher
            .cached(&key, Self::TTL, async {
                let directory = Self::directory(dispatcher, credentials).await;
                Fetched::new(directory, |outcome| filter_directory(outcome, &query))
            })
            .await
    }

    async fn directory(dispatcher: &Dispatcher, credentials: &Credentials) -> UpstreamResult {
        let key = CacheKey::builder(Self::DIRECTORY_KEY).build();
        let request = UpstreamRequest::get(Self::ENDPOINT).kind(ResponseKind::Archive);
        dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| outcome)
            .await
    }

    /// Companies listed in a successful search result.
    pub fn companies(outcome: &UpstreamResult) -> Vec<CompanyIdentity> {
        outcome
            .success_json()
            .and_then(|body| body.get("companies"))
            .and_then(|list| serde_json::from_value(list.clone()).ok())
            .unwrap_or_default()
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SearchCompanyParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(dispatcher: Arc<Dispatcher>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        dispatch_route(Self::to_tool(), dispatcher)
    }
}

fn filter_directory(outcome: UpstreamResult, query: &str) -> UpstreamResult {
    match outcome {
        UpstreamResult::Success(Payload::Binary { bytes, .. }) => {
            match search_directory(&bytes, query) {
                Ok(companies) => {
                    debug!(
                        "Company search | query={:?}, matches={}",
                        query,
                        companies.len()
                    );
                    UpstreamResult::json(json!({
                        "total": companies.len(),
                        "companies": companies,
                    }))
                }
                Err(e) => UpstreamResult::parse_failure(e.to_string(), bytes),
            }
        }
        UpstreamResult::Success(_) => {
            UpstreamResult::transport("unexpected payload for the corp code directory")
        }
        other => other,
    }
}

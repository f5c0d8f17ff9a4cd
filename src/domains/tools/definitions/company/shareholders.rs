//! Major shareholding reports (대량보유 상황보고).

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::domains::dart::{Credentials, UpstreamRequest, UpstreamResult};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::{
    dispatch_route, resolve_business_year, resolve_report_code, shape_list, string_or_number,
};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ShareholdersParams {
    #[schemars(description = "8-digit DART corp code (takes precedence over company_name)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub corp_code: Option<String>,

    #[schemars(description = "Company name, resolved to a corp code when corp_code is absent")]
    #[serde(default)]
    pub company_name: Option<String>,

    #[schemars(description = "Business year YYYY (default: last year)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub bsns_year: Option<String>,

    #[schemars(
        description = "Report code: 11011 annual (default), 11012 half-year, 11013 Q1, 11014 Q3"
    )]
    #[serde(default, deserialize_with = "string_or_number")]
    pub reprt_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShareholdersTool;

impl ShareholdersTool {
    pub const NAME: &'static str = "get_shareholders_tool";

    pub const DESCRIPTION: &'static str = "Get major shareholding reports for a company: reporters holding 5% or more, their share counts, ratios and changes. Identify the company by corp_code or company_name.";

    pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    const ENDPOINT: &'static str = "majorstock.json";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: ShareholdersParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let bsns_year = resolve_business_year(params.bsns_year.as_deref())?;
        let reprt_code = resolve_report_code(params.reprt_code.as_deref())?;
        let corp_code = dispatcher
            .resolve_corp_code(
                params.corp_code.as_deref(),
                params.company_name.as_deref(),
                credentials,
            )
            .await?;

        let key = CacheKey::builder(Self::NAME)
            .with("corp_code", &corp_code)
            .with("bsns_year", &bsns_year)
            .with("reprt_code", &reprt_code)
            .build();
        let request = UpstreamRequest::get(Self::ENDPOINT)
            .param("corp_code", &corp_code)
            .param("bsns_year", &bsns_year)
            .param("reprt_code", &reprt_code);
        let header = json!({
            "corp_code": corp_code,
            "bsns_year": bsns_year,
            "reprt_code": reprt_code,
        });

        Ok(dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| {
                shape_list(outcome, header, "shareholders")
            })
            .await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShareholdersParams>(),
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

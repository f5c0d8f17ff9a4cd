//! Major event reports (주요사항보고서).

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
    dispatch_route, resolve_date_range, shape_list, string_or_number,
};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MajorReportParams {
    #[schemars(description = "8-digit DART corp code (takes precedence over company_name)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub corp_code: Option<String>,

    #[schemars(description = "Company name, resolved to a corp code when corp_code is absent")]
    #[serde(default)]
    pub company_name: Option<String>,

    #[schemars(description = "Start date YYYYMMDD (default: 30 days ago)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub bgn_de: Option<String>,

    #[schemars(description = "End date YYYYMMDD (default: today)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub end_de: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MajorReportTool;

impl MajorReportTool {
    pub const NAME: &'static str = "get_major_report_tool";

    pub const DESCRIPTION: &'static str = "List major event reports of a company within a date range (default: the last 30 days): capital increases or reductions, mergers, splits, bond issues, business transfers and similar events.";

    pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    const ENDPOINT: &'static str = "majorReport.json";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: MajorReportParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let (bgn_de, end_de) =
            resolve_date_range(params.bgn_de.as_deref(), params.end_de.as_deref())?;
        let corp_code = dispatcher
            .resolve_corp_code(
                params.corp_code.as_deref(),
                params.company_name.as_deref(),
                credentials,
            )
            .await?;

        let key = CacheKey::builder(Self::NAME)
            .with("corp_code", &corp_code)
            .with("bgn_de", &bgn_de)
            .with("end_de", &end_de)
            .build();
        let request = UpstreamRequest::get(Self::ENDPOINT)
            .param("corp_code", &corp_code)
            .param("bgn_de", &bgn_de)
            .param("end_de", &end_de);
        let header = json!({
            "corp_code": corp_code,
            "bgn_de": bgn_de,
            "end_de": end_de,
        });

        Ok(dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| {
                shape_list(outcome, header, "reports")
            })
            .await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<MajorReportParams>(),
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

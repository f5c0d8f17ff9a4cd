//! Multi-year financial trend, assembled from per-year statements.

use std::sync::Arc;

use chrono::Datelike;
use futures::future::join_all;
use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::statement::{FinancialStatementTool, financial_data};
use crate::domains::dart::{Credentials, UpstreamResult};
use crate::domains::tools::common::{
    DEFAULT_REPORT_CODE, check_range, dispatch_route, lenient_u32, string_or_number, today,
};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

const DEFAULT_YEARS: u32 = 5;
const MAX_YEARS: u32 = 10;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FinancialTrendParams {
    #[schemars(description = "8-digit DART corp code (takes precedence over company_name)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub corp_code: Option<String>,

    #[schemars(description = "Company name, resolved to a corp code when corp_code is absent")]
    #[serde(default)]
    pub company_name: Option<String>,

    #[schemars(description = "Number of past years to analyze, 1-10 (default: 5)")]
    #[serde(default, deserialize_with = "lenient_u32")]
    pub years: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FinancialTrendTool;

impl FinancialTrendTool {
    pub const NAME: &'static str = "analyze_financial_trend_tool";

    pub const DESCRIPTION: &'static str = "Collect the annual key financial accounts of a company over the last N years (default 5) for trend analysis. Years without a filed annual report are skipped; years_analyzed tells how many were found.";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: FinancialTrendParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let years = check_range("years", params.years.unwrap_or(DEFAULT_YEARS), 1, MAX_YEARS)?;
        let corp_code = dispatcher
            .resolve_corp_code(
                params.corp_code.as_deref(),
                params.company_name.as_deref(),
                credentials,
            )
            .await?;

        let current_year = today().year();
        let requested: Vec<String> = (0..years as i32)
            .map(|i| (current_year - 1 - i).to_string())
            .collect();

        let outcomes = join_all(requested.iter().map(|year| {
            FinancialStatementTool::fetch_year(
                dispatcher,
                &corp_code,
                year,
                DEFAULT_REPORT_CODE,
                credentials,
            )
        }))
        .await;

        let mut trend = Vec::new();
        let mut last_error = None;
        for (year, outcome) in requested.iter().zip(outcomes) {
            if let Some(data) = financial_data(&outcome) {
                trend.push(json!({ "year": year, "data": data }));
            } else if outcome.is_failure() {
                last_error = Some(outcome);
            } else {
                debug!("No financial data | corp_code={}, year={}", corp_code, year);
            }
        }

        if trend.is_empty() {
            if let Some(error) = last_error {
                return Ok(error);
            }
        }

        let summary = format!(
            "Collected annual financial data for {} of the last {} years. Compare the accounts across years to analyze the trend.",
            trend.len(),
            years
        );
        Ok(UpstreamResult::json(json!({
            "corp_code": corp_code,
            "years_analyzed": trend.len(),
            "financial_trend": trend,
            "summary": summary,
        })))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<FinancialTrendParams>(),
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

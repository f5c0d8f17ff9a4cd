//! Single-company key accounts (단일회사 주요계정), consolidated statements.
//!
//! The upstream often has nothing for the most recent year until the annual
//! report is filed, so a lookup falls back through the three latest years.
//! Each year is cached on its own and the trend tool reads the same entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::domains::dart::outcome::envelope_list;
use crate::domains::dart::{Credentials, UpstreamRequest, UpstreamResult};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::{
    dispatch_route, resolve_business_year, resolve_report_code, string_or_number, today,
};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

/// Consolidated financial statements.
const FS_DIV: &str = "CFS";

/// Most recent years tried after the requested one.
const FALLBACK_YEARS: i32 = 3;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FinancialStatementParams {
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
pub struct FinancialStatementTool;

impl FinancialStatementTool {
    pub const NAME: &'static str = "get_financial_statement_tool";

    pub const DESCRIPTION: &'static str = "Get the key consolidated financial statement accounts of a company (assets, liabilities, equity, revenue, operating and net income) for a business year. If the requested year has no data, the three most recent years are tried in turn and the first one with data is returned; bsns_year in the result tells which year was used.";

    pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    const ENDPOINT: &'static str = "fnlttSinglAcnt.json";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: FinancialStatementParams,
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

        let mut last_error = None;
        for year in years_to_try(&bsns_year, today().year()) {
            let outcome =
                Self::fetch_year(dispatcher, &corp_code, &year, &reprt_code, credentials).await;
            if has_data(&outcome) {
                return Ok(outcome);
            }
            if outcome.is_failure() {
                last_error = Some(outcome);
            } else {
                debug!(
                    "No financial data, trying an earlier year | corp_code={}, year={}",
                    corp_code, year
                );
            }
        }

        Ok(last_error.unwrap_or(UpstreamResult::NotFound))
    }

    /// Statement for exactly one year, without fallback.
    ///
    /// A success carries `{corp_code, bsns_year, reprt_code, financial_data}`;
    /// `financial_data` may be empty.
    pub async fn fetch_year(
        dispatcher: &Dispatcher,
        corp_code: &str,
        bsns_year: &str,
        reprt_code: &str,
        credentials: &Credentials,
    ) -> UpstreamResult {
        let key = CacheKey::builder(Self::NAME)
            .with("corp_code", corp_code)
            .with("bsns_year", bsns_year)
            .with("reprt_code", reprt_code)
            .with("fs_div", FS_DIV)
            .build();
        let request = UpstreamRequest::get(Self::ENDPOINT)
            .param("corp_code", corp_code)
            .param("bsns_year", bsns_year)
            .param("reprt_code", reprt_code)
            .param("fs_div", FS_DIV);

        dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| {
                outcome.map_json(|body| {
                    json!({
                        "corp_code": corp_code,
                        "bsns_year": bsns_year,
                        "reprt_code": reprt_code,
                        "financial_data": envelope_list(&body),
                    })
                })
            })
            .await
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<FinancialStatementParams>(),
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

/// The requested year first, then the latest complete years, without repeats.
fn years_to_try(requested: &str, current_year: i32) -> Vec<String> {
    let mut years = vec![requested.to_string()];
    for offset in 1..=FALLBACK_YEARS {
        let year = (current_year - offset).to_string();
        if !years.contains(&year) {
            years.push(year);
        }
    }
    years
}

/// The non-empty account list of a per-year result.
pub fn financial_data(outcome: &UpstreamResult) -> Option<&Value> {
    outcome
        .success_json()
        .and_then(|body| body.get("financial_data"))
        .filter(|data| data.as_array().is_some_and(|list| !list.is_empty()))
}

pub fn has_data(outcome: &UpstreamResult) -> bool {
    financial_data(outcome).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::common::default_business_year;
    use crate::domains::tools::dispatcher::tests::{dispatcher, ok_body};
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_data() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": "013", "message": "조회된 데이타가 없습니다."}))
    }

    #[test]
    fn test_years_to_try() {
        assert_eq!(years_to_try("2023", 2024), vec!["2023", "2022", "2021"]);
        assert_eq!(
            years_to_try("2019", 2024),
            vec!["2019", "2023", "2022", "2021"]
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_earlier_year() {
        let server = MockServer::start().await;
        let previous = (today().year() - 2).to_string();
        Mock::given(path("/fnlttSinglAcnt.json"))
            .and(query_param("bsns_year", default_business_year().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({"list": []}))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/fnlttSinglAcnt.json"))
            .and(query_param("bsns_year", previous.as_str()))
            .and(query_param("fs_div", "CFS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(
                json!({"list": [{"account_nm": "자산총계", "thstrm_amount": "100"}]}),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                FinancialStatementTool::NAME,
                json!({"corp_code": "00126380"}),
            )
            .await
            .unwrap();
        let body = outcome.success_json().unwrap();
        assert_eq!(body["bsns_year"], previous);
        assert_eq!(body["financial_data"][0]["account_nm"], "자산총계");
    }

    #[tokio::test]
    async fn test_no_year_with_data_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/fnlttSinglAcnt.json"))
            .respond_with(no_data())
            .expect(3)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                FinancialStatementTool::NAME,
                json!({"corp_code": "00126380"}),
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpstreamResult::NotFound);
    }

    #[tokio::test]
    async fn test_last_error_reported_when_no_data() {
        let server = MockServer::start().await;
        let oldest = (today().year() - 3).to_string();
        Mock::given(path("/fnlttSinglAcnt.json"))
            .and(query_param("bsns_year", oldest.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "020", "message": "요청 제한을 초과하였습니다."})),
            )
            .mount(&server)
            .await;
        Mock::given(path("/fnlttSinglAcnt.json"))
            .respond_with(no_data())
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                FinancialStatementTool::NAME,
                json!({"corp_code": "00126380"}),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, UpstreamResult::UpstreamError { ref code, .. } if code == "020"));
    }

    #[test]
    fn test_has_data() {
        assert!(has_data(&UpstreamResult::json(
            json!({"financial_data": [{"a": 1}]})
        )));
        assert!(!has_data(&UpstreamResult::json(json!({"financial_data": []}))));
        assert!(!has_data(&UpstreamResult::NotFound));
    }
}

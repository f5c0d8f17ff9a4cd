//! Disclosure search (공시검색) for one company.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domains::dart::outcome::envelope_list;
use crate::domains::dart::{Credentials, Payload, UpstreamRequest, UpstreamResult};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::{
    check_range, dispatch_route, lenient_u32, resolve_date_range, string_or_number,
};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

const MAX_PAGE_COUNT: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PublicDisclosureParams {
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

    #[schemars(description = "Page number, starting at 1 (default: 1)")]
    #[serde(default, deserialize_with = "lenient_u32")]
    pub page_no: Option<u32>,

    #[schemars(description = "Results per page, 1-100 (default: 10)")]
    #[serde(default, deserialize_with = "lenient_u32")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PublicDisclosureTool;

impl PublicDisclosureTool {
    pub const NAME: &'static str = "get_public_disclosure_tool";

    pub const DESCRIPTION: &'static str = "List the public disclosures filed by a company within a date range (default: the last 30 days), newest first, with receipt numbers usable by download_disclosure_document_tool. Supports paging via page_no and page_count.";

    pub const TTL: Duration = Duration::from_secs(60 * 60);

    const ENDPOINT: &'static str = "list.json";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: PublicDisclosureParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let (bgn_de, end_de) =
            resolve_date_range(params.bgn_de.as_deref(), params.end_de.as_deref())?;
        let page_no = check_range("page_no", params.page_no.unwrap_or(1), 1, u32::MAX)?;
        let page_count = check_range(
            "page_count",
            params.page_count.unwrap_or(10),
            1,
            MAX_PAGE_COUNT,
        )?;
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
            .with("page_no", page_no)
            .with("page_count", page_count)
            .build();
        let request = UpstreamRequest::get(Self::ENDPOINT)
            .param("corp_code", &corp_code)
            .param("bgn_de", &bgn_de)
            .param("end_de", &end_de)
            .param("page_no", page_no.to_string())
            .param("page_count", page_count.to_string());

        Ok(dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| {
                let (total_count, disclosures) = match &outcome {
                    UpstreamResult::Success(Payload::Json(body)) => {
                        let list = envelope_list(body);
                        (total_count(body, &list), list)
                    }
                    UpstreamResult::NotFound => (0, Value::Array(Vec::new())),
                    _ => return outcome,
                };
                UpstreamResult::json(json!({
                    "corp_code": corp_code,
                    "total_count": total_count,
                    "page_no": page_no,
                    "page_count": page_count,
                    "disclosures": disclosures,
                }))
            })
            .await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<PublicDisclosureParams>(),
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

/// Total across all pages; the upstream sends it as a number or a string.
fn total_count(body: &Value, list: &Value) -> u64 {
    let page_len = list.as_array().map_or(0, Vec::len) as u64;
    match body.get("total_count") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(page_len),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(page_len),
        _ => page_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::dispatcher::tests::{dispatcher, ok_body};
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_paging_parameters_forwarded() {
        let server = MockServer::start().await;
        Mock::given(path("/list.json"))
            .and(query_param("bgn_de", "20240101"))
            .and(query_param("end_de", "20240331"))
            .and(query_param("page_no", "2"))
            .and(query_param("page_count", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({
                "total_count": 120,
                "list": [{"rcept_no": "20240315000123", "report_nm": "사업보고서"}],
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                PublicDisclosureTool::NAME,
                json!({
                    "corp_code": "00126380",
                    "bgn_de": 20240101,
                    "end_de": "20240331",
                    "page_no": 2,
                    "page_count": 100,
                }),
            )
            .await
            .unwrap();
        let body = outcome.success_json().unwrap();
        assert_eq!(body["total_count"], 120);
        assert_eq!(body["page_no"], 2);
        assert_eq!(body["disclosures"][0]["report_nm"], "사업보고서");
    }

    #[tokio::test]
    async fn test_invalid_paging_rejected() {
        let server = MockServer::start().await;
        let dispatcher = dispatcher(&server);
        for args in [
            json!({"corp_code": "00126380", "page_count": 101}),
            json!({"corp_code": "00126380", "page_count": 0}),
            json!({"corp_code": "00126380", "page_no": 0}),
            json!({"corp_code": "00126380", "bgn_de": "2024-01-01"}),
        ] {
            let err = dispatcher
                .invoke(PublicDisclosureTool::NAME, args)
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }
    }

    #[test]
    fn test_total_count_fallbacks() {
        let list = json!([1, 2, 3]);
        assert_eq!(total_count(&json!({"total_count": "42"}), &list), 42);
        assert_eq!(total_count(&json!({"total_count": 7}), &list), 7);
        assert_eq!(total_count(&json!({}), &list), 3);
    }
}

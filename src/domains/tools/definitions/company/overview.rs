//! Company overview (기업개황).

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::domains::dart::{Credentials, UpstreamRequest, UpstreamResult};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::{dispatch_route, string_or_number, strip_envelope};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CompanyOverviewParams {
    #[schemars(description = "8-digit DART corp code (takes precedence over company_name)")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub corp_code: Option<String>,

    #[schemars(description = "Company name, resolved to a corp code when corp_code is absent")]
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompanyOverviewTool;

impl CompanyOverviewTool {
    pub const NAME: &'static str = "get_company_overview_tool";

    pub const DESCRIPTION: &'static str = "Get the company overview from DART: official and English names, CEO, listing market, stock code, business registration number, address, homepage, industry code, establishment date and fiscal month. Identify the company by corp_code or company_name.";

    pub const TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    const ENDPOINT: &'static str = "company.json";

    pub async fn run(
        dispatcher: &Dispatcher,
        params: CompanyOverviewParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let corp_code = dispatcher
            .resolve_corp_code(
                params.corp_code.as_deref(),
                params.company_name.as_deref(),
                credentials,
            )
            .await?;

        let key = CacheKey::builder(Self::NAME)
            .with("corp_code", &corp_code)
            .build();
        let request = UpstreamRequest::get(Self::ENDPOINT).param("corp_code", &corp_code);

        Ok(dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| {
                outcome.map_json(|body| {
                    json!({
                        "corp_code": corp_code,
                        "company_info": strip_envelope(body),
                    })
                })
            })
            .await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CompanyOverviewParams>(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::dispatcher::tests::{dispatcher, ok_body};
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_overview_strips_envelope() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .and(query_param("corp_code", "00126380"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(
                json!({"corp_name": "삼성전자(주)", "stock_code": "005930"}),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(CompanyOverviewTool::NAME, json!({"corp_code": 126380}))
            .await
            .unwrap();
        let body = outcome.success_json().unwrap();
        assert_eq!(body["corp_code"], "00126380");
        assert_eq!(body["company_info"]["stock_code"], "005930");
        assert!(body["company_info"].get("status").is_none());
    }

    #[tokio::test]
    async fn test_code_wins_over_name() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        // No directory is mounted, so a name lookup would fail.
        let outcome = dispatcher(&server)
            .invoke(
                CompanyOverviewTool::NAME,
                json!({"corp_code": "00126380", "company_name": "Whatever"}),
            )
            .await
            .unwrap();
        assert!(outcome.is_success());
    }
}

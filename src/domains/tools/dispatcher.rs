//! Tool dispatcher: credentials, identity resolution and the response cache.
//!
//! Every tool call, whatever the transport, goes through
//! [`Dispatcher::invoke`]. The dispatcher owns the single cache instance for
//! the lifetime of the process.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::cache_key::CacheKey;
use super::common::parse_params;
use super::definitions::{
    CompanyOverviewTool, DisclosureDocumentTool, ExecutivesTool, FinancialStatementTool,
    FinancialTrendTool, HealthTool, MajorReportTool, PublicDisclosureTool, SearchCompanyTool,
    ShareholdersTool,
};
use super::error::ToolError;
use super::registry::ToolRegistry;
use crate::core::config::{CacheConfig, Config};
use crate::domains::dart::credentials::{API_KEY_NAME, strip_credentials};
use crate::domains::dart::identity::select_candidate;
use crate::domains::dart::{
    CredentialResolver, Credentials, DartClient, Identifier, OutcomeKind, Selection, TtlCache,
    UpstreamRequest, UpstreamResult,
};

/// Which tools cache "no data" outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotFoundCaching {
    #[default]
    Never,
    Always,
    Tools(HashSet<String>),
}

/// Decides what is written to the cache and for how long.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    not_found: NotFoundCaching,
    ttl_overrides: HashMap<String, Duration>,
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        let not_found = if config
            .cache_not_found
            .iter()
            .any(|t| t.eq_ignore_ascii_case("all"))
        {
            NotFoundCaching::Always
        } else if config.cache_not_found.is_empty() {
            NotFoundCaching::Never
        } else {
            NotFoundCaching::Tools(config.cache_not_found.iter().cloned().collect())
        };
        Self {
            not_found,
            ttl_overrides: HashMap::new(),
        }
    }

    /// Cache "no data" outcomes for `tool`.
    pub fn cache_not_found(mut self, tool: &str) -> Self {
        match &mut self.not_found {
            NotFoundCaching::Always => {}
            NotFoundCaching::Tools(tools) => {
                tools.insert(tool.to_string());
            }
            NotFoundCaching::Never => {
                self.not_found = NotFoundCaching::Tools(HashSet::from([tool.to_string()]));
            }
        }
        self
    }

    /// Replace the default TTL of `tool`.
    pub fn with_ttl(mut self, tool: &str, ttl: Duration) -> Self {
        self.ttl_overrides.insert(tool.to_string(), ttl);
        self
    }

    pub fn ttl_for(&self, tool: &str, default: Duration) -> Duration {
        self.ttl_overrides.get(tool).copied().unwrap_or(default)
    }

    pub fn caches_not_found(&self, tool: &str) -> bool {
        match &self.not_found {
            NotFoundCaching::Never => false,
            NotFoundCaching::Always => true,
            NotFoundCaching::Tools(tools) => tools.contains(tool),
        }
    }

    /// Failures are never stored. "No data" is stored only when enabled for the
    /// tool, even if the tool reshaped it into an empty success.
    pub fn should_store(&self, tool: &str, source: OutcomeKind, result: &UpstreamResult) -> bool {
        if result.is_failure() {
            return false;
        }
        match source {
            OutcomeKind::Success => true,
            OutcomeKind::NotFound => self.caches_not_found(tool),
            OutcomeKind::UpstreamError | OutcomeKind::TransportError => false,
        }
    }
}

/// A freshly fetched result together with the kind of the raw upstream outcome.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub source: OutcomeKind,
    pub result: UpstreamResult,
}

impl Fetched {
    pub fn new(raw: UpstreamResult, reshape: impl FnOnce(UpstreamResult) -> UpstreamResult) -> Self {
        Self {
            source: raw.kind(),
            result: reshape(raw),
        }
    }
}

/// Routes tool calls to their implementation.
pub struct Dispatcher {
    client: DartClient,
    cache: TtlCache<UpstreamResult>,
    resolver: CredentialResolver,
    policy: CachePolicy,
}

impl Dispatcher {
    pub fn new(
        client: DartClient,
        resolver: CredentialResolver,
        cache_capacity: usize,
        policy: CachePolicy,
    ) -> Self {
        Self {
            client,
            cache: TtlCache::new(cache_capacity),
            resolver,
            policy,
        }
    }

    pub fn from_config(config: &Config) -> crate::core::Result<Self> {
        config.validate()?;
        let client = DartClient::new(&config.dart)?;
        let resolver = CredentialResolver::new(config.credentials.dart_api_key.clone());
        info!(
            "Dispatcher ready | upstream={}, cache_capacity={}, configured_key={}",
            client.base_url(),
            config.cache.capacity,
            resolver.has_configured_key()
        );
        Ok(Self::new(
            client,
            resolver,
            config.cache.capacity,
            CachePolicy::from_config(&config.cache),
        ))
    }

    pub fn cache(&self) -> &TtlCache<UpstreamResult> {
        &self.cache
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Run `tool_name` with `arguments`.
    ///
    /// Argument errors, a missing key, and identity failures are `Err`.
    /// Everything the upstream says, including failures, is `Ok`.
    #[instrument(skip(self, arguments), fields(tool = %tool_name))]
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<UpstreamResult, ToolError> {
        if !ToolRegistry::is_known(tool_name) {
            warn!("Unknown tool requested: {}", tool_name);
            return Err(ToolError::not_found(tool_name));
        }

        if tool_name == HealthTool::NAME {
            return Ok(HealthTool::run(self, &arguments));
        }

        let credentials = self.resolver.resolve(&arguments);
        if !credentials.is_present() {
            return Err(ToolError::configuration(format!(
                "{} is not configured; set it in the server environment or pass env.{} in the arguments",
                API_KEY_NAME, API_KEY_NAME
            )));
        }

        let arguments = strip_credentials(arguments);
        debug!("Tool arguments | {}", arguments);

        let result = match tool_name {
            SearchCompanyTool::NAME => {
                SearchCompanyTool::run(self, parse_params(arguments)?, &credentials).await
            }
            CompanyOverviewTool::NAME => {
                CompanyOverviewTool::run(self, parse_params(arguments)?, &credentials).await
            }
            FinancialStatementTool::NAME => {
                FinancialStatementTool::run(self, parse_params(arguments)?, &credentials).await
            }
            FinancialTrendTool::NAME => {
                FinancialTrendTool::run(self, parse_params(arguments)?, &credentials).await
            }
            PublicDisclosureTool::NAME => {
                PublicDisclosureTool::run(self, parse_params(arguments)?, &credentials).await
            }
            MajorReportTool::NAME => {
                MajorReportTool::run(self, parse_params(arguments)?, &credentials).await
            }
            DisclosureDocumentTool::NAME => {
                DisclosureDocumentTool::run(self, parse_params(arguments)?, &credentials).await
            }
            ExecutivesTool::NAME => {
                ExecutivesTool::run(self, parse_params(arguments)?, &credentials).await
            }
            ShareholdersTool::NAME => {
                ShareholdersTool::run(self, parse_params(arguments)?, &credentials).await
            }
            other => Err(ToolError::not_found(other)),
        };

        match result {
            Err(ToolError::LookupFailed(outcome)) => Ok(*outcome),
            other => other,
        }
    }

    /// Serve `key` from the cache, or await `fetch` and store its result when
    /// the policy allows.
    ///
    /// Nothing is written if the returned future is dropped before `fetch` completes.
    pub async fn cached<Fut>(&self, key: &CacheKey, ttl: Duration, fetch: Fut) -> UpstreamResult
    where
        Fut: Future<Output = Fetched>,
    {
        if let Some(hit) = self.cache.get(key.as_str()) {
            debug!("Cache hit | key={}", key);
            return hit;
        }
        debug!("Cache miss | key={}", key);

        let Fetched { source, result } = fetch.await;
        if self.policy.should_store(key.tool(), source, &result) {
            let ttl = self.policy.ttl_for(key.tool(), ttl);
            self.cache.put(key.as_str(), result.clone(), ttl);
        }
        result
    }

    /// One upstream request behind the cache, with `reshape` applied before storing.
    pub async fn fetch(
        &self,
        key: &CacheKey,
        ttl: Duration,
        credentials: &Credentials,
        request: UpstreamRequest,
        reshape: impl FnOnce(UpstreamResult) -> UpstreamResult,
    ) -> UpstreamResult {
        self.cached(key, ttl, async {
            Fetched::new(self.client.call(&request, credentials).await, reshape)
        })
        .await
    }

    /// Resolve the identity parameters of a tool call into a corp code.
    pub async fn resolve_corp_code(
        &self,
        corp_code: Option<&str>,
        company_name: Option<&str>,
        credentials: &Credentials,
    ) -> Result<String, ToolError> {
        let identifier = Identifier::from_parts(corp_code, company_name).ok_or_else(|| {
            ToolError::invalid_arguments("either corp_code or company_name is required")
        })?;
        self.resolve_company(&identifier, credentials).await
    }

    /// Turn an identifier into exactly one corp code, searching by name if needed.
    pub async fn resolve_company(
        &self,
        identifier: &Identifier,
        credentials: &Credentials,
    ) -> Result<String, ToolError> {
        let name = match identifier {
            Identifier::ByCode(code) => return Ok(code.clone()),
            Identifier::ByName(name) => name,
        };

        let outcome = SearchCompanyTool::search(self, name, credentials).await;
        let candidates = match &outcome {
            UpstreamResult::NotFound => Vec::new(),
            UpstreamResult::Success(_) => SearchCompanyTool::companies(&outcome),
            _ => return Err(ToolError::LookupFailed(Box::new(outcome))),
        };

        match select_candidate(name, &candidates) {
            Selection::Unique(company) => {
                debug!(
                    "Resolved company name | name={}, corp_code={}",
                    name, company.corp_code
                );
                Ok(company.corp_code)
            }
            Selection::NoMatch => Err(ToolError::CompanyNotFound(name.clone())),
            Selection::Ambiguous(candidates) => Err(ToolError::AmbiguousIdentity {
                query: name.clone(),
                candidates,
            }),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("client", &self.client)
            .field("cache_entries", &self.cache.len())
            .field("resolver", &self.resolver)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::config::DartConfig;
    use crate::domains::dart::xml::tests::{directory_xml, zip_with};
    use crate::domains::tools::common::{format_date, render, to_rest, today};
    use chrono::Duration as DateSpan;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) const TEST_KEY: &str = "env-key-0000000000";

    pub(crate) fn dispatcher_with(
        server: &MockServer,
        configured_key: Option<&str>,
        policy: CachePolicy,
    ) -> Dispatcher {
        let client = DartClient::new(&DartConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            document_timeout_secs: 5,
        })
        .unwrap();
        Dispatcher::new(
            client,
            CredentialResolver::new(configured_key.map(str::to_string)),
            100,
            policy,
        )
    }

    pub(crate) fn dispatcher(server: &MockServer) -> Dispatcher {
        dispatcher_with(server, Some(TEST_KEY), CachePolicy::default())
    }

    pub(crate) fn ok_body(extra: Value) -> Value {
        let mut body = json!({"status": "000", "message": "정상"});
        if let (Some(target), Some(source)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in source {
                target.insert(k.clone(), v.clone());
            }
        }
        body
    }

    pub(crate) async fn mount_directory(server: &MockServer, companies: &[(&str, &str, &str)]) {
        let archive = zip_with("CORPCODE.xml", directory_xml(companies).as_bytes());
        Mock::given(path("/corpCode.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_explicit_defaults_share_cache_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body(json!({"total_count": 1, "list": [{"rcept_no": "1"}]}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        let implicit = dispatcher
            .invoke("get_public_disclosure_tool", json!({"corp_code": "126380"}))
            .await
            .unwrap();
        let explicit = dispatcher
            .invoke(
                "get_public_disclosure_tool",
                json!({
                    "corp_code": "00126380",
                    "bgn_de": format_date(today() - DateSpan::days(30)),
                    "end_de": format_date(today()),
                    "page_no": 1,
                    "page_count": 10,
                }),
            )
            .await
            .unwrap();
        assert_eq!(implicit, explicit);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_one_fresh_call() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ok_body(json!({"corp_name": "삼성전자"}))),
            )
            .expect(2)
            .mount(&server)
            .await;

        let policy =
            CachePolicy::default().with_ttl("get_company_overview_tool", Duration::from_millis(200));
        let dispatcher = dispatcher_with(&server, Some(TEST_KEY), policy);
        let args = json!({"corp_code": "00126380"});

        dispatcher
            .invoke("get_company_overview_tool", args.clone())
            .await
            .unwrap();
        dispatcher
            .invoke("get_company_overview_tool", args.clone())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let fresh = dispatcher
            .invoke("get_company_overview_tool", args)
            .await
            .unwrap();
        assert!(fresh.is_success());
    }

    #[tokio::test]
    async fn test_failures_are_never_cached() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "020", "message": "요청 제한을 초과하였습니다."})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(path("/majorstock.json"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        for _ in 0..2 {
            let outcome = dispatcher
                .invoke("get_company_overview_tool", json!({"corp_code": "00126380"}))
                .await
                .unwrap();
            assert!(matches!(outcome, UpstreamResult::UpstreamError { ref code, .. } if code == "020"));

            let outcome = dispatcher
                .invoke("get_shareholders_tool", json!({"corp_code": "00126380"}))
                .await
                .unwrap();
            assert!(matches!(outcome, UpstreamResult::TransportError(_)));
        }
        assert!(dispatcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_argument_key_beats_environment_key() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .and(query_param("crtfc_key", "caller-key-123456"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ok_body(json!({"used": "caller"}))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/company.json"))
            .and(query_param("crtfc_key", TEST_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({"used": "env"}))))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                "get_company_overview_tool",
                json!({"corp_code": "00126380", "env": {"DART_API_KEY": "caller-key-123456"}}),
            )
            .await
            .unwrap();
        assert_eq!(outcome.success_json().unwrap()["company_info"]["used"], "caller");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dispatcher = dispatcher_with(&server, None, CachePolicy::default());
        let err = dispatcher
            .invoke("get_company_overview_tool", json!({"corp_code": "00126380"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));

        let health = dispatcher.invoke("health", json!({})).await.unwrap();
        assert_eq!(
            health.success_json().unwrap()["environment"]["dart_api_key"],
            "not configured"
        );
    }

    #[tokio::test]
    async fn test_no_data_disclosure_list_is_empty_success() {
        let server = MockServer::start().await;
        Mock::given(path("/list.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "013", "message": "조회된 데이타가 없습니다."})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        for _ in 0..2 {
            let outcome = dispatcher
                .invoke("get_public_disclosure_tool", json!({"corp_code": "00126380"}))
                .await
                .unwrap();
            let body = outcome.success_json().unwrap();
            assert_eq!(body["disclosures"], json!([]));
            assert_eq!(body["total_count"], 0);
        }
    }

    #[tokio::test]
    async fn test_no_data_cached_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(path("/list.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "013", "message": "조회된 데이타가 없습니다."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let policy = CachePolicy::default().cache_not_found("get_public_disclosure_tool");
        let dispatcher = dispatcher_with(&server, Some(TEST_KEY), policy);
        for _ in 0..2 {
            dispatcher
                .invoke("get_public_disclosure_tool", json!({"corp_code": "00126380"}))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_ambiguous_name_stops_before_primary_call() {
        let server = MockServer::start().await;
        mount_directory(
            &server,
            &[
                ("00000001", "Acme Corp", "111110"),
                ("00000002", "Acme Industries", "222220"),
                ("00000003", "Globex", "333330"),
            ],
        )
        .await;
        Mock::given(path("/company.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({}))))
            .expect(0)
            .mount(&server)
            .await;

        let err = dispatcher(&server)
            .invoke("get_company_overview_tool", json!({"company_name": "Acme"}))
            .await
            .unwrap_err();
        match err {
            ToolError::AmbiguousIdentity { query, candidates } => {
                assert_eq!(query, "Acme");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_name_resolves_through_cached_search() {
        let server = MockServer::start().await;
        let archive = zip_with(
            "CORPCODE.xml",
            directory_xml(&[("00000003", "Globex", "333330")]).as_bytes(),
        );
        Mock::given(path("/corpCode.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/company.json"))
            .and(query_param("corp_code", "00000003"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({"ceo_nm": "Hank"}))))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        for _ in 0..2 {
            let outcome = dispatcher
                .invoke("get_company_overview_tool", json!({"company_name": "globex"}))
                .await
                .unwrap();
            assert_eq!(outcome.success_json().unwrap()["corp_code"], "00000003");
        }
    }

    #[tokio::test]
    async fn test_unknown_name_and_failed_search() {
        let server = MockServer::start().await;
        mount_directory(&server, &[("00000003", "Globex", "333330")]).await;
        let dispatcher = dispatcher(&server);

        let err = dispatcher
            .invoke("get_executives_tool", json!({"company_name": "Initech"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::CompanyNotFound(_)));

        let failing = MockServer::start().await;
        Mock::given(path("/corpCode.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "010", "message": "등록되지 않은 키입니다."})),
            )
            .mount(&failing)
            .await;
        let outcome = super::tests::dispatcher(&failing)
            .invoke("get_executives_tool", json!({"company_name": "Initech"}))
            .await
            .unwrap();
        assert!(matches!(outcome, UpstreamResult::UpstreamError { ref code, .. } if code == "010"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_missing_identity() {
        let server = MockServer::start().await;
        let dispatcher = dispatcher(&server);
        assert!(matches!(
            dispatcher.invoke("no_such_tool", json!({})).await,
            Err(ToolError::NotFound(_))
        ));
        assert!(matches!(
            dispatcher.invoke("get_company_overview_tool", json!({})).await,
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_call_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(path("/company.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body(json!({})))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        let call = dispatcher.invoke("get_company_overview_tool", json!({"corp_code": "1"}));
        let abandoned = tokio::time::timeout(Duration::from_millis(50), call).await;
        assert!(abandoned.is_err());
        assert!(dispatcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_keeps_call_key_private() {
        const CALLER_KEY: &str = "caller-secret-0123456789";
        let client = DartClient::new(&DartConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 5,
            document_timeout_secs: 5,
        })
        .unwrap();
        let dispatcher = Dispatcher::new(
            client,
            CredentialResolver::new(None),
            10,
            CachePolicy::default(),
        );
        let args = json!({"corp_code": "00126380", "env": {"DART_API_KEY": CALLER_KEY}});

        let outcome = dispatcher
            .invoke("get_company_overview_tool", args.clone())
            .await
            .unwrap();
        assert!(matches!(outcome, UpstreamResult::TransportError(_)));

        let rendered = serde_json::to_string(&render(Ok(outcome))).unwrap();
        assert!(!rendered.contains(CALLER_KEY), "{}", rendered);

        let rest = to_rest(dispatcher.invoke("get_company_overview_tool", args).await);
        let message = rest.unwrap_err();
        assert!(message.contains("Please retry later"));
        assert!(!message.contains(CALLER_KEY));
    }

    #[test]
    fn test_policy_from_config() {
        let all = CachePolicy::from_config(&CacheConfig {
            capacity: 10,
            cache_not_found: vec!["ALL".to_string()],
        });
        assert!(all.caches_not_found("anything"));

        let some = CachePolicy::from_config(&CacheConfig {
            capacity: 10,
            cache_not_found: vec!["get_major_report_tool".to_string()],
        });
        assert!(some.caches_not_found("get_major_report_tool"));
        assert!(!some.caches_not_found("get_public_disclosure_tool"));

        let empty_success = UpstreamResult::json(json!({"list": []}));
        assert!(!some.should_store("get_public_disclosure_tool", OutcomeKind::NotFound, &empty_success));
        assert!(some.should_store("get_major_report_tool", OutcomeKind::NotFound, &empty_success));
        assert!(!some.should_store(
            "get_major_report_tool",
            OutcomeKind::Success,
            &UpstreamResult::upstream_error("parse_error", "bad")
        ));
    }
}

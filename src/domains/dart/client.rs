//! HTTP client for the DART Open API.
//!
//! One [`DartClient::call`] issues exactly one HTTP request and folds the
//! response into an [`UpstreamResult`]. There is no retry here.

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::credentials::Credentials;
use super::outcome::{DocumentFormat, Payload, UpstreamResult};
use super::xml;
use crate::core::config::DartConfig;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "crtfc_key";

/// HTTP method of a request.
///
/// Every current tool uses `Get`; `Post` sends the parameters as a form body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How the response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// JSON with a `status`/`message` envelope.
    Json,
    /// A zip archive whose first XML entry is returned as bytes.
    Archive,
    /// An XML document (optionally zipped), parsed into a field mapping.
    StructuredXml,
    /// Opaque bytes with a format tag.
    Binary(DocumentFormat),
}

/// One logical upstream operation.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub method: Method,
    pub kind: ResponseKind,
    /// Overrides the client's timeout for this kind of response.
    pub timeout: Option<Duration>,
}

impl UpstreamRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            method: Method::Get,
            kind: ResponseKind::Json,
            timeout: None,
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Async client for the upstream API.
#[derive(Debug, Clone)]
pub struct DartClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    document_timeout: Duration,
}

impl DartClient {
    pub fn new(config: &DartConfig) -> crate::core::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dart-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            document_timeout: Duration::from_secs(config.document_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_for(&self, request: &UpstreamRequest) -> Duration {
        request.timeout.unwrap_or(match request.kind {
            ResponseKind::Json => self.timeout,
            _ => self.document_timeout,
        })
    }

    /// Perform the request with the given credentials.
    pub async fn call(&self, request: &UpstreamRequest, credentials: &Credentials) -> UpstreamResult {
        let url = format!("{}/{}", self.base_url, request.endpoint);
        let timeout = self.timeout_for(request);

        debug!(
            "Upstream request | endpoint={}, params={:?}, {}={}",
            request.endpoint,
            request.params,
            API_KEY_PARAM,
            credentials.preview()
        );

        let mut params = request.params.clone();
        params.push((API_KEY_PARAM.to_string(), credentials.api_key().to_string()));

        let builder = match request.method {
            Method::Get => self.http.get(&url).query(&params),
            Method::Post => self.http.post(&url).form(&params),
        };

        let response = match builder.timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(&request.endpoint, e, timeout),
        };

        let status = response.status();
        if !status.is_success() {
            error!(
                "Upstream HTTP error | endpoint={}, status={}",
                request.endpoint, status
            );
            return UpstreamResult::transport(format!("upstream returned HTTP {}", status));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return transport_failure(&request.endpoint, e, timeout),
        };

        debug!(
            "Upstream response | endpoint={}, bytes={}",
            request.endpoint,
            body.len()
        );

        let outcome = interpret(request.kind, body);
        if outcome.is_failure() {
            warn!(
                "Upstream call failed | endpoint={}, outcome={:?}",
                request.endpoint,
                outcome.kind()
            );
        }
        outcome
    }
}

/// The request URL carries the API key in its query string, so it is dropped
/// from the error before anything is logged or returned.
fn transport_failure(endpoint: &str, err: reqwest::Error, timeout: Duration) -> UpstreamResult {
    let err = err.without_url();
    error!("Upstream request failed | endpoint={}, error={}", endpoint, err);

    let cause = if err.is_timeout() {
        format!("request timed out after {:?}", timeout)
    } else if err.is_connect() {
        format!("could not connect to the DART API ({})", endpoint)
    } else {
        format!("{} ({})", err, endpoint)
    };
    UpstreamResult::transport(cause)
}

/// Fold a response body into an outcome according to the expected kind.
pub fn interpret(kind: ResponseKind, body: Bytes) -> UpstreamResult {
    match kind {
        ResponseKind::Json => interpret_json(&body),
        ResponseKind::Archive => interpret_archive(body),
        ResponseKind::StructuredXml => interpret_document(body),
        ResponseKind::Binary(format) => interpret_binary(format, body),
    }
}

fn interpret_json(body: &[u8]) -> UpstreamResult {
    let json: Value = match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(e) => return UpstreamResult::transport(format!("malformed JSON body: {}", e)),
    };

    let Some(status) = json.get("status").and_then(Value::as_str).map(str::to_string) else {
        return UpstreamResult::transport("response has no status field");
    };
    let message = json
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    UpstreamResult::from_status(&status, &message, || Payload::Json(json))
}

fn interpret_archive(body: Bytes) -> UpstreamResult {
    if xml::is_zip(&body) {
        return match xml::first_xml_entry(&body) {
            Ok(contents) => UpstreamResult::Success(Payload::Binary {
                format: DocumentFormat::Xml,
                bytes: Bytes::from(contents),
            }),
            Err(e) => UpstreamResult::parse_failure(e.to_string(), body),
        };
    }

    match xml::status_envelope(&body) {
        Some((status, message)) => UpstreamResult::from_status(&status, &message, || {
            Payload::Binary {
                format: DocumentFormat::Xml,
                bytes: body.clone(),
            }
        }),
        None => UpstreamResult::parse_failure("expected a zip archive", body),
    }
}

fn interpret_document(body: Bytes) -> UpstreamResult {
    let contents = if xml::is_zip(&body) {
        match xml::first_xml_entry(&body) {
            Ok(contents) => Bytes::from(contents),
            Err(e) => return UpstreamResult::parse_failure(e.to_string(), body),
        }
    } else {
        if let Some((status, message)) = xml::status_envelope(&body) {
            if status != super::outcome::STATUS_OK {
                return UpstreamResult::from_status(&status, &message, || {
                    Payload::Json(Value::Null)
                });
            }
        }
        body
    };

    match xml::xml_to_value(&contents) {
        Ok(fields) => UpstreamResult::Success(Payload::Document {
            format: DocumentFormat::Xml,
            raw: contents,
            fields,
        }),
        Err(e) => UpstreamResult::parse_failure(e.to_string(), contents),
    }
}

fn interpret_binary(format: DocumentFormat, body: Bytes) -> UpstreamResult {
    match xml::status_envelope(&body) {
        Some((status, message)) if status != super::outcome::STATUS_OK => {
            UpstreamResult::from_status(&status, &message, || Payload::Json(Value::Null))
        }
        _ => UpstreamResult::Success(Payload::Binary {
            format,
            bytes: body,
        }),
    }
}

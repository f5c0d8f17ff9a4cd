//! Original disclosure documents (공시서류원본파일).

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::domains::dart::{
    Credentials, DocumentFormat, ResponseKind, UpstreamRequest, UpstreamResult,
};
use crate::domains::tools::cache_key::CacheKey;
use crate::domains::tools::common::{dispatch_route, string_or_number};
use crate::domains::tools::dispatcher::Dispatcher;
use crate::domains::tools::error::ToolError;

const RCEPT_NO_LEN: usize = 14;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DisclosureDocumentParams {
    #[schemars(description = "14-digit receipt number, as listed by get_public_disclosure_tool")]
    #[serde(default, deserialize_with = "string_or_number")]
    pub rcept_no: Option<String>,

    #[schemars(description = "File format: xml (default) or pdf")]
    #[serde(default)]
    pub file_format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DisclosureDocumentTool;

impl DisclosureDocumentTool {
    pub const NAME: &'static str = "download_disclosure_document_tool";

    pub const DESCRIPTION: &'static str = "Download the original document of a disclosure by receipt number. xml returns the raw document text together with a parsed field mapping; pdf returns the file base64-encoded.";

    pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    pub async fn run(
        dispatcher: &Dispatcher,
        params: DisclosureDocumentParams,
        credentials: &Credentials,
    ) -> Result<UpstreamResult, ToolError> {
        let rcept_no = parse_rcept_no(params.rcept_no.as_deref())?;
        let format = parse_format(params.file_format.as_deref())?;
        let (endpoint, kind) = match format {
            DocumentFormat::Pdf => ("document.pdf", ResponseKind::Binary(DocumentFormat::Pdf)),
            DocumentFormat::Xml => ("document.xml", ResponseKind::StructuredXml),
        };

        let key = CacheKey::builder(Self::NAME)
            .with("rcept_no", &rcept_no)
            .with("file_format", format.as_str())
            .build();
        let request = UpstreamRequest::get(endpoint)
            .param("rcept_no", &rcept_no)
            .kind(kind);

        Ok(dispatcher
            .fetch(&key, Self::TTL, credentials, request, |outcome| match outcome {
                UpstreamResult::Success(payload) => {
                    let mut rendered = payload.to_json();
                    if let Some(map) = rendered.as_object_mut() {
                        map.insert("rcept_no".to_string(), Value::String(rcept_no.clone()));
                    }
                    UpstreamResult::json(rendered)
                }
                other => other,
            })
            .await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<DisclosureDocumentParams>(),
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

fn parse_rcept_no(rcept_no: Option<&str>) -> Result<String, ToolError> {
    let rcept_no = rcept_no.map(str::trim).unwrap_or_default();
    if rcept_no.len() == RCEPT_NO_LEN && rcept_no.chars().all(|c| c.is_ascii_digit()) {
        Ok(rcept_no.to_string())
    } else if rcept_no.is_empty() {
        Err(ToolError::invalid_arguments("rcept_no is required"))
    } else {
        Err(ToolError::invalid_arguments(format!(
            "rcept_no must be {} digits, got '{}'",
            RCEPT_NO_LEN, rcept_no
        )))
    }
}

fn parse_format(file_format: Option<&str>) -> Result<DocumentFormat, ToolError> {
    match file_format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("xml") => Ok(DocumentFormat::Xml),
        Some("pdf") => Ok(DocumentFormat::Pdf),
        Some(other) => Err(ToolError::invalid_arguments(format!(
            "file_format must be 'xml' or 'pdf', got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::dispatcher::tests::dispatcher;
    use serde_json::json;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RCEPT_NO: &str = "20240315000123";

    #[tokio::test]
    async fn test_xml_document_parsed() {
        let server = MockServer::start().await;
        Mock::given(path("/document.xml"))
            .and(query_param("rcept_no", RCEPT_NO))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<DOCUMENT><TITLE ATOC="Y">사업보고서</TITLE><P>one</P><P>two</P></DOCUMENT>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        for _ in 0..2 {
            let outcome = dispatcher
                .invoke(DisclosureDocumentTool::NAME, json!({"rcept_no": RCEPT_NO}))
                .await
                .unwrap();
            let body = outcome.success_json().unwrap();
            assert_eq!(body["rcept_no"], RCEPT_NO);
            assert_eq!(body["format"], "xml");
            assert_eq!(body["parsed"]["TITLE"]["text"], "사업보고서");
            assert_eq!(body["parsed"]["TITLE"]["attributes"]["ATOC"], "Y");
            assert_eq!(body["parsed"]["P"][1]["text"], "two");
        }
    }

    #[tokio::test]
    async fn test_pdf_document_base64() {
        let server = MockServer::start().await;
        Mock::given(path("/document.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = dispatcher(&server)
            .invoke(
                DisclosureDocumentTool::NAME,
                json!({"rcept_no": RCEPT_NO, "file_format": "PDF"}),
            )
            .await
            .unwrap();
        let body = outcome.success_json().unwrap();
        assert_eq!(body["mime_type"], "application/pdf");
        assert_eq!(body["size"], 8);
        assert_eq!(body["content_base64"], "JVBERi0xLjQ=");
    }

    #[tokio::test]
    async fn test_malformed_xml_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(path("/document.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<DOCUMENT><P>open"))
            .expect(2)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        for _ in 0..2 {
            let outcome = dispatcher
                .invoke(DisclosureDocumentTool::NAME, json!({"rcept_no": RCEPT_NO}))
                .await
                .unwrap();
            match outcome {
                UpstreamResult::UpstreamError { raw, .. } => assert!(raw.is_some()),
                other => panic!("expected a parse failure, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_argument_validation() {
        assert!(parse_rcept_no(None).is_err());
        assert!(parse_rcept_no(Some("2024031500012")).is_err());
        assert!(parse_rcept_no(Some("2024031500012x")).is_err());
        assert_eq!(parse_rcept_no(Some(" 20240315000123 ")).unwrap(), RCEPT_NO);

        assert_eq!(parse_format(None).unwrap(), DocumentFormat::Xml);
        assert_eq!(parse_format(Some("Pdf")).unwrap(), DocumentFormat::Pdf);
        assert!(parse_format(Some("hwp")).is_err());
    }
}

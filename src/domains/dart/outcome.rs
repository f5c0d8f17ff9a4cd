//! Uniform result shape for every upstream call.
//!
//! The upstream answers with a `status`/`message` envelope. The client folds
//! that envelope, together with network and decoding failures, into
//! [`UpstreamResult`] so nothing above the client boundary re-inspects raw
//! status strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Status code the upstream uses for a successful response.
pub const STATUS_OK: &str = "000";

/// Status code the upstream uses when a query matched nothing.
pub const STATUS_NO_DATA: &str = "013";

/// Status code attached to outcomes whose body could not be parsed.
pub const STATUS_PARSE_FAILURE: &str = "parse_error";

/// Format tag for document payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Xml,
    Pdf,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Data carried by a successful outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Decoded JSON body (or a reshaped object built from one).
    Json(Value),

    /// Opaque bytes, e.g. a PDF.
    Binary { format: DocumentFormat, bytes: Bytes },

    /// Structured document: the raw bytes plus the field mapping parsed from them.
    Document {
        format: DocumentFormat,
        raw: Bytes,
        fields: Value,
    },
}

impl Payload {
    /// Render the payload as JSON for tool output.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Binary { format, bytes } => json!({
                "format": format.as_str(),
                "mime_type": format.mime_type(),
                "size": bytes.len(),
                "content_base64": BASE64.encode(bytes),
            }),
            Self::Document {
                format,
                raw,
                fields,
            } => json!({
                "format": format.as_str(),
                "size": raw.len(),
                "content": String::from_utf8_lossy(raw),
                "parsed": fields,
            }),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Outcome of one logical upstream operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResult {
    Success(Payload),

    /// The upstream reported "no data". Not a failure.
    NotFound,

    /// A non-success status code, message kept verbatim.
    UpstreamError {
        code: String,
        message: String,
        /// Raw body, kept when it could not be parsed.
        raw: Option<Bytes>,
    },

    /// Network failure, timeout, or an undecodable body.
    TransportError(String),
}

/// Discriminant of [`UpstreamResult`], used by cache policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    NotFound,
    UpstreamError,
    TransportError,
}

impl UpstreamResult {
    pub fn json(value: Value) -> Self {
        Self::Success(Payload::Json(value))
    }

    pub fn upstream_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            code: code.into(),
            message: message.into(),
            raw: None,
        }
    }

    /// A body that could not be parsed. The raw bytes stay attached.
    pub fn parse_failure(reason: impl Into<String>, raw: Bytes) -> Self {
        Self::UpstreamError {
            code: STATUS_PARSE_FAILURE.to_string(),
            message: reason.into(),
            raw: Some(raw),
        }
    }

    pub fn transport(cause: impl Into<String>) -> Self {
        Self::TransportError(cause.into())
    }

    /// Map an upstream status code onto an outcome.
    ///
    /// `on_success` is only invoked for [`STATUS_OK`].
    pub fn from_status(
        status: &str,
        message: &str,
        on_success: impl FnOnce() -> Payload,
    ) -> Self {
        match status {
            STATUS_OK => Self::Success(on_success()),
            STATUS_NO_DATA => Self::NotFound,
            other => Self::upstream_error(other, message),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::NotFound => OutcomeKind::NotFound,
            Self::UpstreamError { .. } => OutcomeKind::UpstreamError,
            Self::TransportError(_) => OutcomeKind::TransportError,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::UpstreamError { .. } | Self::TransportError(_))
    }

    /// The JSON payload of a successful outcome.
    pub fn success_json(&self) -> Option<&Value> {
        match self {
            Self::Success(payload) => payload.as_json(),
            _ => None,
        }
    }

    /// Apply `f` to a successful JSON payload, leaving every other outcome untouched.
    pub fn map_json(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Success(Payload::Json(value)) => Self::json(f(value)),
            other => other,
        }
    }
}

/// Pull the `list` array out of a status envelope.
pub fn envelope_list(body: &Value) -> Value {
    body.get("list")
        .cloned()
        .filter(Value::is_array)
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

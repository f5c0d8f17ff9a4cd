//! Helpers shared by every tool definition.
//!
//! Parameter parsing and validation, result rendering, and the rmcp route
//! wrapper that sends every call through the [`Dispatcher`].

use std::sync::Arc;

use chrono::{Duration as DateSpan, Local, NaiveDate};
use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{CallToolResult, Content, Tool},
};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value, json};
use tracing::{debug, warn};

use super::dispatcher::Dispatcher;
use super::error::ToolError;
use crate::domains::dart::outcome::{STATUS_NO_DATA, envelope_list};
use crate::domains::dart::{Payload, UpstreamResult};

/// Upstream date format.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Report codes: annual, half-year, first quarter, third quarter.
pub const REPORT_CODES: [&str; 4] = ["11011", "11012", "11013", "11014"];

/// Annual report.
pub const DEFAULT_REPORT_CODE: &str = "11011";

/// Days covered by a date range when `bgn_de` is omitted.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

// ============================================================================
// Parameter parsing
// ============================================================================

/// Deserialize tool parameters, reporting failures as invalid arguments.
pub fn parse_params<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Accept a string or a number for an optional string parameter.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(number_to_string(&n))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Accept an integer, an integral float, or a numeric string.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let parsed = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {}", value)))
}

// ============================================================================
// Validation and defaults
// ============================================================================

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Previous calendar year, the latest one with a complete annual report.
pub fn default_business_year() -> String {
    use chrono::Datelike;
    (today().year() - 1).to_string()
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    let trimmed = value.trim();
    if trimmed.len() != 8 {
        return Err(ToolError::invalid_arguments(format!(
            "{} must be YYYYMMDD, got '{}'",
            field, value
        )));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        ToolError::invalid_arguments(format!("{} must be YYYYMMDD, got '{}'", field, value))
    })
}

/// Resolve an optional date range: end defaults to today, begin to 30 days before today.
pub fn resolve_date_range(
    bgn_de: Option<&str>,
    end_de: Option<&str>,
) -> Result<(String, String), ToolError> {
    let end = match end_de.filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date("end_de", raw)?,
        None => today(),
    };
    let begin = match bgn_de.filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date("bgn_de", raw)?,
        None => today() - DateSpan::days(DEFAULT_RANGE_DAYS),
    };
    if begin > end {
        return Err(ToolError::invalid_arguments(format!(
            "bgn_de ({}) is after end_de ({})",
            format_date(begin),
            format_date(end)
        )));
    }
    Ok((format_date(begin), format_date(end)))
}

pub fn resolve_business_year(bsns_year: Option<&str>) -> Result<String, ToolError> {
    match bsns_year.map(str::trim).filter(|y| !y.is_empty()) {
        None => Ok(default_business_year()),
        Some(year) if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) => {
            Ok(year.to_string())
        }
        Some(other) => Err(ToolError::invalid_arguments(format!(
            "bsns_year must be YYYY, got '{}'",
            other
        ))),
    }
}

pub fn resolve_report_code(reprt_code: Option<&str>) -> Result<String, ToolError> {
    match reprt_code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(DEFAULT_REPORT_CODE.to_string()),
        Some(code) if REPORT_CODES.contains(&code) => Ok(code.to_string()),
        Some(other) => Err(ToolError::invalid_arguments(format!(
            "reprt_code must be one of {}, got '{}'",
            REPORT_CODES.join(", "),
            other
        ))),
    }
}

pub fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<u32, ToolError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ToolError::invalid_arguments(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )))
    }
}

// ============================================================================
// Result rendering
// ============================================================================

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Text content plus machine-readable structured content.
pub fn structured_result(summary: String, structured: Value, is_error: bool) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: Some(structured),
        is_error: Some(is_error),
        meta: None,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// JSON body for a "no data" outcome.
pub fn no_data_payload() -> Value {
    json!({
        "status": STATUS_NO_DATA,
        "message": "No data found for the given parameters",
    })
}

/// Wrap the `list` of a JSON envelope under `list_field`, next to `header`.
///
/// "No data" becomes the same shape with an empty list.
pub fn shape_list(
    outcome: UpstreamResult,
    header: Value,
    list_field: &str,
) -> UpstreamResult {
    let list = match &outcome {
        UpstreamResult::Success(Payload::Json(body)) => envelope_list(body),
        UpstreamResult::NotFound => Value::Array(Vec::new()),
        _ => return outcome,
    };
    let mut shaped = match header {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    shaped.insert(list_field.to_string(), list);
    UpstreamResult::json(Value::Object(shaped))
}

/// Drop the status envelope fields from a JSON body.
pub fn strip_envelope(mut body: Value) -> Value {
    if let Some(map) = body.as_object_mut() {
        map.remove("status");
        map.remove("message");
    }
    body
}

/// Render a dispatcher result as an MCP tool result.
pub fn render(result: Result<UpstreamResult, ToolError>) -> CallToolResult {
    match result {
        Ok(outcome) => render_outcome(outcome),
        Err(err) => render_error(&err),
    }
}

pub fn render_outcome(outcome: UpstreamResult) -> CallToolResult {
    match outcome {
        UpstreamResult::Success(payload) => {
            let value = payload.to_json();
            structured_result(pretty(&value), value, false)
        }
        UpstreamResult::NotFound => {
            let value = no_data_payload();
            structured_result(pretty(&value), value, false)
        }
        UpstreamResult::UpstreamError { code, message, raw } => {
            let text = format!("DART API error (status {}): {}", code, message);
            warn!("{}", text);
            let mut details = json!({ "status": code, "message": message });
            if let Some(raw) = raw {
                details["raw_size"] = json!(raw.len());
                details["raw"] = json!(String::from_utf8_lossy(&raw));
            }
            structured_result(text, json!({ "error": details }), true)
        }
        UpstreamResult::TransportError(cause) => error_result(&format!(
            "Request to DART API failed: {}. Please retry later.",
            cause
        )),
    }
}

pub fn render_error(err: &ToolError) -> CallToolResult {
    match err {
        ToolError::AmbiguousIdentity { query, candidates } => {
            warn!("{}", err);
            structured_result(
                err.to_string(),
                json!({
                    "error": {
                        "kind": "ambiguous_identity",
                        "query": query,
                        "candidates": candidates,
                    }
                }),
                true,
            )
        }
        ToolError::LookupFailed(outcome) => render_outcome((**outcome).clone()),
        other if other.is_user_correctable() => {
            debug!("Rejected tool call: {}", other);
            CallToolResult::error(vec![Content::text(other.to_string())])
        }
        other => error_result(&other.to_string()),
    }
}

/// Plain JSON rendering for the REST endpoints: the payload, or an error message.
pub fn to_rest(result: Result<UpstreamResult, ToolError>) -> Result<Value, String> {
    match result {
        Ok(UpstreamResult::Success(payload)) => Ok(payload.to_json()),
        Ok(UpstreamResult::NotFound) => Ok(no_data_payload()),
        Ok(UpstreamResult::UpstreamError { code, message, .. }) => {
            Err(format!("DART API error (status {}): {}", code, message))
        }
        Ok(UpstreamResult::TransportError(cause)) => Err(format!(
            "Request to DART API failed: {}. Please retry later.",
            cause
        )),
        Err(ToolError::LookupFailed(outcome)) => to_rest(Ok(*outcome)),
        Err(err) => Err(err.to_string()),
    }
}

// ============================================================================
// Routing
// ============================================================================

/// rmcp route that forwards the call to the dispatcher under the tool's name.
pub fn dispatch_route<S>(tool: Tool, dispatcher: Arc<Dispatcher>) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = tool.name.clone();
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let dispatcher = dispatcher.clone();
        let name = name.clone();
        async move {
            let result = dispatcher.invoke(&name, Value::Object(args)).await;
            Ok::<CallToolResult, McpError>(render(result))
        }
        .boxed()
    })
}

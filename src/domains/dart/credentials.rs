//! API key resolution.
//!
//! A key embedded in the call arguments (`env.DART_API_KEY`) wins over the
//! process-wide key loaded at startup. Hosts forwarding calls for several end
//! users rely on that precedence. Resolution happens on every call and never
//! fails; an absent key is reported through [`KeySource::Absent`].

use serde_json::Value;
use tracing::debug;

/// Argument section that may carry per-call credentials.
pub const ENV_SECTION: &str = "env";

/// Name of the API key, both in the argument section and in the process environment.
pub const API_KEY_NAME: &str = "DART_API_KEY";

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    CallArguments,
    Environment,
    Absent,
}

impl KeySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CallArguments => "arguments.env",
            Self::Environment => "environment",
            Self::Absent => "none",
        }
    }
}

/// A resolved API key and its provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    source: KeySource,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, source: KeySource) -> Self {
        Self {
            api_key: api_key.into(),
            source,
        }
    }

    pub fn absent() -> Self {
        Self::new(String::new(), KeySource::Absent)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn is_present(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Non-reversible preview for diagnostics: first four characters and the length.
    pub fn preview(&self) -> String {
        mask_key(&self.api_key)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.preview())
            .field("source", &self.source)
            .finish()
    }
}

/// Characters of a key shown in previews.
const PREVIEW_PREFIX: usize = 4;

/// Keys shorter than this are previewed by length only.
const PREVIEW_MIN_LEN: usize = 12;

/// Mask a secret for logging.
pub fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len == 0 {
        return "<empty>".to_string();
    }
    if len < PREVIEW_MIN_LEN {
        return format!("***({} chars)", len);
    }
    let prefix: String = key.chars().take(PREVIEW_PREFIX).collect();
    format!("{}***({} chars)", prefix, len)
}

/// Resolves the key to use for a call.
#[derive(Clone, Default)]
pub struct CredentialResolver {
    configured_key: Option<String>,
}

impl CredentialResolver {
    /// `configured_key` is the process-wide key, typically read once from the environment.
    pub fn new(configured_key: Option<String>) -> Self {
        Self {
            configured_key: configured_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn has_configured_key(&self) -> bool {
        self.configured_key.is_some()
    }

    pub fn resolve(&self, arguments: &Value) -> Credentials {
        let credentials = if let Some(key) = key_from_arguments(arguments) {
            Credentials::new(key, KeySource::CallArguments)
        } else if let Some(key) = &self.configured_key {
            Credentials::new(key.clone(), KeySource::Environment)
        } else {
            Credentials::absent()
        };

        debug!(
            "Resolved credentials | {}={}, source={}",
            API_KEY_NAME,
            credentials.preview(),
            credentials.source().as_str()
        );

        credentials
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field(
                "configured_key",
                &self.configured_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

fn key_from_arguments(arguments: &Value) -> Option<String> {
    arguments
        .get(ENV_SECTION)?
        .get(API_KEY_NAME)?
        .as_str()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Remove the credentials section so it never reaches parameter parsing or logs.
pub fn strip_credentials(mut arguments: Value) -> Value {
    if let Some(map) = arguments.as_object_mut() {
        map.remove(ENV_SECTION);
    }
    arguments
}

//! Canonical cache keys.
//!
//! A key is `tool|name=value&name=value` with pairs sorted by name. Callers
//! add every parameter after defaults are resolved, so omitting a default and
//! passing it explicitly produce the same key.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tool: String,
    rendered: String,
}

impl CacheKey {
    pub fn builder(tool: &str) -> CacheKeyBuilder {
        CacheKeyBuilder {
            tool: tool.to_string(),
            pairs: BTreeMap::new(),
        }
    }

    /// Tool (or internal operation) the key belongs to.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

pub struct CacheKeyBuilder {
    tool: String,
    pairs: BTreeMap<String, String>,
}

impl CacheKeyBuilder {
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.pairs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> CacheKey {
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(name, value)| format!("{}={}", escape(name), escape(value)))
            .collect();
        let rendered = format!("{}|{}", self.tool, pairs.join("&"));
        CacheKey {
            tool: self.tool,
            rendered,
        }
    }
}

/// Escape the separators so distinct pair sets never render alike.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '|' => out.push_str("%7C"),
            other => out.push(other),
        }
    }
    out
}

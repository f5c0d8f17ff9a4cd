//! Company identity: the upstream's fixed-width corp code and its display name.

use serde::{Deserialize, Serialize};

/// Width of an upstream corp code.
pub const CORP_CODE_WIDTH: usize = 8;

/// How many candidates an ambiguity report lists.
pub const MAX_REPORTED_CANDIDATES: usize = 10;

/// A company as listed by the upstream corp code directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub corp_code: String,
    pub corp_name: String,
    #[serde(default)]
    pub stock_code: String,
    #[serde(default)]
    pub modify_date: String,
}

impl CompanyIdentity {
    /// Listed companies carry a non-blank stock code.
    pub fn is_listed(&self) -> bool {
        !self.stock_code.trim().is_empty()
    }
}

/// How a caller named the company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    ByCode(String),
    ByName(String),
}

impl Identifier {
    /// Build from the optional tool parameters. The code wins when both are present.
    pub fn from_parts(corp_code: Option<&str>, company_name: Option<&str>) -> Option<Self> {
        let code = corp_code.map(str::trim).filter(|c| !c.is_empty());
        let name = company_name.map(str::trim).filter(|n| !n.is_empty());
        match (code, name) {
            (Some(code), _) => Some(Self::ByCode(normalize_corp_code(code))),
            (None, Some(name)) => Some(Self::ByName(name.to_string())),
            (None, None) => None,
        }
    }
}

/// Trim and left-pad all-digit codes to the fixed width.
pub fn normalize_corp_code(code: &str) -> String {
    let code = code.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", code, width = CORP_CODE_WIDTH)
    } else {
        code.to_string()
    }
}

/// Result of narrowing search candidates down to one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Unique(CompanyIdentity),
    NoMatch,
    Ambiguous(Vec<CompanyIdentity>),
}

/// Pick the single plausible candidate for `name`, or report why there is none.
///
/// Exact (case-insensitive) name matches shadow partial matches. Among
/// several exact matches, listed companies shadow unlisted ones.
pub fn select_candidate(name: &str, candidates: &[CompanyIdentity]) -> Selection {
    let wanted = name.trim().to_lowercase();

    let exact: Vec<&CompanyIdentity> = candidates
        .iter()
        .filter(|c| c.corp_name.trim().to_lowercase() == wanted)
        .collect();

    let plausible: Vec<&CompanyIdentity> = if exact.len() > 1 {
        let listed: Vec<&CompanyIdentity> =
            exact.iter().copied().filter(|c| c.is_listed()).collect();
        if listed.is_empty() { exact } else { listed }
    } else if exact.len() == 1 {
        exact
    } else {
        candidates
            .iter()
            .filter(|c| c.corp_name.to_lowercase().contains(&wanted))
            .collect()
    };

    match plausible.as_slice() {
        [] => Selection::NoMatch,
        [only] => Selection::Unique((*only).clone()),
        many => Selection::Ambiguous(
            many.iter()
                .take(MAX_REPORTED_CANDIDATES)
                .map(|c| (*c).clone())
                .collect(),
        ),
    }
}

//! Common types used throughout restmod-paging
//!
//! `RequestParams` is the typed parameter bag shared by the collection and
//! its mixins. `page` and `limit` are reserved slots; everything else is a
//! filter parameter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Filter parameters: every request parameter except `page` and `limit`.
///
/// Ordered so that deep equality and rendering are deterministic.
pub type FilterParams = BTreeMap<String, JsonValue>;

/// Reserved parameter name for the page number
pub const PAGE_PARAM: &str = "page";

/// Reserved parameter name for the page size
pub const LIMIT_PARAM: &str = "limit";

// ============================================================================
// Request Tickets
// ============================================================================

/// Monotonic sequence number identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestTicket(pub u64);

impl RequestTicket {
    /// The ticket that follows this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Parameters attached to a collection request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// 1-indexed page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Everything else
    #[serde(flatten)]
    pub filters: FilterParams,
}

impl RequestParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the limit
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add a filter parameter. `page` and `limit` are routed to their slots.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Build parameters from a JSON object.
    ///
    /// Non-object values produce an empty set.
    pub fn from_json(value: &JsonValue) -> Self {
        let mut params = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                params.insert(key.clone(), value.clone());
            }
        }
        params
    }

    /// Insert a single untyped parameter
    pub fn insert(&mut self, key: String, value: JsonValue) {
        match key.as_str() {
            PAGE_PARAM => self.page = parse_positive(PAGE_PARAM, &value),
            LIMIT_PARAM => self.limit = parse_positive(LIMIT_PARAM, &value),
            _ => {
                self.filters.insert(key, value);
            }
        }
    }

    /// Overlay `other` on top of these parameters.
    ///
    /// Set page/limit win, filters are added or replaced, and a `null`
    /// filter value removes the key.
    pub fn merge(&mut self, other: RequestParams) {
        if other.page.is_some() {
            self.page = other.page;
        }
        if other.limit.is_some() {
            self.limit = other.limit;
        }
        for (key, value) in other.filters {
            if value.is_null() {
                self.filters.remove(&key);
            } else {
                self.filters.insert(key, value);
            }
        }
    }

    /// True when no page, no limit and no filters are set
    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.limit.is_none() && self.filters.is_empty()
    }

    /// Wire view: filters plus `page`/`limit` when set
    pub fn flatten(&self) -> BTreeMap<String, JsonValue> {
        let mut all = self.filters.clone();
        if let Some(page) = self.page {
            all.insert(PAGE_PARAM.to_string(), Value::from(page));
        }
        if let Some(limit) = self.limit {
            all.insert(LIMIT_PARAM.to_string(), Value::from(limit));
        }
        all
    }

    /// Query string pairs, sorted by key. Arrays expand to repeated keys,
    /// nulls are skipped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in self.flatten() {
            for text in query_values(&value) {
                pairs.push((key.clone(), text));
            }
        }
        pairs
    }
}

/// Render a JSON value the way it appears in a query string
fn render_query_value(value: &JsonValue) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Query string values for one parameter: one per array element, none for
/// null
pub fn query_values(value: &JsonValue) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(render_query_value)
            .collect(),
        other => vec![render_query_value(other)],
    }
}

/// Follow a dotted path (optional `$.` prefix) through nested objects.
///
/// An empty path points at `value` itself.
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .filter(|p| !p.is_empty())
        .try_fold(value, |current, part| current.as_object()?.get(part))
}

fn parse_positive(name: &str, value: &JsonValue) -> Option<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Null => return None,
        _ => None,
    };
    match parsed {
        Some(n) if n >= 1 => Some(n),
        _ => {
            warn!("Ignoring invalid '{}' parameter: {}", name, value);
            None
        }
    }
}

//! Pagination types
//!
//! State and configuration shared by the page tracker.

use crate::types::{lookup_path, FilterParams, JsonValue, RequestTicket};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page used when navigation starts from an unset page
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when navigation starts from an unset limit
pub const DEFAULT_LIMIT: u32 = 10;

/// Response field holding the server-side total count
pub const DEFAULT_TOTAL_COUNT_PATH: &str = "totalCount";

/// Outcome of a navigation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    /// The page changed; the collection must refresh
    Moved {
        /// Page before the move
        from: u32,
        /// Page after the move
        to: u32,
    },
    /// Already at a boundary, nothing to do
    Unchanged,
}

impl PageTurn {
    /// Check if the page changed
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Configuration for the page tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Limit applied by `next_page`/`prev_page` when none is set
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Dotted path to the total count in the response body
    #[serde(default = "default_total_count_path")]
    pub total_count_path: String,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_total_count_path() -> String {
    DEFAULT_TOTAL_COUNT_PATH.to_string()
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            total_count_path: DEFAULT_TOTAL_COUNT_PATH.to_string(),
        }
    }
}

impl PaginationConfig {
    /// Set the default limit
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Set the total count path
    #[must_use]
    pub fn with_total_count_path(mut self, path: impl Into<String>) -> Self {
        self.total_count_path = path.into();
        self
    }
}

/// Bookkeeping owned by one tracker.
///
/// Page and limit are not stored here; they live in the collection's
/// resident parameters, which the tracker reads and updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    /// Total count reported by the latest accepted response
    pub total_count: Option<u64>,
    /// Filter parameters of the previous request
    pub last_seen_filters: FilterParams,
    /// Newest ticket issued to this collection
    pub latest_ticket: Option<RequestTicket>,
    /// Limit sent with the newest request
    pub requested_limit: Option<u32>,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// A response is stale when a newer request was issued after it
    pub fn is_stale(&self, ticket: RequestTicket) -> bool {
        self.latest_ticket.is_some_and(|latest| ticket < latest)
    }

    /// Record an issued request
    pub fn record_ticket(&mut self, ticket: RequestTicket) {
        if !self.is_stale(ticket) {
            self.latest_ticket = Some(ticket);
        }
    }
}

/// Read the total count at `path` (dotted, optional `$.` prefix).
///
/// Anything other than a non-negative integer counts as unknown.
pub fn extract_total_count(body: &JsonValue, path: &str) -> Option<u64> {
    match lookup_path(body, path)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

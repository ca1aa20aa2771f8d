//! Page tracker mixin
//!
//! Keeps a collection's page/limit consistent across requests:
//! - resets to page 1 when filter parameters change
//! - captures the server's total count from every response
//! - answers first/last page questions and moves between pages

use super::types::{extract_total_count, PageTurn, PaginationConfig, PaginationState, DEFAULT_PAGE};
use crate::collection::{Mixin, RequestContext};
use crate::types::{FilterParams, JsonValue, RequestParams, RequestTicket};
use std::any::Any;
use tracing::{debug, trace};

/// Name the page tracker registers under
pub const PAGINATE_MIXIN: &str = "paginate";

/// Page-based pagination for one collection
#[derive(Debug, Clone, Default)]
pub struct PaginationTracker {
    config: PaginationConfig,
    state: PaginationState,
}

impl PaginationTracker {
    /// Create a tracker with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with custom settings
    pub fn with_config(config: PaginationConfig) -> Self {
        Self {
            config,
            state: PaginationState::new(),
        }
    }

    /// Tracker settings
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Current bookkeeping
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Total count from the latest accepted response
    pub fn total_count(&self) -> Option<u64> {
        self.state.total_count
    }

    /// Treat `filters` as the filters of the previous request.
    ///
    /// A collection starting on a later page seeds its own filters so the
    /// first request keeps that page.
    pub fn seed_filters(&mut self, filters: &FilterParams) {
        self.state.last_seen_filters.clone_from(filters);
    }

    /// Force page 1 when the filters differ from the previous request.
    ///
    /// Runs before a request is sent. Does nothing until a page is set on
    /// the resident params. Returns true when the page was reset.
    pub fn reset_if_filters_changed(
        &mut self,
        outgoing: &mut RequestParams,
        resident: &mut RequestParams,
    ) -> bool {
        if resident.page.is_none() {
            return false;
        }

        let current = resident.filters.clone();
        let changed = current != self.state.last_seen_filters;
        if changed {
            debug!(
                "Filters changed ({} -> {} keys), resetting to page {}",
                self.state.last_seen_filters.len(),
                current.len(),
                DEFAULT_PAGE
            );
            outgoing.page = Some(DEFAULT_PAGE);
            resident.page = Some(DEFAULT_PAGE);
        }
        self.state.last_seen_filters = current;
        changed
    }

    /// Overwrite the total count from a response body.
    ///
    /// Responses older than the newest issued request are ignored.
    /// Returns true when the response was applied.
    pub fn capture_total_count(&mut self, ticket: RequestTicket, body: &JsonValue) -> bool {
        if self.state.is_stale(ticket) {
            debug!(
                "Ignoring total count from stale response {} (latest {:?})",
                ticket, self.state.latest_ticket
            );
            return false;
        }
        self.state.total_count = extract_total_count(body, &self.config.total_count_path);
        trace!("Total count after {}: {:?}", ticket, self.state.total_count);
        true
    }

    /// True when no page is set or the page is 1
    pub fn is_first_page(&self, params: &RequestParams) -> bool {
        params.page.map_or(true, |page| page == DEFAULT_PAGE)
    }

    /// True when the current window reaches the total count.
    ///
    /// Unknown total count or unset limit means "not the last page". Uses
    /// the resident limit, which may differ from the one last requested.
    pub fn is_last_page(&self, params: &RequestParams) -> bool {
        let (Some(total), Some(limit)) = (self.state.total_count, params.limit) else {
            return false;
        };
        if self
            .state
            .requested_limit
            .is_some_and(|requested| requested != limit)
        {
            debug!(
                "Limit {} differs from last requested {:?}; boundary uses {}",
                limit, self.state.requested_limit, limit
            );
        }
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        u64::from(page) * u64::from(limit) >= total
    }

    /// Check if a next page exists
    pub fn has_next_page(&self, params: &RequestParams) -> bool {
        !self.is_last_page(params)
    }

    /// Check if a previous page exists
    pub fn has_prev_page(&self, params: &RequestParams) -> bool {
        !self.is_first_page(params)
    }

    /// Advance one page unless already on the last page.
    ///
    /// Unset page and limit are defaulted first, even when the call ends up
    /// a no-op.
    pub fn next_page(&mut self, params: &mut RequestParams) -> PageTurn {
        let from = *params.page.get_or_insert(DEFAULT_PAGE);
        params.limit.get_or_insert(self.config.default_limit);

        if self.is_last_page(params) {
            debug!("Already on last page {}", from);
            return PageTurn::Unchanged;
        }

        let to = from.saturating_add(1);
        params.page = Some(to);
        debug!("Next page: {} -> {}", from, to);
        PageTurn::Moved { from, to }
    }

    /// Go back one page unless already on the first page
    pub fn prev_page(&mut self, params: &mut RequestParams) -> PageTurn {
        if self.is_first_page(params) {
            debug!("Already on first page");
            return PageTurn::Unchanged;
        }
        params.limit.get_or_insert(self.config.default_limit);

        let from = params.page.unwrap_or(DEFAULT_PAGE);
        let to = from.saturating_sub(1).max(DEFAULT_PAGE);
        params.page = Some(to);
        debug!("Previous page: {} -> {}", from, to);
        PageTurn::Moved { from, to }
    }
}

impl Mixin for PaginationTracker {
    fn name(&self) -> &'static str {
        PAGINATE_MIXIN
    }

    fn before_request(&mut self, ctx: &mut RequestContext<'_>) {
        self.reset_if_filters_changed(ctx.outgoing, ctx.resident);
        self.state.record_ticket(ctx.ticket);
        self.state.requested_limit = ctx.outgoing.limit;
    }

    fn after_response(&mut self, ticket: RequestTicket, body: &JsonValue) {
        self.capture_total_count(ticket, body);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

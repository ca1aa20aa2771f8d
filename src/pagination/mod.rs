//! Pagination module
//!
//! Page-number pagination driven by a server-reported total count.
//!
//! # Overview
//!
//! `PaginationTracker` is a collection mixin. Before each request it resets
//! the page to 1 when the filter parameters changed; after each response it
//! stores the total count. Navigation (`next_page`, `prev_page`) and the
//! boundary checks work on the collection's resident parameters and never
//! fail: at a boundary they simply do nothing.

mod tracker;
mod types;

pub use tracker::{PaginationTracker, PAGINATE_MIXIN};
pub use types::{
    extract_total_count, PageTurn, PaginationConfig, PaginationState, DEFAULT_LIMIT,
    DEFAULT_PAGE, DEFAULT_TOTAL_COUNT_PATH,
};

//! # restmod-paging
//!
//! Page-based pagination and address-bar query sync for REST collections.
//!
//! ## Features
//!
//! - **Page tracking**: page/limit bookkeeping, reset to page 1 on filter change
//! - **Boundaries**: first/last page from the server's `totalCount`
//! - **Query string sync**: mirror request params into the address bar and
//!   clear them on navigation
//! - **Stale response guard**: responses to superseded requests are ignored
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restmod_paging::collection::Collection;
//! use restmod_paging::pagination::PaginationTracker;
//! use restmod_paging::query_string::{QueryParamSynchronizer, UrlQueryStore};
//! use restmod_paging::RequestParams;
//!
//! #[tokio::main]
//! async fn main() -> restmod_paging::Result<()> {
//!     let address_bar = UrlQueryStore::parse("https://app.example.com/trips")?;
//!     let mut trips = Collection::from_config(&config)?
//!         .mix(QueryParamSynchronizer::new(address_bar.clone()))?;
//!
//!     trips.search(RequestParams::new().with_limit(20)).await?;
//!     while trips.has_next_page() {
//!         trips.next_page().await?;
//!     }
//!     println!("{}", address_bar.url());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────── Collection ─────────────────────────────┐
//! │ resident params ── before_request ──▶ Transport ── after_response ──▶│
//! │                    ┌──────────┐  ┌─────────────┐      ┌──────────┐   │
//! │                    │ paginate │─▶│ queryString │      │ paginate │   │
//! │                    └──────────┘  └──────┬──────┘      └──────────┘   │
//! └─────────────────────────────────────────┼────────────────────────────┘
//!                                           ▼
//!                                      QueryStore ◀── Navigator (clear)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Collection and mixin chain
pub mod collection;

/// Page tracking mixin
pub mod pagination;

/// Query string synchronizer mixin
pub mod query_string;

/// Navigation signal
pub mod navigation;

/// HTTP transport
pub mod http;

/// Collection configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use collection::{Collection, Mixin};
pub use config::CollectionConfig;
pub use navigation::{NavigationEvent, Navigator};
pub use pagination::{PageTurn, PaginationTracker};
pub use query_string::{MemoryQueryStore, QueryParamSynchronizer, QueryStore, UrlQueryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Query string module
//!
//! Keeps an external key-value store (the address bar) in sync with the
//! parameters of a collection's latest request.
//!
//! # Overview
//!
//! - `QueryStore` - the external store contract
//! - `MemoryQueryStore` / `UrlQueryStore` - shared-handle implementations
//! - `QueryParamSynchronizer` - the mixin doing the mirroring
//!
//! The synchronizer declares that it runs after the pagination mixin so the
//! mirrored values reflect a page reset made in the same request.

mod store;
mod synchronizer;

pub use store::{MemoryQueryStore, QueryStore, UrlQueryStore};
pub use synchronizer::{QueryParamSynchronizer, QUERY_STRING_MIXIN};

#[cfg(test)]
mod tests;

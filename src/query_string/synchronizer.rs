//! Query string synchronizer mixin
//!
//! Mirrors the parameters of the latest request into a `QueryStore` and
//! removes them again on navigation.

use super::store::QueryStore;
use crate::collection::{Mixin, RequestContext};
use crate::navigation::NavigationEvent;
use crate::pagination::PAGINATE_MIXIN;
use crate::types::{JsonValue, RequestParams};
use std::any::Any;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Name the synchronizer registers under
pub const QUERY_STRING_MIXIN: &str = "queryString";

/// Keeps a query store equal to the latest outgoing request parameters.
///
/// Only keys this synchronizer wrote are ever removed.
#[derive(Debug)]
pub struct QueryParamSynchronizer<S: QueryStore> {
    store: S,
    mirrored: BTreeMap<String, JsonValue>,
}

impl<S: QueryStore> QueryParamSynchronizer<S> {
    /// Create a synchronizer writing into `store`
    pub fn new(store: S) -> Self {
        Self {
            store,
            mirrored: BTreeMap::new(),
        }
    }

    /// The store being written to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keys currently written by this synchronizer
    pub fn mirrored(&self) -> &BTreeMap<String, JsonValue> {
        &self.mirrored
    }

    /// Remove every mirrored key from the store. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.mirrored.len();
        for key in std::mem::take(&mut self.mirrored).into_keys() {
            self.store.set(&key, None);
        }
        if removed > 0 {
            debug!("Cleared {} mirrored query params", removed);
        }
        removed
    }

    /// Replace the mirrored keys with `params`
    pub fn mirror(&mut self, params: &RequestParams) {
        self.clear();
        for (key, value) in params.flatten() {
            trace!("Mirroring {}={}", key, value);
            self.store.set(&key, Some(value.clone()));
            self.mirrored.insert(key, value);
        }
    }
}

impl<S: QueryStore> Mixin for QueryParamSynchronizer<S> {
    fn name(&self) -> &'static str {
        QUERY_STRING_MIXIN
    }

    // must observe the page reset done by the tracker
    fn runs_after(&self) -> &[&'static str] {
        &[PAGINATE_MIXIN]
    }

    fn before_request(&mut self, ctx: &mut RequestContext<'_>) {
        self.mirror(ctx.outgoing);
    }

    fn on_navigation(&mut self, _event: NavigationEvent) {
        self.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

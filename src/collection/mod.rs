//! Collection module
//!
//! A REST collection with resident parameters and a chain of mixins.
//!
//! # Request lifecycle
//!
//! ```text
//! refresh()
//!   ├─ prepare_request()   ticket++, outgoing = resident.clone()
//!   │    └─ before_request  paginate → queryString → ...
//!   ├─ Transport::fetch()
//!   └─ complete()
//!        ├─ after_response  every mixin
//!        └─ items           unless the ticket is stale
//! ```

mod mixin;

pub use mixin::{Mixin, MixinChain, RequestContext};

use crate::config::CollectionConfig;
use crate::error::Result;
use crate::http::{HttpTransport, Transport};
use crate::navigation::{NavigationEvent, Navigator};
use crate::pagination::{PageTurn, PaginationTracker};
use crate::query_string::{QueryParamSynchronizer, QueryStore};
use crate::types::{lookup_path, JsonValue, RequestParams, RequestTicket};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

/// A request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Sequence number of this request
    pub ticket: RequestTicket,
    /// Collection path
    pub path: String,
    /// Parameters after every `before_request` hook ran
    pub params: RequestParams,
}

/// A REST collection
pub struct Collection {
    path: String,
    items_path: Option<String>,
    params: RequestParams,
    items: Vec<JsonValue>,
    chain: MixinChain,
    transport: Arc<dyn Transport>,
    last_ticket: RequestTicket,
    navigation: Option<broadcast::Receiver<NavigationEvent>>,
}

impl Collection {
    /// Create a collection at `path` fetched through `transport`
    pub fn new(path: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            path: path.into(),
            items_path: None,
            params: RequestParams::new(),
            items: Vec::new(),
            chain: MixinChain::new(),
            transport,
            last_ticket: RequestTicket::default(),
            navigation: None,
        }
    }

    /// Build a collection from config with an HTTP transport.
    ///
    /// The page tracker is attached when selected. The query string
    /// synchronizer needs a store; use `from_config_with_store` for it.
    pub fn from_config(config: &CollectionConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport_config())?;
        Self::from_config_with_transport(config, Arc::new(transport))
    }

    /// Build a collection from config with a custom transport
    pub fn from_config_with_transport(
        config: &CollectionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let mut collection = Self::new(&config.path, transport);
        collection.items_path.clone_from(&config.items_path);
        collection.params = config.params.clone();
        if config.mixins.paginate {
            let mut tracker = PaginationTracker::with_config(config.pagination.clone());
            tracker.seed_filters(&config.params.filters);
            collection = collection.mix(tracker)?;
        }
        Ok(collection)
    }

    /// Build a collection from config with an HTTP transport, mirroring into
    /// `store` when the query string synchronizer is selected
    pub fn from_config_with_store<S: QueryStore>(
        config: &CollectionConfig,
        store: S,
    ) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport_config())?;
        Self::from_config_with_transport_and_store(config, Arc::new(transport), store)
    }

    /// Build a collection from config with a custom transport and query store
    pub fn from_config_with_transport_and_store<S: QueryStore>(
        config: &CollectionConfig,
        transport: Arc<dyn Transport>,
        store: S,
    ) -> Result<Self> {
        let collection = Self::from_config_with_transport(config, transport)?;
        if config.mixins.query_string {
            return collection.mix(QueryParamSynchronizer::new(store));
        }
        Ok(collection)
    }

    /// Set where records live in the response body
    #[must_use]
    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.items_path = Some(path.into());
        self
    }

    /// Set the resident parameters
    #[must_use]
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Attach a mixin
    pub fn mix<M: Mixin>(mut self, mixin: M) -> Result<Self> {
        self.chain.push(Box::new(mixin))?;
        Ok(self)
    }

    /// Collection path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resident parameters
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Resident parameters, mutably. Changes apply on the next refresh.
    pub fn params_mut(&mut self) -> &mut RequestParams {
        &mut self.params
    }

    /// Records from the latest accepted response
    pub fn items(&self) -> &[JsonValue] {
        &self.items
    }

    /// Mixin names in execution order
    pub fn mixin_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Look up a mixin by type
    pub fn mixin<T: Mixin>(&self) -> Option<&T> {
        self.chain.get::<T>()
    }

    /// Look up a mixin by type, mutably
    pub fn mixin_mut<T: Mixin>(&mut self) -> Option<&mut T> {
        self.chain.get_mut::<T>()
    }

    // ========================================================================
    // Request lifecycle
    // ========================================================================

    /// Merge `params` into the resident parameters and refresh
    pub async fn search(&mut self, params: RequestParams) -> Result<()> {
        self.params.merge(params);
        self.refresh().await
    }

    /// Alias of `search`
    pub async fn fetch(&mut self, params: RequestParams) -> Result<()> {
        self.search(params).await
    }

    /// Re-fetch with the resident parameters
    pub async fn refresh(&mut self) -> Result<()> {
        let request = self.prepare_request();
        let query = request.params.to_query_pairs();
        let body = self.transport.fetch(&request.path, &query).await?;
        self.complete(request.ticket, &body);
        Ok(())
    }

    /// Issue a ticket and run the `before_request` chain
    pub fn prepare_request(&mut self) -> PreparedRequest {
        self.pump_navigation();

        self.last_ticket = self.last_ticket.next();
        let ticket = self.last_ticket;
        let mut outgoing = self.params.clone();

        let mut ctx = RequestContext {
            ticket,
            outgoing: &mut outgoing,
            resident: &mut self.params,
        };
        self.chain.before_request(&mut ctx);

        debug!("Prepared request {} for {}", ticket, self.path);
        PreparedRequest {
            ticket,
            path: self.path.clone(),
            params: outgoing,
        }
    }

    /// Run the `after_response` chain and take the records.
    ///
    /// Responses to superseded requests reach the mixins (which guard
    /// themselves) but do not replace the records.
    pub fn complete(&mut self, ticket: RequestTicket, body: &JsonValue) {
        self.chain.after_response(ticket, body);

        if ticket < self.last_ticket {
            debug!(
                "Dropping records of stale response {} (latest {})",
                ticket, self.last_ticket
            );
            return;
        }
        self.items = self.extract_items(body);
    }

    fn extract_items(&self, body: &JsonValue) -> Vec<JsonValue> {
        let records = match &self.items_path {
            Some(path) => lookup_path(body, path),
            None => Some(body),
        };
        match records {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => Vec::new(),
            None => {
                warn!(
                    "No records at '{}' in response",
                    self.items_path.as_deref().unwrap_or_default()
                );
                Vec::new()
            }
        }
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Go to the next page and refresh, unless on the last page
    pub async fn next_page(&mut self) -> Result<PageTurn> {
        let turn = match self.chain.get_mut::<PaginationTracker>() {
            Some(tracker) => tracker.next_page(&mut self.params),
            None => PageTurn::Unchanged,
        };
        if turn.is_moved() {
            self.refresh().await?;
        }
        Ok(turn)
    }

    /// Go to the previous page and refresh, unless on the first page
    pub async fn prev_page(&mut self) -> Result<PageTurn> {
        let turn = match self.chain.get_mut::<PaginationTracker>() {
            Some(tracker) => tracker.prev_page(&mut self.params),
            None => PageTurn::Unchanged,
        };
        if turn.is_moved() {
            self.refresh().await?;
        }
        Ok(turn)
    }

    /// Check if a next page exists
    pub fn has_next_page(&self) -> bool {
        self.chain
            .get::<PaginationTracker>()
            .is_some_and(|t| t.has_next_page(&self.params))
    }

    /// Check if a previous page exists
    pub fn has_prev_page(&self) -> bool {
        self.chain
            .get::<PaginationTracker>()
            .is_some_and(|t| t.has_prev_page(&self.params))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Deliver a navigation event to the mixins
    pub fn navigate(&mut self, event: NavigationEvent) {
        debug!("Navigation {:?} on {}", event, self.path);
        self.chain.navigate(event);
    }

    /// Listen to a navigator; events are handled by `pump_navigation`
    pub fn attach_navigator(&mut self, navigator: &Navigator) {
        self.navigation = Some(navigator.subscribe());
    }

    /// Handle every pending navigation event. Returns how many were handled.
    pub fn pump_navigation(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let event = match self.navigation.as_mut().map(broadcast::Receiver::try_recv) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Lagged(missed))) => {
                    warn!("Missed {} navigation events", missed);
                    NavigationEvent::RouteChanged
                }
                Some(Err(TryRecvError::Closed)) => {
                    self.navigation = None;
                    break;
                }
                Some(Err(TryRecvError::Empty)) | None => break,
            };
            self.navigate(event);
            handled += 1;
        }
        handled
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("items", &self.items.len())
            .field("chain", &self.chain)
            .field("last_ticket", &self.last_ticket)
            .finish_non_exhaustive()
    }
}

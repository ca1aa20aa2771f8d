//! Mixin trait and ordered mixin chain
//!
//! A mixin hooks into a collection's request lifecycle. Ordering between
//! mixins is declared with `runs_after`, never implied by the order in
//! which they were mixed in.

use crate::error::{Error, Result};
use crate::navigation::NavigationEvent;
use crate::types::{JsonValue, RequestParams, RequestTicket};
use std::any::Any;
use tracing::trace;

/// Parameters visible to `before_request` hooks
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// Ticket of the request being prepared
    pub ticket: RequestTicket,
    /// Parameters that will be sent
    pub outgoing: &'a mut RequestParams,
    /// The collection's persistent parameters
    pub resident: &'a mut RequestParams,
}

/// Behaviour attached to a collection's request lifecycle
pub trait Mixin: Any + Send {
    /// Unique name within a collection
    fn name(&self) -> &'static str;

    /// Names of mixins whose hooks must run before this one's.
    /// Names that are not mixed in are ignored.
    fn runs_after(&self) -> &[&'static str] {
        &[]
    }

    /// Called before a request is sent
    fn before_request(&mut self, _ctx: &mut RequestContext<'_>) {}

    /// Called with the body of a successful response
    fn after_response(&mut self, _ticket: RequestTicket, _body: &JsonValue) {}

    /// Called when the user navigated to another view
    fn on_navigation(&mut self, _event: NavigationEvent) {}

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Mixins sorted so every mixin runs after the ones it declares
#[derive(Default)]
pub struct MixinChain {
    mixins: Vec<Box<dyn Mixin>>,
}

impl MixinChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mixin and re-sort the chain.
    ///
    /// Fails on a duplicate name or an ordering cycle; the chain is left
    /// unchanged in that case.
    pub fn push(&mut self, mixin: Box<dyn Mixin>) -> Result<()> {
        if self.contains(mixin.name()) {
            return Err(Error::DuplicateMixin {
                name: mixin.name().to_string(),
            });
        }
        self.mixins.push(mixin);

        match self.resolve_order() {
            Ok(order) => {
                self.apply_order(&order);
                trace!("Mixin order: {:?}", self.names());
                Ok(())
            }
            Err(e) => {
                self.mixins.pop();
                Err(e)
            }
        }
    }

    /// Check if a mixin with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.mixins.iter().any(|m| m.name() == name)
    }

    /// Names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.mixins.iter().map(|m| m.name()).collect()
    }

    /// Number of mixins
    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }

    /// First mixin of type `T`
    pub fn get<T: Mixin>(&self) -> Option<&T> {
        self.mixins
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<T>())
    }

    /// First mixin of type `T`, mutably
    pub fn get_mut<T: Mixin>(&mut self) -> Option<&mut T> {
        self.mixins
            .iter_mut()
            .find_map(|m| m.as_any_mut().downcast_mut::<T>())
    }

    /// Run every `before_request` hook in order
    pub fn before_request(&mut self, ctx: &mut RequestContext<'_>) {
        for mixin in &mut self.mixins {
            mixin.before_request(ctx);
        }
    }

    /// Run every `after_response` hook in order
    pub fn after_response(&mut self, ticket: RequestTicket, body: &JsonValue) {
        for mixin in &mut self.mixins {
            mixin.after_response(ticket, body);
        }
    }

    /// Deliver a navigation event to every mixin
    pub fn navigate(&mut self, event: NavigationEvent) {
        for mixin in &mut self.mixins {
            mixin.on_navigation(event);
        }
    }

    /// Topological order over `runs_after`, ties broken by mix-in order
    fn resolve_order(&self) -> Result<Vec<usize>> {
        let count = self.mixins.len();
        let deps: Vec<Vec<usize>> = self
            .mixins
            .iter()
            .map(|m| {
                m.runs_after()
                    .iter()
                    .filter_map(|dep| self.mixins.iter().position(|o| o.name() == *dep))
                    .collect()
            })
            .collect();

        let mut placed = vec![false; count];
        let mut order = Vec::with_capacity(count);
        while order.len() < count {
            let next = (0..count).find(|&i| !placed[i] && deps[i].iter().all(|&d| placed[d]));
            match next {
                Some(i) => {
                    placed[i] = true;
                    order.push(i);
                }
                None => {
                    let names = (0..count)
                        .filter(|&i| !placed[i])
                        .map(|i| self.mixins[i].name().to_string())
                        .collect();
                    return Err(Error::MixinCycle { names });
                }
            }
        }
        Ok(order)
    }

    fn apply_order(&mut self, order: &[usize]) {
        let mut slots: Vec<Option<Box<dyn Mixin>>> =
            std::mem::take(&mut self.mixins).into_iter().map(Some).collect();
        self.mixins = order.iter().filter_map(|&i| slots[i].take()).collect();
    }
}

impl std::fmt::Debug for MixinChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixinChain")
            .field("mixins", &self.names())
            .finish()
    }
}

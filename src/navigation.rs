//! Navigation signal
//!
//! A view transition is broadcast to every subscribed collection. Mixins
//! that mirror state into the address bar use it to clean up after
//! themselves.

use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 16;

/// A completed view transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Route-based router finished a transition
    RouteChanged,
    /// State-based router finished a transition
    StateChanged,
}

/// Broadcasts navigation events to subscribers
#[derive(Debug, Clone)]
pub struct Navigator {
    sender: broadcast::Sender<NavigationEvent>,
}

impl Navigator {
    /// Create a navigator with no subscribers
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.sender.subscribe()
    }

    /// Fire an event. Returns the number of subscribers that will see it.
    pub fn emit(&self, event: NavigationEvent) -> usize {
        let delivered = self.sender.send(event).unwrap_or(0);
        trace!("Navigation {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let navigator = Navigator::new();
        assert_eq!(navigator.emit(NavigationEvent::RouteChanged), 0);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let navigator = Navigator::new();
        let mut first = navigator.subscribe();
        let mut second = navigator.subscribe();
        assert_eq!(navigator.subscriber_count(), 2);

        assert_eq!(navigator.emit(NavigationEvent::StateChanged), 2);
        assert_eq!(first.try_recv().unwrap(), NavigationEvent::StateChanged);
        assert_eq!(second.try_recv().unwrap(), NavigationEvent::StateChanged);
        assert!(first.try_recv().is_err());
    }
}

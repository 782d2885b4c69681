//! Synchronous change-notification hub.
//!
//! Handlers run on the publishing call, in subscription order. The handler
//! list is copied out of the lock before dispatch, so a handler may
//! subscribe or unsubscribe on the same bus.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::events::{EventCategory, SceneEvent};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a subscriber receives.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events in any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &SceneEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(&SceneEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every matching subscriber.
    ///
    /// Returns the number of handlers that ran.
    pub fn publish(&self, event: SceneEvent) -> usize {
        let targets: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        tracing::trace!("Publishing {} to {} handler(s)", event.description(), targets.len());
        for handler in &targets {
            handler(&event);
        }
        targets.len()
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn log(bus: &EventBus, filter: EventFilter) -> Arc<Mutex<Vec<SceneEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        bus.subscribe(filter, move |e| sink.lock().push(e.clone()));
        events
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let entities = log(&bus, EventFilter::Categories(vec![EventCategory::Entity]));
        let everything = log(&bus, EventFilter::All);

        bus.publish(SceneEvent::EntityAdded {
            id: 1,
            kind: "circle".to_string(),
        });
        assert_eq!(bus.publish(SceneEvent::SelectionChanged { selected: vec![1] }), 1);

        assert_eq!(entities.lock().len(), 1);
        assert_eq!(everything.lock().len(), 2);
    }

    #[test]
    fn test_delivery_follows_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(EventFilter::All, move |_| order.lock().push(tag));
        }
        bus.publish(SceneEvent::EntityRemoved { id: 7 });
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = bus.subscribe(EventFilter::All, move |e| sink.lock().push(e.clone()));

        bus.publish(SceneEvent::EntityRemoved { id: 1 });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(SceneEvent::EntityRemoved { id: 2 }), 0);
        assert_eq!(*events.lock(), vec![SceneEvent::EntityRemoved { id: 1 }]);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let inner_bus = Arc::clone(&bus);
        let inner_slot = Arc::clone(&slot);
        let id = bus.subscribe(EventFilter::All, move |_| {
            if let Some(id) = inner_slot.lock().take() {
                inner_bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        assert_eq!(bus.publish(SceneEvent::EntityRemoved { id: 1 }), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}

//! # Event Bus Module
//!
//! Structural change notifications (entities, connections, connectors,
//! selection) for hosts and debugging tools that walk the scene graph.
//!
//! ## Usage
//!
//! ```rust
//! use scenekit_core::event_bus::{EventBus, EventCategory, EventFilter, SceneEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Connection]),
//!     |event| {
//!         if let SceneEvent::ConnectionAdded { from_node, to_node, .. } = event {
//!             println!("{} -> {}", from_node, to_node);
//!         }
//!     },
//! );
//!
//! bus.publish(SceneEvent::ConnectionAdded { id: 3, from_node: 1, to_node: 2 });
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;

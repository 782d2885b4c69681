//! Event type definitions for the event bus.
//!
//! Structural scene changes only. Per-move geometry updates are not events;
//! hosts read the live entity list after each pointer call.

use serde::{Deserialize, Serialize};

use crate::error::ConnectorKind;
use crate::EntityId;

/// Root event enum for all scene change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// An entity joined the registry
    EntityAdded {
        /// New id.
        id: EntityId,
        /// Shape type name, e.g. `"rectangle"`.
        kind: String,
    },
    /// An entity left the registry
    EntityRemoved {
        /// Removed id.
        id: EntityId,
    },
    /// A connection was created between two nodes
    ConnectionAdded {
        /// Connection id.
        id: EntityId,
        /// Output-side node.
        from_node: EntityId,
        /// Input-side node.
        to_node: EntityId,
    },
    /// A connection was deleted
    ConnectionRemoved {
        /// Connection id.
        id: EntityId,
    },
    /// A node gained or lost a connector
    ConnectorCountChanged {
        /// Node id.
        node: EntityId,
        /// Which side changed.
        kind: ConnectorKind,
        /// New connector count on that side.
        count: usize,
    },
    /// The selection list was replaced or edited
    SelectionChanged {
        /// Selected ids in selection order.
        selected: Vec<EntityId>,
    },
}

impl SceneEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SceneEvent::EntityAdded { .. } | SceneEvent::EntityRemoved { .. } => {
                EventCategory::Entity
            }
            SceneEvent::ConnectionAdded { .. } | SceneEvent::ConnectionRemoved { .. } => {
                EventCategory::Connection
            }
            SceneEvent::ConnectorCountChanged { .. } => EventCategory::Node,
            SceneEvent::SelectionChanged { .. } => EventCategory::Selection,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SceneEvent::EntityAdded { id, kind } => format!("Added {} {}", kind, id),
            SceneEvent::EntityRemoved { id } => format!("Removed entity {}", id),
            SceneEvent::ConnectionAdded {
                id,
                from_node,
                to_node,
            } => format!("Connected {} -> {} ({})", from_node, to_node, id),
            SceneEvent::ConnectionRemoved { id } => format!("Disconnected {}", id),
            SceneEvent::ConnectorCountChanged { node, kind, count } => {
                format!("Node {} now has {} {} connectors", node, count, kind)
            }
            SceneEvent::SelectionChanged { selected } => {
                format!("Selection: {} item(s)", selected.len())
            }
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Entity add/remove.
    Entity,
    /// Connection add/remove.
    Connection,
    /// Node connector layout.
    Node,
    /// Selection membership.
    Selection,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Entity => write!(f, "Entity"),
            EventCategory::Connection => write!(f, "Connection"),
            EventCategory::Node => write!(f, "Node"),
            EventCategory::Selection => write!(f, "Selection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            SceneEvent::EntityRemoved { id: 1 }.category(),
            EventCategory::Entity
        );
        assert_eq!(
            SceneEvent::ConnectorCountChanged {
                node: 1,
                kind: ConnectorKind::Input,
                count: 2
            }
            .category(),
            EventCategory::Node
        );
        assert_eq!(
            SceneEvent::SelectionChanged { selected: vec![] }.category(),
            EventCategory::Selection
        );
    }

    #[test]
    fn test_description() {
        let event = SceneEvent::ConnectionAdded {
            id: 9,
            from_node: 1,
            to_node: 2,
        };
        assert_eq!(event.description(), "Connected 1 -> 2 (9)");
    }

    #[test]
    fn test_serialization() {
        let event = SceneEvent::EntityAdded {
            id: 4,
            kind: "circle".to_string(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: SceneEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}

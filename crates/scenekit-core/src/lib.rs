//! # SceneKit Core
//!
//! Shared foundations for the SceneKit editor engine: the geometry kernel,
//! the error types and the change-notification event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;

/// Registry-allocated entity identifier.
pub type EntityId = u64;

pub use error::{ConnectorKind, Result, SceneError};

pub use event_bus::{
    EventBus, EventCategory, EventFilter, SceneEvent, SubscriptionId,
};

pub use geometry::{
    corner_positions, distance, opposite_corner, rotate_point, rotate_point_deg, BoundingBox,
    Corner, Point,
};

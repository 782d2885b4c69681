//! Bezier routing between node connectors.
//!
//! Default control points extend each connector's outward normal by
//! `max(min_handle_length, ratio * endpoint_distance)`. A manual control
//! offset replaces the matching default and is stored relative to its live
//! endpoint, so it follows the node around.

use scenekit_core::{ConnectorKind, EntityId, Point};
use scenekit_settings::RoutingSettings;

use crate::model::{ConnectionRoute, SceneConnection, SceneNode, Shape};
use crate::registry::ElementRegistry;

pub fn handle_length(start: Point, end: Point, settings: &RoutingSettings) -> f64 {
    settings
        .min_handle_length
        .max(start.distance_to(&end) * settings.handle_length_ratio)
}

pub fn compute_route(
    from: &SceneNode,
    to: &SceneNode,
    connection: &SceneConnection,
    settings: &RoutingSettings,
) -> ConnectionRoute {
    let start = from.connector_position(ConnectorKind::Output, connection.from_index);
    let end = to.connector_position(ConnectorKind::Input, connection.to_index);
    let len = handle_length(start, end, settings);

    let control1 = match connection.control_offset1 {
        Some(offset) => start + offset,
        None => start + from.connector_normal(ConnectorKind::Output) * len,
    };
    let control2 = match connection.control_offset2 {
        Some(offset) => end + offset,
        None => end + to.connector_normal(ConnectorKind::Input) * len,
    };

    ConnectionRoute {
        start,
        control1,
        control2,
        end,
    }
}

/// Route for a connection being dragged out of a connector. The free end's
/// normal points back toward the start.
pub fn preview_route(
    start: Point,
    start_normal: Point,
    end: Point,
    settings: &RoutingSettings,
) -> ConnectionRoute {
    let len = handle_length(start, end, settings);
    let to_start = start - end;
    let to_start_len = to_start.x.hypot(to_start.y);
    let to_start_len = if to_start_len == 0.0 { 1.0 } else { to_start_len };
    let end_normal = to_start * (1.0 / to_start_len);

    ConnectionRoute {
        start,
        control1: start + start_normal * len,
        control2: end + end_normal * len,
        end,
    }
}

/// Recompute one connection's route from its nodes.
///
/// Returns false when `id` is not a connection or an endpoint node is gone.
pub fn refresh_connection(
    registry: &mut ElementRegistry,
    id: EntityId,
    settings: &RoutingSettings,
) -> bool {
    let route = {
        let Some(conn) = registry.get(id).and_then(|o| o.shape.as_connection()) else {
            return false;
        };
        let (Ok(from), Ok(to)) = (registry.node(conn.from_node), registry.node(conn.to_node))
        else {
            tracing::warn!("Connection {} has a dangling endpoint", id);
            return false;
        };
        compute_route(from, to, conn, settings)
    };

    if let Some(Shape::Connection(conn)) = registry.get_mut(id).map(|o| &mut o.shape) {
        conn.route = Some(route);
    }
    true
}

/// Re-route every connection attached to any of `nodes`.
pub fn refresh_routes_for_nodes(
    registry: &mut ElementRegistry,
    nodes: &[EntityId],
    settings: &RoutingSettings,
) {
    for id in registry.connections_of(nodes) {
        refresh_connection(registry, id, settings);
    }
}

pub fn refresh_all_routes(registry: &mut ElementRegistry, settings: &RoutingSettings) {
    let ids: Vec<EntityId> = registry
        .iter()
        .filter(|o| o.shape.is_connection())
        .map(|o| o.id)
        .collect();
    for id in ids {
        refresh_connection(registry, id, settings);
    }
}

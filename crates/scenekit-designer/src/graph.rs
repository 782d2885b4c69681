//! Structural edits of the node graph: connections, connectors and
//! cascading deletion.

use scenekit_core::{ConnectorKind, EntityId, Result, SceneError};
use scenekit_settings::RoutingSettings;

use crate::model::{SceneConnection, Shape};
use crate::registry::ElementRegistry;
use crate::routing;

/// One connector on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorRef {
    pub node: EntityId,
    pub kind: ConnectorKind,
    pub index: usize,
}

impl ConnectorRef {
    pub fn new(node: EntityId, kind: ConnectorKind, index: usize) -> Self {
        Self { node, kind, index }
    }
}

/// Fails unless `c` names an existing connector on an existing node.
pub fn check_connector(registry: &ElementRegistry, c: ConnectorRef) -> Result<()> {
    let count = registry.node(c.node)?.connector_count(c.kind);
    if c.index >= count {
        return Err(SceneError::ConnectorOutOfRange {
            node: c.node,
            kind: c.kind,
            index: c.index,
            count,
        });
    }
    Ok(())
}

/// Join two connectors. Order does not matter; the output side becomes
/// `from`.
pub fn connect(
    registry: &mut ElementRegistry,
    a: ConnectorRef,
    b: ConnectorRef,
    settings: &RoutingSettings,
) -> Result<EntityId> {
    let connection = match (a.kind, b.kind) {
        (ConnectorKind::Output, ConnectorKind::Input) => {
            SceneConnection::new(a.node, a.index, b.node, b.index)
        }
        (ConnectorKind::Input, ConnectorKind::Output) => {
            SceneConnection::new(b.node, b.index, a.node, a.index)
        }
        (from, to) => return Err(SceneError::IncompatibleConnectors { from, to }),
    };
    if a.node == b.node {
        return Err(SceneError::SelfConnection { node: a.node });
    }
    check_connector(registry, a)?;
    check_connector(registry, b)?;

    add_connection(registry, connection, settings)
}

/// Insert a prepared connection, register it on both nodes and route it.
pub fn add_connection(
    registry: &mut ElementRegistry,
    connection: SceneConnection,
    settings: &RoutingSettings,
) -> Result<EntityId> {
    let (from, to) = (connection.from_node, connection.to_node);
    if from == to {
        return Err(SceneError::SelfConnection { node: from });
    }
    registry.node(from)?;
    registry.node(to)?;

    let id = registry.add(Shape::Connection(connection));
    registry.node_mut(from)?.register_connection(id);
    registry.node_mut(to)?.register_connection(id);
    routing::refresh_connection(registry, id, settings);

    tracing::info!("Connected node {} -> node {} as {}", from, to, id);
    Ok(id)
}

/// Remove a connection and detach it from its nodes.
pub fn disconnect(registry: &mut ElementRegistry, id: EntityId) -> Result<SceneConnection> {
    let obj = registry.get(id).ok_or(SceneError::EntityNotFound { id })?;
    if !obj.shape.is_connection() {
        return Err(SceneError::other(format!("Entity {} is not a connection", id)));
    }
    let Some(obj) = registry.remove(id) else {
        return Err(SceneError::EntityNotFound { id });
    };
    let Shape::Connection(conn) = obj.shape else {
        return Err(SceneError::other(format!("Entity {} is not a connection", id)));
    };
    for node in [conn.from_node, conn.to_node] {
        if let Ok(n) = registry.node_mut(node) {
            n.unregister_connection(id);
        }
    }
    Ok(conn)
}

/// Delete an entity. Deleting a node cascades to its connections.
///
/// Returns every removed id, cascaded connections first.
pub fn delete_entity(registry: &mut ElementRegistry, id: EntityId) -> Result<Vec<EntityId>> {
    let (is_connection, attached) = match registry.shape(id)? {
        Shape::Connection(_) => (true, Vec::new()),
        Shape::Node(node) => (false, node.connections.clone()),
        _ => (false, Vec::new()),
    };
    let mut removed = Vec::new();

    if is_connection {
        disconnect(registry, id)?;
        removed.push(id);
        return Ok(removed);
    }
    for conn in attached {
        if disconnect(registry, conn).is_ok() {
            removed.push(conn);
        }
    }

    registry.remove(id);
    removed.push(id);
    tracing::info!("Deleted entity {} ({} removed in total)", id, removed.len());
    Ok(removed)
}

/// Append a connector to one side of a node and re-route its connections.
///
/// Returns the new connector count on that side.
pub fn add_connector(
    registry: &mut ElementRegistry,
    node: EntityId,
    kind: ConnectorKind,
    settings: &RoutingSettings,
) -> Result<usize> {
    let n = registry.node_mut(node)?;
    let count = n.connector_count_mut(kind);
    *count += 1;
    let count = *count;
    routing::refresh_routes_for_nodes(registry, &[node], settings);
    tracing::debug!("Node {} now has {} {} connectors", node, count, kind);
    Ok(count)
}

/// Remove one connector. Connections on it are deleted; connections on later
/// connectors of the same side shift their index down by one.
///
/// Returns the ids of the deleted connections.
pub fn remove_connector(
    registry: &mut ElementRegistry,
    connector: ConnectorRef,
    settings: &RoutingSettings,
) -> Result<Vec<EntityId>> {
    check_connector(registry, connector)?;
    let ConnectorRef { node, kind, index } = connector;

    let attached = registry.node(node)?.connections.clone();
    let mut doomed = Vec::new();
    for id in attached {
        let Some(Shape::Connection(conn)) = registry.get_mut(id).map(|o| &mut o.shape) else {
            continue;
        };
        let slot = match kind {
            ConnectorKind::Input if conn.to_node == node => &mut conn.to_index,
            ConnectorKind::Output if conn.from_node == node => &mut conn.from_index,
            _ => continue,
        };
        if *slot == index {
            doomed.push(id);
        } else if *slot > index {
            *slot -= 1;
        }
    }

    for id in &doomed {
        disconnect(registry, *id)?;
    }

    let count = registry.node_mut(node)?.connector_count_mut(kind);
    *count = count.saturating_sub(1);

    routing::refresh_routes_for_nodes(registry, &[node], settings);
    tracing::info!(
        "Removed {} connector {} from node {} ({} connections dropped)",
        kind,
        index,
        node,
        doomed.len()
    );
    Ok(doomed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SceneNode;
    use scenekit_core::Point;

    fn two_nodes(registry: &mut ElementRegistry) -> (EntityId, EntityId) {
        let a = registry.add(Shape::Node(SceneNode::new(Point::new(0.0, 0.0), 100.0, 60.0)));
        let b = registry.add(Shape::Node(SceneNode::new(Point::new(300.0, 0.0), 100.0, 60.0)));
        (a, b)
    }

    #[test]
    fn test_connect_orders_output_to_input() {
        let mut registry = ElementRegistry::new();
        let (a, b) = two_nodes(&mut registry);
        let s = RoutingSettings::default();

        let id = connect(
            &mut registry,
            ConnectorRef::new(b, ConnectorKind::Input, 0),
            ConnectorRef::new(a, ConnectorKind::Output, 0),
            &s,
        )
        .unwrap();

        let conn = registry.get(id).unwrap().shape.as_connection().unwrap();
        assert_eq!(conn.from_node, a);
        assert_eq!(conn.to_node, b);
        assert!(conn.route.is_some());
        assert_eq!(registry.node(a).unwrap().connections, vec![id]);
        assert_eq!(registry.node(b).unwrap().connections, vec![id]);
    }

    #[test]
    fn test_connect_rejections() {
        let mut registry = ElementRegistry::new();
        let (a, b) = two_nodes(&mut registry);
        let s = RoutingSettings::default();

        let same_kind = connect(
            &mut registry,
            ConnectorRef::new(a, ConnectorKind::Output, 0),
            ConnectorRef::new(b, ConnectorKind::Output, 0),
            &s,
        );
        assert!(matches!(same_kind, Err(SceneError::IncompatibleConnectors { .. })));

        let self_loop = connect(
            &mut registry,
            ConnectorRef::new(a, ConnectorKind::Output, 0),
            ConnectorRef::new(a, ConnectorKind::Input, 0),
            &s,
        );
        assert!(matches!(self_loop, Err(SceneError::SelfConnection { .. })));

        let out_of_range = connect(
            &mut registry,
            ConnectorRef::new(a, ConnectorKind::Output, 3),
            ConnectorRef::new(b, ConnectorKind::Input, 0),
            &s,
        );
        assert!(matches!(
            out_of_range,
            Err(SceneError::ConnectorOutOfRange { count: 1, .. })
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_delete_node_cascades() {
        let mut registry = ElementRegistry::new();
        let (a, b) = two_nodes(&mut registry);
        let s = RoutingSettings::default();
        let conn = connect(
            &mut registry,
            ConnectorRef::new(a, ConnectorKind::Output, 0),
            ConnectorRef::new(b, ConnectorKind::Input, 0),
            &s,
        )
        .unwrap();

        let removed = delete_entity(&mut registry, a).unwrap();
        assert_eq!(removed, vec![conn, a]);
        assert!(!registry.contains(conn));
        assert!(registry.node(b).unwrap().connections.is_empty());
    }

    #[test]
    fn test_add_connector() {
        let mut registry = ElementRegistry::new();
        let (a, _) = two_nodes(&mut registry);
        let count =
            add_connector(&mut registry, a, ConnectorKind::Input, &RoutingSettings::default())
                .unwrap();
        assert_eq!(count, 2);
        assert_eq!(registry.node(a).unwrap().input_count, 2);
    }
}

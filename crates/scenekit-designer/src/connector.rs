//! Connector gestures: drag out of a node connector to create a connection,
//! click a connector to select it, delete the selected connector.

use scenekit_core::{ConnectorKind, EntityId, Point, Result};
use scenekit_settings::RoutingSettings;

use crate::graph::{self, ConnectorRef};
use crate::model::ConnectionRoute;
use crate::registry::ElementRegistry;
use crate::routing;

/// Topmost connector within `tolerance` of its drawn circle.
pub fn connector_at(registry: &ElementRegistry, point: Point, tolerance: f64) -> Option<ConnectorRef> {
    registry.iter().rev().find_map(|obj| {
        let node = obj.shape.as_node()?;
        let reach = node.connector_radius + tolerance;
        [ConnectorKind::Input, ConnectorKind::Output]
            .into_iter()
            .flat_map(|kind| {
                node.connector_positions(kind)
                    .into_iter()
                    .enumerate()
                    .map(move |(index, p)| (kind, index, p))
            })
            .find(|(_, _, p)| p.distance_to(&point) <= reach)
            .map(|(kind, index, _)| ConnectorRef::new(obj.id, kind, index))
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConnectorGesture {
    #[default]
    Idle,
    /// Pressed on a connector; not yet past the drag threshold.
    Pending { connector: ConnectorRef, screen_start: Point },
    /// Dragging a new connection out of `connector`.
    Connecting {
        connector: ConnectorRef,
        preview: Option<ConnectionRoute>,
    },
}

/// What a pointer-up resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorOutcome {
    /// Not a connector gesture.
    Ignored,
    /// Click without movement; the connector is now selected.
    Selected(ConnectorRef),
    Connected(EntityId),
    /// Dropped somewhere that cannot take the connection.
    Discarded,
}

/// Result of deleting the selected connector.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedConnector {
    pub connector: ConnectorRef,
    pub removed_connections: Vec<EntityId>,
    pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct ConnectorController {
    state: ConnectorGesture,
    selected: Option<ConnectorRef>,
    threshold_px: f64,
}

impl Default for ConnectorController {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl ConnectorController {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            state: ConnectorGesture::Idle,
            selected: None,
            threshold_px,
        }
    }

    pub fn state(&self) -> &ConnectorGesture {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, ConnectorGesture::Idle)
    }

    pub fn selected(&self) -> Option<ConnectorRef> {
        self.selected
    }

    pub fn clear_selected(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Live preview of the connection being dragged.
    pub fn preview(&self) -> Option<&ConnectionRoute> {
        match &self.state {
            ConnectorGesture::Connecting { preview, .. } => preview.as_ref(),
            _ => None,
        }
    }

    /// Handles a press. Returns `true` if the press landed on a connector
    /// and is consumed.
    ///
    /// A press anywhere else drops the connector selection.
    pub fn pointer_down(&mut self, target: Option<ConnectorRef>, screen: Point) -> bool {
        let Some(connector) = target else {
            self.selected = None;
            return false;
        };
        if self.selected == Some(connector) {
            return true;
        }
        self.state = ConnectorGesture::Pending {
            connector,
            screen_start: screen,
        };
        true
    }

    /// Returns `true` while a connector gesture owns the pointer.
    pub fn pointer_move(
        &mut self,
        registry: &ElementRegistry,
        world: Point,
        screen: Point,
        settings: &RoutingSettings,
    ) -> bool {
        let connector = match &self.state {
            ConnectorGesture::Idle => return false,
            ConnectorGesture::Pending {
                connector,
                screen_start,
            } => {
                if screen.distance_to(screen_start) < self.threshold_px {
                    return true;
                }
                tracing::debug!("Connecting from {:?}", connector);
                *connector
            }
            ConnectorGesture::Connecting { connector, .. } => *connector,
        };

        let preview = registry.node(connector.node).ok().map(|node| {
            let start = node.connector_position(connector.kind, connector.index);
            routing::preview_route(start, node.connector_normal(connector.kind), world, settings)
        });
        self.state = ConnectorGesture::Connecting { connector, preview };
        true
    }

    pub fn pointer_up(
        &mut self,
        registry: &mut ElementRegistry,
        target: Option<ConnectorRef>,
        settings: &RoutingSettings,
    ) -> ConnectorOutcome {
        match std::mem::take(&mut self.state) {
            ConnectorGesture::Idle => ConnectorOutcome::Ignored,
            ConnectorGesture::Pending { connector, .. } => {
                self.selected = Some(connector);
                tracing::debug!("Selected connector {:?}", connector);
                ConnectorOutcome::Selected(connector)
            }
            ConnectorGesture::Connecting { connector, .. } => {
                let Some(end) = target.filter(|t| t.node != connector.node) else {
                    return ConnectorOutcome::Discarded;
                };
                if end.kind == connector.kind {
                    return ConnectorOutcome::Discarded;
                }
                match graph::connect(registry, connector, end, settings) {
                    Ok(id) => ConnectorOutcome::Connected(id),
                    Err(e) => {
                        tracing::warn!("Connection rejected: {}", e);
                        ConnectorOutcome::Discarded
                    }
                }
            }
        }
    }

    /// Removes the selected connector from its node. `Ok(None)` when no
    /// connector is selected.
    pub fn delete_selected(
        &mut self,
        registry: &mut ElementRegistry,
        settings: &RoutingSettings,
    ) -> Result<Option<RemovedConnector>> {
        let Some(connector) = self.selected.take() else {
            return Ok(None);
        };
        let removed_connections = graph::remove_connector(registry, connector, settings)?;
        let remaining = registry.node(connector.node)?.connector_count(connector.kind);
        Ok(Some(RemovedConnector {
            connector,
            removed_connections,
            remaining,
        }))
    }

    /// Abandons any gesture in progress.
    pub fn cancel(&mut self) {
        self.state = ConnectorGesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SceneNode, Shape};

    fn two_nodes() -> (ElementRegistry, EntityId, EntityId) {
        let mut registry = ElementRegistry::new();
        let a = registry.add(Shape::Node(SceneNode::new(Point::new(0.0, 0.0), 100.0, 60.0)));
        let b = registry.add(Shape::Node(SceneNode::new(Point::new(300.0, 0.0), 100.0, 60.0)));
        (registry, a, b)
    }

    #[test]
    fn test_connector_at() {
        let (registry, a, b) = two_nodes();
        assert_eq!(
            connector_at(&registry, Point::new(51.0, 0.0), 0.0),
            Some(ConnectorRef::new(a, ConnectorKind::Output, 0))
        );
        assert_eq!(
            connector_at(&registry, Point::new(250.0, 3.0), 0.0),
            Some(ConnectorRef::new(b, ConnectorKind::Input, 0))
        );
        assert_eq!(connector_at(&registry, Point::new(0.0, 0.0), 0.0), None);
    }

    #[test]
    fn test_drag_creates_connection() {
        let (mut registry, a, b) = two_nodes();
        let settings = RoutingSettings::default();
        let mut controller = ConnectorController::default();
        let start = ConnectorRef::new(a, ConnectorKind::Output, 0);

        assert!(controller.pointer_down(Some(start), Point::new(0.0, 0.0)));
        controller.pointer_move(&registry, Point::new(52.0, 1.0), Point::new(2.0, 1.0), &settings);
        assert!(controller.preview().is_none());

        controller.pointer_move(&registry, Point::new(150.0, 0.0), Point::new(100.0, 0.0), &settings);
        let preview = controller.preview().unwrap();
        assert_eq!(preview.start, Point::new(50.0, 0.0));
        assert_eq!(preview.end, Point::new(150.0, 0.0));

        let outcome = controller.pointer_up(
            &mut registry,
            Some(ConnectorRef::new(b, ConnectorKind::Input, 0)),
            &settings,
        );
        let ConnectorOutcome::Connected(id) = outcome else {
            panic!("expected a connection, got {:?}", outcome);
        };
        let conn = registry.get(id).unwrap().shape.as_connection().unwrap();
        assert_eq!((conn.from_node, conn.to_node), (a, b));
        assert!(!controller.is_active());
    }

    #[test]
    fn test_same_kind_or_same_node_discarded() {
        let (mut registry, a, b) = two_nodes();
        let settings = RoutingSettings::default();
        let mut controller = ConnectorController::default();

        for target in [
            ConnectorRef::new(b, ConnectorKind::Output, 0),
            ConnectorRef::new(a, ConnectorKind::Input, 0),
        ] {
            controller.pointer_down(
                Some(ConnectorRef::new(a, ConnectorKind::Output, 0)),
                Point::new(0.0, 0.0),
            );
            controller.pointer_move(&registry, Point::new(200.0, 0.0), Point::new(50.0, 0.0), &settings);
            assert_eq!(
                controller.pointer_up(&mut registry, Some(target), &settings),
                ConnectorOutcome::Discarded
            );
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_click_selects_then_press_is_consumed() {
        let (mut registry, a, _) = two_nodes();
        let settings = RoutingSettings::default();
        let mut controller = ConnectorController::default();
        let c = ConnectorRef::new(a, ConnectorKind::Input, 0);

        controller.pointer_down(Some(c), Point::new(0.0, 0.0));
        assert_eq!(
            controller.pointer_up(&mut registry, Some(c), &settings),
            ConnectorOutcome::Selected(c)
        );
        assert_eq!(controller.selected(), Some(c));

        // Pressing the selected connector starts nothing.
        assert!(controller.pointer_down(Some(c), Point::new(0.0, 0.0)));
        assert!(!controller.is_active());

        // Pressing elsewhere drops the selection.
        assert!(!controller.pointer_down(None, Point::new(0.0, 0.0)));
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn test_delete_selected_connector() {
        let (mut registry, a, _) = two_nodes();
        let settings = RoutingSettings::default();
        graph::add_connector(&mut registry, a, ConnectorKind::Input, &settings).unwrap();
        let mut controller = ConnectorController::default();
        let c = ConnectorRef::new(a, ConnectorKind::Input, 1);
        controller.pointer_down(Some(c), Point::new(0.0, 0.0));
        controller.pointer_up(&mut registry, Some(c), &settings);

        let removed = controller.delete_selected(&mut registry, &settings).unwrap().unwrap();
        assert_eq!(removed.remaining, 1);
        assert!(removed.removed_connections.is_empty());
        assert_eq!(controller.delete_selected(&mut registry, &settings).unwrap(), None);
    }
}

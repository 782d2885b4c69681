//! The editor facade a host drives.
//!
//! `Workbench` owns the scene and every controller, routes pointer and key
//! events to them, keeps the handle layout current and publishes structural
//! changes on its event bus.

use scenekit_core::{
    BoundingBox, ConnectorKind, EntityId, EventBus, EventFilter, Point, Result, SceneError,
    SceneEvent, SubscriptionId,
};
use scenekit_settings::EditorConfig;

use crate::clipboard::Clipboard;
use crate::connector::{self, ConnectorController, ConnectorOutcome, RemovedConnector};
use crate::factory::{EntityDescriptor, EntityFactory};
use crate::graph::{self, ConnectorRef};
use crate::handles::{self, HandleLayout};
use crate::input::{KeyEvent, PointerEvent};
use crate::marquee::MarqueeSelection;
use crate::model::{ConnectionRoute, SceneObject, Shape, ShapeType, TextExtent};
use crate::registry::ElementRegistry;
use crate::selection::SelectionService;
use crate::transform::{Gesture, TransformController};

/// Which controller received the current press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PointerOwner {
    #[default]
    None,
    Connector,
    Transform,
    Marquee,
}

#[derive(Debug)]
pub struct Workbench {
    registry: ElementRegistry,
    selection: SelectionService,
    transform: TransformController,
    connectors: ConnectorController,
    marquee: MarqueeSelection,
    clipboard: Clipboard,
    factory: EntityFactory,
    config: EditorConfig,
    bus: EventBus,
    handles: HandleLayout,
    last_pointer: Option<Point>,
    owner: PointerOwner,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Workbench {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            registry: ElementRegistry::new(),
            selection: SelectionService::new(),
            transform: TransformController::new(config.gestures.clone()),
            connectors: ConnectorController::new(config.gestures.connect_threshold_px),
            marquee: MarqueeSelection::new(config.gestures.marquee_threshold_px),
            clipboard: Clipboard::new(config.clipboard.paste_step),
            factory: EntityFactory::new(config.node.clone(), config.text.clone()),
            config,
            bus: EventBus::new(),
            handles: HandleLayout::empty(),
            last_pointer: None,
            owner: PointerOwner::None,
        }
    }

    // ---- read side ----

    /// Live entities in draw order.
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = &SceneObject> {
        self.registry.iter()
    }

    pub fn entity(&self, id: EntityId) -> Option<&SceneObject> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[EntityId] {
        self.selection.selected()
    }

    pub fn selection_service(&self) -> &SelectionService {
        &self.selection
    }

    pub fn handles(&self) -> &HandleLayout {
        &self.handles
    }

    pub fn group_rotation(&self) -> f64 {
        self.selection.group_rotation()
    }

    pub fn group_pivot(&self) -> Option<Point> {
        self.selection.group_pivot()
    }

    pub fn marquee_rect(&self) -> Option<BoundingBox> {
        self.marquee.rect()
    }

    pub fn connection_preview(&self) -> Option<&ConnectionRoute> {
        self.connectors.preview()
    }

    pub fn selected_connector(&self) -> Option<ConnectorRef> {
        self.connectors.selected()
    }

    pub fn gesture(&self) -> &Gesture {
        self.transform.gesture()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Registers a listener for structural changes made through this
    /// workbench.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ---- commands ----

    /// Adds an entity built from a descriptor.
    pub fn add_entity(&mut self, descriptor: &EntityDescriptor) -> EntityId {
        let shape = self.factory.from_descriptor(descriptor);
        self.insert_shape(shape)
    }

    /// Adds a default-sized entity of `kind` centred at `at`. Returns `None`
    /// for connections, which are made with [`Workbench::connect`].
    pub fn create(&mut self, kind: ShapeType, at: Point) -> Option<EntityId> {
        let shape = self.factory.create(kind, at)?;
        Some(self.insert_shape(shape))
    }

    fn insert_shape(&mut self, shape: Shape) -> EntityId {
        let kind = shape.shape_type();
        let id = self.registry.add(shape);
        tracing::info!("Added {} {}", kind, id);
        self.bus.publish(SceneEvent::EntityAdded {
            id,
            kind: kind.name().to_string(),
        });
        id
    }

    /// Records the renderer's measurement of a text entity.
    pub fn set_text_extent(&mut self, id: EntityId, extent: TextExtent) -> Result<()> {
        match &mut self.registry.get_mut(id).ok_or(SceneError::EntityNotFound { id })?.shape {
            Shape::Text(text) => text.measured = Some(extent),
            _ => return Err(SceneError::other(format!("Entity {} is not text", id))),
        }
        self.refresh_handles();
        Ok(())
    }

    pub fn set_label(&mut self, node: EntityId, label: impl Into<String>) -> Result<()> {
        self.registry.node_mut(node)?.label = label.into();
        Ok(())
    }

    pub fn connect(&mut self, a: ConnectorRef, b: ConnectorRef) -> Result<EntityId> {
        let id = graph::connect(&mut self.registry, a, b, &self.config.routing)?;
        self.publish_connection_added(id);
        Ok(id)
    }

    /// Appends a connector to one side of a node. Returns the new count.
    pub fn add_connector(&mut self, node: EntityId, kind: ConnectorKind) -> Result<usize> {
        let count = graph::add_connector(&mut self.registry, node, kind, &self.config.routing)?;
        self.bus
            .publish(SceneEvent::ConnectorCountChanged { node, kind, count });
        Ok(count)
    }

    /// Removes one connector, deleting the connections attached to it.
    pub fn remove_connector(&mut self, connector: ConnectorRef) -> Result<Vec<EntityId>> {
        let before = self.selection.selected().to_vec();
        let removed = graph::remove_connector(&mut self.registry, connector, &self.config.routing)?;
        let count = self.registry.node(connector.node)?.connector_count(connector.kind);
        if self.connectors.selected() == Some(connector) {
            self.connectors.clear_selected();
        }
        self.publish_removed_connector(&RemovedConnector {
            connector,
            removed_connections: removed.clone(),
            remaining: count,
        });
        self.selection.prune(&mut self.registry);
        self.after_change(&before);
        Ok(removed)
    }

    /// Deletes one entity. Deleting a node also deletes its connections.
    pub fn delete(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        let before = self.selection.selected().to_vec();
        let removed = self.delete_one(id)?;
        self.selection.prune(&mut self.registry);
        self.after_change(&before);
        Ok(removed)
    }

    /// Deletes the selected connector if there is one, otherwise every
    /// selected entity. Returns `true` if anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        let before = self.selection.selected().to_vec();
        if self.connectors.selected().is_some() {
            return match self
                .connectors
                .delete_selected(&mut self.registry, &self.config.routing)
            {
                Ok(Some(removed)) => {
                    self.publish_removed_connector(&removed);
                    self.selection.prune(&mut self.registry);
                    self.after_change(&before);
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!("Failed to remove connector: {}", e);
                    false
                }
            };
        }

        let mut any = false;
        for id in before.iter().copied() {
            // Cascades can take a selected connection along with its node.
            if !self.registry.contains(id) {
                continue;
            }
            match self.delete_one(id) {
                Ok(_) => any = true,
                Err(e) => tracing::warn!("Failed to delete {}: {}", id, e),
            }
        }
        self.selection.prune(&mut self.registry);
        self.after_change(&before);
        any
    }

    fn delete_one(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        let is_connection = self.registry.shape(id)?.is_connection();
        let removed = graph::delete_entity(&mut self.registry, id)?;
        for removed_id in &removed {
            let event = if *removed_id == id && !is_connection {
                SceneEvent::EntityRemoved { id }
            } else {
                SceneEvent::ConnectionRemoved { id: *removed_id }
            };
            self.bus.publish(event);
        }
        Ok(removed)
    }

    pub fn select(&mut self, id: EntityId, additive: bool) -> bool {
        let before = self.selection.selected().to_vec();
        let changed = self.selection.select(&mut self.registry, id, additive);
        self.after_change(&before);
        changed
    }

    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        let before = self.selection.selected().to_vec();
        self.selection.set_selection(&mut self.registry, ids);
        self.after_change(&before);
    }

    pub fn deselect_all(&mut self) -> bool {
        let before = self.selection.selected().to_vec();
        let changed = self.selection.deselect_all(&mut self.registry);
        self.after_change(&before);
        changed
    }

    /// Copies the selection. Returns the number of entities captured.
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.registry, &self.selection)
    }

    /// Pastes the clipboard, centred on the last known pointer position or
    /// stacked diagonally when there is none.
    pub fn paste(&mut self) -> Result<Vec<EntityId>> {
        let before = self.selection.selected().to_vec();
        let pasted = self.clipboard.paste(
            &mut self.registry,
            &mut self.selection,
            &self.factory,
            self.last_pointer,
            &self.config.routing,
        )?;
        for id in &pasted {
            match self.registry.get(*id).map(|o| &o.shape) {
                Some(Shape::Connection(_)) => self.publish_connection_added(*id),
                Some(shape) => {
                    self.bus.publish(SceneEvent::EntityAdded {
                        id: *id,
                        kind: shape.shape_type().name().to_string(),
                    });
                }
                None => {}
            }
        }
        self.after_change(&before);
        Ok(pasted)
    }

    /// The clipboard payload as JSON, for the system clipboard.
    pub fn clipboard_json(&self) -> Result<String> {
        self.clipboard.to_json()
    }

    pub fn load_clipboard_json(&mut self, json: &str) -> Result<()> {
        self.clipboard.load_json(json)
    }

    // ---- input ----

    /// Handles a press. Routing order: connector, handle, entity body, then
    /// empty canvas. Returns `true` if a controller took the pointer.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        self.last_pointer = Some(event.world);
        if !event.is_primary() {
            return false;
        }
        let before = self.selection.selected().to_vec();
        let tolerance = self.config.handles.hit_tolerance;
        let world = event.world;

        let target = connector::connector_at(&self.registry, world, tolerance);
        self.owner = if self.connectors.pointer_down(target, event.screen) {
            PointerOwner::Connector
        } else if self.begin_handle_gesture(world, tolerance) {
            PointerOwner::Transform
        } else if let Some(id) = self.registry.entity_at(world, tolerance) {
            if !self.selection.is_selected(id) {
                self.selection
                    .select(&mut self.registry, id, event.modifiers.shift);
            }
            if self.transform.begin_drag(&self.selection, world) {
                PointerOwner::Transform
            } else {
                PointerOwner::None
            }
        } else {
            self.marquee
                .begin(&self.selection, world, event.screen, event.modifiers.shift);
            PointerOwner::Marquee
        };
        tracing::debug!("Pointer down at {:?} routed to {:?}", world, self.owner);

        self.after_change(&before);
        self.owner != PointerOwner::None
    }

    fn begin_handle_gesture(&mut self, world: Point, tolerance: f64) -> bool {
        let Some(descriptor) = self.handles.hit_test(world, tolerance) else {
            return false;
        };
        self.transform
            .begin_handle(&self.registry, &self.selection, descriptor, world)
    }

    /// Forwards a move to whichever controller owns the pointer. Returns
    /// `true` if it was consumed.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        self.last_pointer = Some(event.world);
        let before = self.selection.selected().to_vec();
        let consumed = match self.owner {
            PointerOwner::None => false,
            PointerOwner::Connector => self.connectors.pointer_move(
                &self.registry,
                event.world,
                event.screen,
                &self.config.routing,
            ),
            PointerOwner::Transform => self.transform.update(
                &mut self.registry,
                &mut self.selection,
                event.world,
                &self.config.routing,
            ),
            PointerOwner::Marquee => self.marquee.update(
                &mut self.registry,
                &mut self.selection,
                event.world,
                event.screen,
            ),
        };
        if consumed {
            self.after_change(&before);
        }
        consumed
    }

    /// Ends the gesture in progress. Returns `true` if one was.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        self.last_pointer = Some(event.world);
        let before = self.selection.selected().to_vec();
        let consumed = match std::mem::take(&mut self.owner) {
            PointerOwner::None => false,
            PointerOwner::Connector => {
                let tolerance = self.config.handles.hit_tolerance;
                let target = connector::connector_at(&self.registry, event.world, tolerance);
                match self
                    .connectors
                    .pointer_up(&mut self.registry, target, &self.config.routing)
                {
                    ConnectorOutcome::Selected(_) => {
                        self.selection.deselect_all(&mut self.registry);
                    }
                    ConnectorOutcome::Connected(id) => self.publish_connection_added(id),
                    ConnectorOutcome::Ignored | ConnectorOutcome::Discarded => {}
                }
                true
            }
            PointerOwner::Transform => self.transform.end(),
            PointerOwner::Marquee => self.marquee.finish(&mut self.registry, &mut self.selection),
        };
        self.after_change(&before);
        consumed
    }

    /// Handles a key press. Returns `true` if it triggered a command.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        if event.text_input_focused {
            return false;
        }
        if event.modifiers.command() && event.is("c") {
            self.copy();
            return true;
        }
        if event.modifiers.command() && event.is("v") {
            return match self.paste() {
                Ok(pasted) => !pasted.is_empty(),
                Err(e) => {
                    tracing::warn!("Paste failed: {}", e);
                    false
                }
            };
        }
        if event.is_delete() {
            return self.delete_selected();
        }
        false
    }

    // ---- bookkeeping ----

    fn refresh_handles(&mut self) {
        self.handles =
            handles::layout_for_selection(&self.registry, &self.selection, &self.config.handles);
    }

    fn after_change(&mut self, before: &[EntityId]) {
        self.refresh_handles();
        if self.selection.selected() != before {
            self.bus.publish(SceneEvent::SelectionChanged {
                selected: self.selection.selected().to_vec(),
            });
        }
    }

    fn publish_connection_added(&self, id: EntityId) {
        if let Some(conn) = self.registry.get(id).and_then(|o| o.shape.as_connection()) {
            self.bus.publish(SceneEvent::ConnectionAdded {
                id,
                from_node: conn.from_node,
                to_node: conn.to_node,
            });
        }
    }

    fn publish_removed_connector(&self, removed: &RemovedConnector) {
        for id in &removed.removed_connections {
            self.bus.publish(SceneEvent::ConnectionRemoved { id: *id });
        }
        self.bus.publish(SceneEvent::ConnectorCountChanged {
            node: removed.connector.node,
            kind: removed.connector.kind,
            count: removed.remaining,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::model::SceneShape;
    use scenekit_core::{EventCategory, EventFilter};
    use std::sync::{Arc, Mutex};

    fn recorder(bench: &Workbench) -> Arc<Mutex<Vec<SceneEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        bench.subscribe(EventFilter::All, move |e| {
            sink.lock().unwrap().push(e.clone());
        });
        events
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut bench = Workbench::default();
        let id = bench.create(ShapeType::Rectangle, Point::new(100.0, 100.0)).unwrap();

        assert!(bench.pointer_down(&PointerEvent::at(100.0, 100.0)));
        assert_eq!(bench.selection(), &[id]);
        assert!(!bench.handles().is_empty());

        bench.pointer_move(&PointerEvent::at(110.0, 105.0));
        bench.pointer_up(&PointerEvent::at(110.0, 105.0));
        assert_eq!(bench.entity(id).unwrap().shape.position(), Point::new(110.0, 105.0));
        assert!(matches!(bench.gesture(), Gesture::Idle));
    }

    #[test]
    fn test_empty_click_clears_selection() {
        let mut bench = Workbench::default();
        let id = bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        bench.select(id, false);

        bench.pointer_down(&PointerEvent::at(500.0, 500.0));
        bench.pointer_up(&PointerEvent::at(500.0, 500.0));
        assert!(bench.selection().is_empty());
        assert!(bench.handles().is_empty());
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut bench = Workbench::default();
        bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        let event =
            PointerEvent::at(0.0, 0.0).with_button(crate::input::PointerButton::Secondary);
        assert!(!bench.pointer_down(&event));
        assert!(bench.selection().is_empty());
    }

    #[test]
    fn test_shift_click_extends_selection() {
        let mut bench = Workbench::default();
        let a = bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        let b = bench.create(ShapeType::Circle, Point::new(200.0, 0.0)).unwrap();

        bench.pointer_down(&PointerEvent::at(0.0, 0.0));
        bench.pointer_up(&PointerEvent::at(0.0, 0.0));
        bench.pointer_down(&PointerEvent::at(200.0, 0.0).with_modifiers(Modifiers::shift()));
        bench.pointer_up(&PointerEvent::at(200.0, 0.0));
        assert_eq!(bench.selection(), &[a, b]);
    }

    #[test]
    fn test_connector_drag_connects_nodes() {
        let mut bench = Workbench::default();
        let a = bench.create(ShapeType::Node, Point::new(0.0, 0.0)).unwrap();
        let b = bench.create(ShapeType::Node, Point::new(300.0, 0.0)).unwrap();
        let events = recorder(&bench);

        let out = bench.registry().node(a).unwrap().connector_position(ConnectorKind::Output, 0);
        let inp = bench.registry().node(b).unwrap().connector_position(ConnectorKind::Input, 0);

        assert!(bench.pointer_down(&PointerEvent::at(out.x, out.y)));
        bench.pointer_move(&PointerEvent::at(out.x + 50.0, out.y));
        assert!(bench.connection_preview().is_some());
        bench.pointer_up(&PointerEvent::at(inp.x, inp.y));

        assert!(bench.connection_preview().is_none());
        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SceneEvent::ConnectionAdded { from_node, to_node, .. } if *from_node == a && *to_node == b
        )));
    }

    #[test]
    fn test_connector_click_selects_and_delete_removes_it() {
        let mut bench = Workbench::default();
        let a = bench.create(ShapeType::Node, Point::new(0.0, 0.0)).unwrap();
        bench.add_connector(a, ConnectorKind::Input).unwrap();
        bench.select(a, false);

        let p = bench.registry().node(a).unwrap().connector_position(ConnectorKind::Input, 1);
        bench.pointer_down(&PointerEvent::at(p.x, p.y));
        bench.pointer_up(&PointerEvent::at(p.x, p.y));
        assert_eq!(
            bench.selected_connector(),
            Some(ConnectorRef::new(a, ConnectorKind::Input, 1))
        );
        assert!(bench.selection().is_empty());

        assert!(bench.key_down(&KeyEvent::new("Delete")));
        assert_eq!(bench.registry().node(a).unwrap().input_count, 1);
        assert!(bench.entity(a).is_some());
    }

    #[test]
    fn test_delete_key_cascades_and_publishes() {
        let mut bench = Workbench::default();
        let a = bench.create(ShapeType::Node, Point::new(0.0, 0.0)).unwrap();
        let b = bench.create(ShapeType::Node, Point::new(300.0, 0.0)).unwrap();
        let conn = bench
            .connect(
                ConnectorRef::new(a, ConnectorKind::Output, 0),
                ConnectorRef::new(b, ConnectorKind::Input, 0),
            )
            .unwrap();
        bench.select(a, false);
        let events = recorder(&bench);

        assert!(bench.key_down(&KeyEvent::new("Backspace")));
        assert!(bench.entity(conn).is_none());
        assert!(bench.selection().is_empty());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SceneEvent::ConnectionRemoved { id: conn },
                SceneEvent::EntityRemoved { id: a },
                SceneEvent::SelectionChanged { selected: vec![] },
            ]
        );
    }

    #[test]
    fn test_unsubscribed_listener_sees_nothing_further() {
        let mut bench = Workbench::default();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = bench.subscribe(
            EventFilter::Categories(vec![EventCategory::Entity]),
            move |e| sink.lock().unwrap().push(e.clone()),
        );

        let first = bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        assert!(bench.unsubscribe(id));
        bench.create(ShapeType::Circle, Point::new(50.0, 0.0)).unwrap();
        assert!(!bench.unsubscribe(id));

        assert_eq!(
            *events.lock().unwrap(),
            vec![SceneEvent::EntityAdded {
                id: first,
                kind: "circle".to_string(),
            }]
        );
    }

    #[test]
    fn test_keys_ignored_while_typing() {
        let mut bench = Workbench::default();
        let id = bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        bench.select(id, false);
        let mut event = KeyEvent::new("Delete");
        event.text_input_focused = true;
        assert!(!bench.key_down(&event));
        assert!(bench.entity(id).is_some());
    }

    #[test]
    fn test_copy_paste_keys_use_last_pointer() {
        let mut bench = Workbench::default();
        let id = bench.create(ShapeType::Circle, Point::new(0.0, 0.0)).unwrap();
        bench.select(id, false);
        assert!(bench.key_down(&KeyEvent::new("c").with_modifiers(Modifiers::ctrl())));

        bench.pointer_move(&PointerEvent::at(300.0, 200.0));
        assert!(bench.key_down(&KeyEvent::new("v").with_modifiers(Modifiers::ctrl())));
        let pasted = bench.selection()[0];
        assert_ne!(pasted, id);
        assert_eq!(bench.entity(pasted).unwrap().shape.position(), Point::new(300.0, 200.0));
    }

    #[test]
    fn test_set_text_extent_enables_handles() {
        let mut bench = Workbench::default();
        let id = bench.create(ShapeType::Text, Point::new(10.0, 50.0)).unwrap();
        bench.select(id, false);
        assert!(bench.handles().is_empty());

        bench
            .set_text_extent(
                id,
                TextExtent {
                    width: 40.0,
                    height: 18.0,
                },
            )
            .unwrap();
        assert!(!bench.handles().is_empty());

        let rect = bench.create(ShapeType::Rectangle, Point::new(0.0, 0.0)).unwrap();
        assert!(bench
            .set_text_extent(
                rect,
                TextExtent {
                    width: 1.0,
                    height: 1.0
                }
            )
            .is_err());
    }
}

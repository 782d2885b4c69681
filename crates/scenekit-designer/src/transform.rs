//! Gesture state machine for drag, scale, rotate, line-endpoint and
//! bezier-control manipulation.
//!
//! Scale and rotate recompute every step from the snapshot taken when the
//! gesture began, so repeated move events with the same pointer are
//! idempotent. Drag is incremental.

use scenekit_core::geometry::{floor_divisor, rotate_point_deg};
use scenekit_core::{ConnectorKind, Corner, EntityId, Point};
use scenekit_settings::{GestureSettings, RoutingSettings};

use crate::handles::{ControlPoint, Endpoint, HandleDescriptor};
use crate::model::{SceneShape, Shape};
use crate::registry::ElementRegistry;
use crate::routing;
use crate::selection::SelectionService;

/// Transform state of one member at gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSnapshot {
    pub id: EntityId,
    pub position: Point,
    pub scale: f64,
    pub rotation: f64,
    /// Line endpoints, for lines only.
    pub endpoints: Option<(Point, Point)>,
}

impl MemberSnapshot {
    fn capture(id: EntityId, shape: &Shape) -> Self {
        Self {
            id,
            position: shape.position(),
            scale: shape.scale(),
            rotation: shape.rotation(),
            endpoints: shape.as_line().map(|l| (l.start, l.end)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub last: Point,
}

/// Width/height resize of a single rectangle or node in its own frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub id: EntityId,
    pub pivot: Point,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleState {
    pub corner: Corner,
    /// World position of the anchor opposite the grabbed handle.
    pub anchor: Point,
    pub initial_distance: f64,
    pub members: Vec<MemberSnapshot>,
    pub resize: Option<ResizeState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateState {
    pub pivot: Point,
    /// Pointer angle at gesture start, radians.
    pub start_angle: f64,
    pub initial_group_rotation: f64,
    pub group: bool,
    pub members: Vec<MemberSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointState {
    pub id: EntityId,
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BezierState {
    pub id: EntityId,
    pub control: ControlPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    Scaling(ScaleState),
    Rotating(RotateState),
    EndpointDragging(EndpointState),
    BezierDragging(BezierState),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging(_) => "dragging",
            Gesture::Scaling(_) => "scaling",
            Gesture::Rotating(_) => "rotating",
            Gesture::EndpointDragging(_) => "endpoint-dragging",
            Gesture::BezierDragging(_) => "bezier-dragging",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformController {
    gesture: Gesture,
    settings: GestureSettings,
}

impl TransformController {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            gesture: Gesture::Idle,
            settings,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Starts moving the selection. The caller selects the pressed entity
    /// first.
    pub fn begin_drag(&mut self, selection: &SelectionService, start: Point) -> bool {
        if selection.is_empty() {
            return false;
        }
        self.gesture = Gesture::Dragging(DragState { last: start });
        tracing::debug!("Drag started at ({:.2}, {:.2})", start.x, start.y);
        true
    }

    /// Starts the gesture bound to a handle.
    ///
    /// Returns `false`, staying idle, when the selection cannot support it:
    /// nothing selected, no bounding box, or a handle that does not belong
    /// to the selected entity type.
    pub fn begin_handle(
        &mut self,
        registry: &ElementRegistry,
        selection: &SelectionService,
        descriptor: HandleDescriptor,
        start: Point,
    ) -> bool {
        let gesture = match descriptor {
            HandleDescriptor::Scale(corner) => self.scale_state(registry, selection, corner, start),
            HandleDescriptor::Rotate => rotate_state(registry, selection, start),
            HandleDescriptor::LineEndpoint(endpoint) => {
                single_member(registry, selection)
                    .filter(|(_, shape)| matches!(shape, Shape::Line(_)))
                    .map(|(id, _)| Gesture::EndpointDragging(EndpointState { id, endpoint }))
            }
            HandleDescriptor::BezierControl(control) => single_member(registry, selection)
                .filter(|(_, shape)| shape.as_connection().is_some_and(|c| c.route.is_some()))
                .map(|(id, _)| Gesture::BezierDragging(BezierState { id, control })),
        };

        match gesture {
            Some(gesture) => {
                tracing::debug!("Gesture {} started from {:?}", gesture.name(), descriptor);
                self.gesture = gesture;
                true
            }
            None => false,
        }
    }

    fn scale_state(
        &self,
        registry: &ElementRegistry,
        selection: &SelectionService,
        corner: Corner,
        start: Point,
    ) -> Option<Gesture> {
        let bbox = selection.bounding_box(registry)?;
        let single = single_member(registry, selection);

        let (rotation, pivot) = match single {
            Some((_, shape)) => (shape.rotation(), shape.position()),
            None => (
                selection.group_rotation(),
                selection.group_pivot().unwrap_or_else(|| bbox.center()),
            ),
        };
        let anchor = rotate_point_deg(corner.opposite().position(&bbox), pivot, rotation);
        let initial_distance = floor_divisor(start.distance_to(&anchor));

        let resize = single.and_then(|(id, shape)| match shape {
            Shape::Rectangle(_) | Shape::Node(_) => Some(ResizeState {
                id,
                pivot,
                rotation,
            }),
            _ => None,
        });

        Some(Gesture::Scaling(ScaleState {
            corner,
            anchor,
            initial_distance,
            members: snapshot(registry, selection),
            resize,
        }))
    }

    /// Applies one pointer move. Returns `true` if geometry changed.
    ///
    /// Routes of connections attached to any moved node are refreshed before
    /// returning.
    pub fn update(
        &mut self,
        registry: &mut ElementRegistry,
        selection: &mut SelectionService,
        pointer: Point,
        routing: &RoutingSettings,
    ) -> bool {
        let min_dimension = self.settings.min_dimension;
        let moved = match &mut self.gesture {
            Gesture::Idle => return false,
            Gesture::Dragging(state) => {
                let dx = pointer.x - state.last.x;
                let dy = pointer.y - state.last.y;
                state.last = pointer;
                for id in selection.selected() {
                    if let Some(obj) = registry.get_mut(*id) {
                        if !obj.shape.is_connection() {
                            obj.shape.translate(dx, dy);
                        }
                    }
                }
                selection.translate_pivot(dx, dy);
                selection.selected().to_vec()
            }
            Gesture::Scaling(state) => match &state.resize {
                Some(resize) => {
                    apply_resize(registry, resize, state.anchor, pointer, min_dimension);
                    vec![resize.id]
                }
                None => {
                    let factor = pointer.distance_to(&state.anchor) / state.initial_distance;
                    apply_uniform_scale(registry, &state.members, state.anchor, factor);
                    state.members.iter().map(|m| m.id).collect()
                }
            },
            Gesture::Rotating(state) => {
                let angle = (pointer.y - state.pivot.y).atan2(pointer.x - state.pivot.x);
                let degrees = (angle - state.start_angle).to_degrees();
                apply_rotation(registry, &state.members, state.pivot, degrees);
                if state.group {
                    selection.set_group_transform(state.initial_group_rotation + degrees, state.pivot);
                }
                state.members.iter().map(|m| m.id).collect()
            }
            Gesture::EndpointDragging(state) => {
                let Some(Shape::Line(line)) = registry.get_mut(state.id).map(|o| &mut o.shape) else {
                    return false;
                };
                match state.endpoint {
                    Endpoint::Start => line.start = pointer,
                    Endpoint::End => line.end = pointer,
                }
                Vec::new()
            }
            Gesture::BezierDragging(state) => {
                if !set_control_offset(registry, state, pointer) {
                    return false;
                }
                routing::refresh_connection(registry, state.id, routing);
                Vec::new()
            }
        };

        if !moved.is_empty() {
            routing::refresh_routes_for_nodes(registry, &moved, routing);
        }
        true
    }

    /// Ends the active gesture. Returns `true` if one was active.
    pub fn end(&mut self) -> bool {
        let was = std::mem::take(&mut self.gesture);
        if matches!(was, Gesture::Idle) {
            return false;
        }
        tracing::debug!("Gesture {} ended", was.name());
        true
    }
}

fn single_member<'a>(
    registry: &'a ElementRegistry,
    selection: &SelectionService,
) -> Option<(EntityId, &'a Shape)> {
    match selection.selected() {
        [id] => registry.get(*id).map(|o| (*id, &o.shape)),
        _ => None,
    }
}

fn snapshot(registry: &ElementRegistry, selection: &SelectionService) -> Vec<MemberSnapshot> {
    selection
        .selected()
        .iter()
        .filter_map(|id| registry.get(*id))
        .filter(|obj| !obj.shape.is_connection())
        .map(|obj| MemberSnapshot::capture(obj.id, &obj.shape))
        .collect()
}

fn rotate_state(
    registry: &ElementRegistry,
    selection: &SelectionService,
    start: Point,
) -> Option<Gesture> {
    let bbox = selection.bounding_box(registry)?;
    let group = selection.is_group();
    let mut pivot = bbox.center();
    if group && selection.group_rotation() != 0.0 {
        if let Some(group_pivot) = selection.group_pivot() {
            pivot = rotate_point_deg(pivot, group_pivot, selection.group_rotation());
        }
    }

    Some(Gesture::Rotating(RotateState {
        pivot,
        start_angle: (start.y - pivot.y).atan2(start.x - pivot.x),
        initial_group_rotation: selection.group_rotation(),
        group,
        members: snapshot(registry, selection),
    }))
}

fn apply_uniform_scale(
    registry: &mut ElementRegistry,
    members: &[MemberSnapshot],
    anchor: Point,
    factor: f64,
) {
    let about = |p: Point| anchor + (p - anchor) * factor;
    for member in members {
        let Some(obj) = registry.get_mut(member.id) else {
            continue;
        };
        match (&mut obj.shape, member.endpoints) {
            (Shape::Line(line), Some((start, end))) => {
                line.start = about(start);
                line.end = about(end);
            }
            (shape, _) => {
                shape.set_scale(member.scale * factor);
                shape.set_position(about(member.position));
            }
        }
    }
}

fn apply_resize(
    registry: &mut ElementRegistry,
    resize: &ResizeState,
    anchor: Point,
    pointer: Point,
    min_dimension: f64,
) {
    let local_anchor = rotate_point_deg(anchor, resize.pivot, -resize.rotation);
    let local_pointer = rotate_point_deg(pointer, resize.pivot, -resize.rotation);
    let width = (local_pointer.x - local_anchor.x).abs().max(min_dimension);
    let height = (local_pointer.y - local_anchor.y).abs().max(min_dimension);
    let center = rotate_point_deg(
        local_pointer.midpoint(&local_anchor),
        resize.pivot,
        resize.rotation,
    );

    match registry.get_mut(resize.id).map(|o| &mut o.shape) {
        Some(Shape::Rectangle(rect)) => {
            rect.width = width;
            rect.height = height;
            rect.scale = 1.0;
            rect.position = center;
        }
        Some(Shape::Node(node)) => {
            node.width = width;
            node.height = height;
            node.scale = 1.0;
            node.position = center;
        }
        _ => {}
    }
}

fn apply_rotation(
    registry: &mut ElementRegistry,
    members: &[MemberSnapshot],
    pivot: Point,
    degrees: f64,
) {
    for member in members {
        let Some(obj) = registry.get_mut(member.id) else {
            continue;
        };
        match (&mut obj.shape, member.endpoints) {
            (Shape::Line(line), Some((start, end))) => {
                line.start = rotate_point_deg(start, pivot, degrees);
                line.end = rotate_point_deg(end, pivot, degrees);
                line.rotation = member.rotation + degrees;
            }
            (shape, _) => {
                shape.set_position(rotate_point_deg(member.position, pivot, degrees));
                shape.set_rotation(member.rotation + degrees);
            }
        }
    }
}

/// Stores the dragged control point relative to its live connector.
/// Returns `false` if the connection is gone.
fn set_control_offset(registry: &mut ElementRegistry, state: &BezierState, pointer: Point) -> bool {
    let endpoint = {
        let Some(conn) = registry.get(state.id).and_then(|o| o.shape.as_connection()) else {
            return false;
        };
        let live = match state.control {
            ControlPoint::First => registry
                .node(conn.from_node)
                .map(|n| n.connector_position(ConnectorKind::Output, conn.from_index)),
            ControlPoint::Second => registry
                .node(conn.to_node)
                .map(|n| n.connector_position(ConnectorKind::Input, conn.to_index)),
        };
        match (live, conn.route) {
            (Ok(p), _) => p,
            (Err(_), Some(route)) => match state.control {
                ControlPoint::First => route.start,
                ControlPoint::Second => route.end,
            },
            (Err(_), None) => return false,
        }
    };

    let Some(conn) = registry.get_mut(state.id).and_then(|o| o.shape.as_connection_mut()) else {
        return false;
    };
    let offset = pointer - endpoint;
    match state.control {
        ControlPoint::First => conn.control_offset1 = Some(offset),
        ControlPoint::Second => conn.control_offset2 = Some(offset),
    }
    true
}

//! Manipulation handles for the current selection.
//!
//! Layouts are rebuilt from scratch after every mutation: they are cheap
//! value snapshots that the renderer draws and the workbench hit-tests.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use scenekit_core::geometry::rotate_point_deg;
use scenekit_core::{BoundingBox, Corner, Point};
use scenekit_settings::HandleSettings;

use crate::model::{SceneConnection, SceneLine, SceneShape, Shape};
use crate::registry::ElementRegistry;
use crate::selection::SelectionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPoint {
    First,
    Second,
}

/// What a handle does when grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "kebab-case")]
pub enum HandleDescriptor {
    Scale(Corner),
    Rotate,
    LineEndpoint(Endpoint),
    BezierControl(ControlPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleShape {
    Square,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub descriptor: HandleDescriptor,
    /// World-space center.
    pub position: Point,
    pub shape: HandleShape,
    /// Side length for squares, radius for circles.
    pub size: f64,
}

impl Handle {
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        match self.shape {
            HandleShape::Square => {
                let half = self.size / 2.0 + tolerance;
                (p.x - self.position.x).abs() <= half && (p.y - self.position.y).abs() <= half
            }
            HandleShape::Circle => self.position.distance_to(&p) <= self.size + tolerance,
        }
    }
}

/// Dashed outline drawn around a selection: `bbox` rotated by `rotation`
/// degrees about `pivot`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutline {
    pub bbox: BoundingBox,
    pub rotation: f64,
    pub pivot: Point,
}

/// Straight guide from a connection endpoint to its control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideSegment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleLayout {
    pub outline: Option<SelectionOutline>,
    pub handles: SmallVec<[Handle; 5]>,
    pub guides: SmallVec<[GuideSegment; 2]>,
}

impl HandleLayout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.outline.is_none()
    }

    /// Maps a world point to the handle under it. Later handles are drawn on
    /// top and win.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<HandleDescriptor> {
        self.handles
            .iter()
            .rev()
            .find(|h| h.contains(point, tolerance))
            .map(|h| h.descriptor)
    }

    pub fn handle(&self, descriptor: HandleDescriptor) -> Option<&Handle> {
        self.handles.iter().find(|h| h.descriptor == descriptor)
    }
}

/// Builds the handle layout for the current selection.
///
/// Nothing selected, or a single entity without geometry, yields an empty
/// layout.
pub fn layout_for_selection(
    registry: &ElementRegistry,
    selection: &SelectionService,
    settings: &HandleSettings,
) -> HandleLayout {
    match selection.selected() {
        [] => HandleLayout::empty(),
        [id] => {
            let Some(obj) = registry.get(*id) else {
                return HandleLayout::empty();
            };
            match &obj.shape {
                Shape::Line(line) => line_layout(line, settings),
                Shape::Connection(conn) => connection_layout(conn, settings),
                shape => match shape.local_bounding_box() {
                    Some(bbox) => box_layout(bbox, shape.rotation(), bbox.center(), settings),
                    None => HandleLayout::empty(),
                },
            }
        }
        _ => {
            let Some(bbox) = selection.group_bounding_box(registry) else {
                return HandleLayout::empty();
            };
            let pivot = selection.group_pivot().unwrap_or_else(|| bbox.center());
            box_layout(bbox, selection.group_rotation(), pivot, settings)
        }
    }
}

/// Outline, 4 corner scale handles and a rotate handle above the top edge,
/// all rotated about `pivot`.
pub fn box_layout(
    bbox: BoundingBox,
    rotation: f64,
    pivot: Point,
    settings: &HandleSettings,
) -> HandleLayout {
    let place = |p: Point| rotate_point_deg(p, pivot, rotation);
    let mut handles: SmallVec<[Handle; 5]> = Corner::CORNERS
        .iter()
        .map(|corner| Handle {
            descriptor: HandleDescriptor::Scale(*corner),
            position: place(corner.position(&bbox)),
            shape: HandleShape::Square,
            size: settings.handle_size,
        })
        .collect();

    let top_center = Point::new(bbox.center().x, bbox.y - settings.rotate_handle_offset);
    handles.push(Handle {
        descriptor: HandleDescriptor::Rotate,
        position: place(top_center),
        shape: HandleShape::Circle,
        size: settings.rotate_handle_radius,
    });

    HandleLayout {
        outline: Some(SelectionOutline {
            bbox,
            rotation,
            pivot,
        }),
        handles,
        guides: SmallVec::new(),
    }
}

fn line_layout(line: &SceneLine, settings: &HandleSettings) -> HandleLayout {
    let endpoint = |descriptor, position| Handle {
        descriptor,
        position,
        shape: HandleShape::Circle,
        size: settings.rotate_handle_radius,
    };

    let mut handles = SmallVec::new();
    handles.push(endpoint(HandleDescriptor::LineEndpoint(Endpoint::Start), line.start));
    handles.push(endpoint(HandleDescriptor::LineEndpoint(Endpoint::End), line.end));
    handles.push(Handle {
        descriptor: HandleDescriptor::Rotate,
        position: line.midpoint() + line.normal() * settings.line_rotate_offset,
        shape: HandleShape::Circle,
        size: settings.rotate_handle_radius,
    });

    HandleLayout {
        outline: None,
        handles,
        guides: SmallVec::new(),
    }
}

fn connection_layout(conn: &SceneConnection, settings: &HandleSettings) -> HandleLayout {
    let Some(route) = conn.route else {
        return HandleLayout::empty();
    };
    let control = |which, position| Handle {
        descriptor: HandleDescriptor::BezierControl(which),
        position,
        shape: HandleShape::Circle,
        size: settings.rotate_handle_radius,
    };

    let mut layout = HandleLayout::empty();
    layout.handles.push(control(ControlPoint::First, route.control1));
    layout.handles.push(control(ControlPoint::Second, route.control2));
    layout.guides.push(GuideSegment {
        from: route.start,
        to: route.control1,
    });
    layout.guides.push(GuideSegment {
        from: route.end,
        to: route.control2,
    });
    layout
}

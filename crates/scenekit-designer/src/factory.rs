//! Entity creation from a type + world point or from a serialisable
//! descriptor.

use serde::{Deserialize, Serialize};

use scenekit_core::{BoundingBox, EntityId, Point};
use scenekit_settings::{NodeSettings, TextSettings};

use crate::model::{
    rotated_box_corners, SceneCircle, SceneConnection, SceneLine, SceneNode, SceneObject,
    SceneRectangle, SceneShape, SceneText, Shape, ShapeType, TextExtent,
};

const DEFAULT_CIRCLE_RADIUS: f64 = 30.0;
const DEFAULT_RECT_WIDTH: f64 = 100.0;
const DEFAULT_RECT_HEIGHT: f64 = 50.0;
const DEFAULT_LINE_HALF_SPAN: (f64, f64) = (60.0, 20.0);
const DEFAULT_TEXT: &str = "Text";

fn one() -> f64 {
    1.0
}

/// Type-specific geometry of an entity descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDescriptor {
    Circle {
        r: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Text {
        text: String,
        font_size: f64,
        #[serde(default)]
        font_family: String,
        #[serde(default)]
        fill: String,
        #[serde(default)]
        measured: Option<TextExtent>,
    },
    Node {
        width: f64,
        height: f64,
        input_count: usize,
        output_count: usize,
        corner_radius: f64,
        #[serde(default)]
        label: String,
    },
}

/// Everything needed to rebuild one entity. Connections use
/// [`ConnectionDescriptor`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Id of the entity this was copied from, for remapping connections.
    #[serde(default)]
    pub source_id: Option<EntityId>,
    pub position: Point,
    #[serde(default = "one")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub geometry: ShapeDescriptor,
}

impl EntityDescriptor {
    /// Captures a live entity. `None` for connections.
    pub fn describe(obj: &SceneObject) -> Option<Self> {
        let shape = &obj.shape;
        let geometry = match shape {
            Shape::Circle(c) => ShapeDescriptor::Circle { r: c.r },
            Shape::Rectangle(r) => ShapeDescriptor::Rectangle {
                width: r.width,
                height: r.height,
            },
            Shape::Line(l) => ShapeDescriptor::Line {
                x1: l.start.x,
                y1: l.start.y,
                x2: l.end.x,
                y2: l.end.y,
            },
            Shape::Text(t) => ShapeDescriptor::Text {
                text: t.text.clone(),
                font_size: t.font_size,
                font_family: t.font_family.clone(),
                fill: t.fill.clone(),
                measured: t.measured,
            },
            Shape::Node(n) => ShapeDescriptor::Node {
                width: n.width,
                height: n.height,
                input_count: n.input_count,
                output_count: n.output_count,
                corner_radius: n.corner_radius,
                label: n.label.clone(),
            },
            Shape::Connection(_) => return None,
        };
        Some(Self {
            source_id: Some(obj.id),
            position: shape.position(),
            scale: shape.scale(),
            rotation: shape.rotation(),
            geometry,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        match self.geometry {
            ShapeDescriptor::Circle { .. } => ShapeType::Circle,
            ShapeDescriptor::Rectangle { .. } => ShapeType::Rectangle,
            ShapeDescriptor::Line { .. } => ShapeType::Line,
            ShapeDescriptor::Text { .. } => ShapeType::Text,
            ShapeDescriptor::Node { .. } => ShapeType::Node,
        }
    }

    /// Footprint used to centre a paste on the pointer. Text counts as a
    /// zero-size box at its anchor.
    pub fn bounding_box(&self) -> BoundingBox {
        let p = self.position;
        match &self.geometry {
            ShapeDescriptor::Circle { r } => {
                let r = r * self.scale;
                BoundingBox::new(p.x - r, p.y - r, 2.0 * r, 2.0 * r)
            }
            ShapeDescriptor::Line { x1, y1, x2, y2 } => {
                BoundingBox::from_points(Point::new(*x1, *y1), Point::new(*x2, *y2))
            }
            ShapeDescriptor::Rectangle { width, height }
            | ShapeDescriptor::Node { width, height, .. } => {
                let corners = rotated_box_corners(
                    p,
                    width * self.scale,
                    height * self.scale,
                    self.rotation,
                );
                BoundingBox::envelope(corners).unwrap_or(BoundingBox::new(p.x, p.y, 0.0, 0.0))
            }
            ShapeDescriptor::Text { .. } => BoundingBox::new(p.x, p.y, 0.0, 0.0),
        }
    }

    /// Same descriptor moved by `(dx, dy)`, line endpoints included.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.position = self.position.offset(dx, dy);
        if let ShapeDescriptor::Line { x1, y1, x2, y2 } = &mut moved.geometry {
            *x1 += dx;
            *y1 += dy;
            *x2 += dx;
            *y2 += dy;
        }
        moved
    }
}

/// A connection between two described nodes, by their source ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    #[serde(default)]
    pub source_id: Option<EntityId>,
    pub from_node: EntityId,
    pub from_index: usize,
    pub to_node: EntityId,
    pub to_index: usize,
    #[serde(default)]
    pub control_offset1: Option<Point>,
    #[serde(default)]
    pub control_offset2: Option<Point>,
}

impl ConnectionDescriptor {
    pub fn describe(id: EntityId, conn: &SceneConnection) -> Self {
        Self {
            source_id: Some(id),
            from_node: conn.from_node,
            from_index: conn.from_index,
            to_node: conn.to_node,
            to_index: conn.to_index,
            control_offset1: conn.control_offset1,
            control_offset2: conn.control_offset2,
        }
    }

    /// Builds an unrouted connection between the given live nodes.
    pub fn build(&self, from_node: EntityId, to_node: EntityId) -> SceneConnection {
        let mut conn = SceneConnection::new(from_node, self.from_index, to_node, self.to_index);
        conn.control_offset1 = self.control_offset1;
        conn.control_offset2 = self.control_offset2;
        conn
    }
}

/// Creates entities with the configured node and text defaults.
#[derive(Debug, Clone, Default)]
pub struct EntityFactory {
    node: NodeSettings,
    text: TextSettings,
}

impl EntityFactory {
    pub fn new(node: NodeSettings, text: TextSettings) -> Self {
        Self { node, text }
    }

    /// A default-sized entity of `kind` centred at `at`. Connections cannot
    /// be created this way and yield `None`.
    pub fn create(&self, kind: ShapeType, at: Point) -> Option<Shape> {
        let shape = match kind {
            ShapeType::Circle => Shape::Circle(SceneCircle::new(at, DEFAULT_CIRCLE_RADIUS)),
            ShapeType::Rectangle => Shape::Rectangle(SceneRectangle::new(
                at,
                DEFAULT_RECT_WIDTH,
                DEFAULT_RECT_HEIGHT,
            )),
            ShapeType::Line => {
                let (hx, hy) = DEFAULT_LINE_HALF_SPAN;
                Shape::Line(SceneLine::new(at.offset(-hx, -hy), at.offset(hx, hy)))
            }
            ShapeType::Text => {
                let mut text = SceneText::new(at, DEFAULT_TEXT, self.text.font_size);
                text.font_family = self.text.font_family.clone();
                text.fill = self.text.fill.clone();
                Shape::Text(text)
            }
            ShapeType::Node => {
                let mut node = SceneNode::new(at, self.node.width, self.node.height);
                node.input_count = self.node.input_count;
                node.output_count = self.node.output_count;
                node.corner_radius = self.node.corner_radius;
                node.connector_radius = self.node.connector_radius;
                Shape::Node(node)
            }
            ShapeType::Connection => return None,
        };
        Some(shape)
    }

    /// Rebuilds an entity, preserving scale and rotation.
    pub fn from_descriptor(&self, descriptor: &EntityDescriptor) -> Shape {
        let p = descriptor.position;
        let mut shape = match &descriptor.geometry {
            ShapeDescriptor::Circle { r } => Shape::Circle(SceneCircle::new(p, *r)),
            ShapeDescriptor::Rectangle { width, height } => {
                Shape::Rectangle(SceneRectangle::new(p, *width, *height))
            }
            ShapeDescriptor::Line { x1, y1, x2, y2 } => Shape::Line(SceneLine::new(
                Point::new(*x1, *y1),
                Point::new(*x2, *y2),
            )),
            ShapeDescriptor::Text {
                text,
                font_size,
                font_family,
                fill,
                measured,
            } => {
                let mut t = SceneText::new(p, text.clone(), *font_size);
                t.font_family = if font_family.is_empty() {
                    self.text.font_family.clone()
                } else {
                    font_family.clone()
                };
                t.fill = if fill.is_empty() {
                    self.text.fill.clone()
                } else {
                    fill.clone()
                };
                t.measured = *measured;
                Shape::Text(t)
            }
            ShapeDescriptor::Node {
                width,
                height,
                input_count,
                output_count,
                corner_radius,
                label,
            } => {
                let mut node = SceneNode::new(p, *width, *height);
                node.input_count = *input_count;
                node.output_count = *output_count;
                node.corner_radius = *corner_radius;
                node.connector_radius = self.node.connector_radius;
                node.label = label.clone();
                Shape::Node(node)
            }
        };
        shape.set_scale(descriptor.scale);
        shape.set_rotation(descriptor.rotation);
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let factory = EntityFactory::default();
        let Some(Shape::Line(line)) = factory.create(ShapeType::Line, Point::new(0.0, 0.0)) else {
            panic!("expected a line");
        };
        assert_eq!(line.start, Point::new(-60.0, -20.0));
        assert_eq!(line.end, Point::new(60.0, 20.0));

        let Some(Shape::Node(node)) = factory.create(ShapeType::Node, Point::new(5.0, 5.0)) else {
            panic!("expected a node");
        };
        assert_eq!(node.width, 160.0);
        assert_eq!(node.corner_radius, 12.0);

        assert!(factory.create(ShapeType::Connection, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_descriptor_preserves_transform() {
        let mut rect = SceneRectangle::new(Point::new(100.0, 100.0), 100.0, 50.0);
        rect.scale = 2.0;
        rect.rotation = 45.0;
        let obj = SceneObject::new(7, Shape::Rectangle(rect.clone()));

        let descriptor = EntityDescriptor::describe(&obj).unwrap();
        assert_eq!(descriptor.source_id, Some(7));

        let rebuilt = EntityFactory::default().from_descriptor(&descriptor);
        assert_eq!(rebuilt, Shape::Rectangle(rect));
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = EntityDescriptor {
            source_id: None,
            position: Point::new(1.0, 2.0),
            scale: 1.0,
            rotation: 0.0,
            geometry: ShapeDescriptor::Circle { r: 4.0 },
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["r"], 4.0);

        let parsed: EntityDescriptor =
            serde_json::from_str(r#"{"type":"rectangle","position":{"x":0,"y":0},"width":4,"height":2}"#)
                .unwrap();
        assert_eq!(parsed.scale, 1.0);
        assert_eq!(parsed.shape_type(), ShapeType::Rectangle);
    }

    #[test]
    fn test_translated_moves_line_endpoints() {
        let obj = SceneObject::new(
            1,
            Shape::Line(SceneLine::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0))),
        );
        let moved = EntityDescriptor::describe(&obj).unwrap().translated(5.0, 5.0);
        assert_eq!(moved.position, Point::new(10.0, 5.0));
        assert_eq!(
            moved.geometry,
            ShapeDescriptor::Line {
                x1: 5.0,
                y1: 5.0,
                x2: 15.0,
                y2: 5.0
            }
        );
    }

    #[test]
    fn test_text_bbox_is_zero_size() {
        let descriptor = EntityDescriptor {
            source_id: None,
            position: Point::new(3.0, 4.0),
            scale: 2.0,
            rotation: 0.0,
            geometry: ShapeDescriptor::Text {
                text: "hi".into(),
                font_size: 18.0,
                font_family: String::new(),
                fill: String::new(),
                measured: None,
            },
        };
        assert_eq!(descriptor.bounding_box(), BoundingBox::new(3.0, 4.0, 0.0, 0.0));
    }
}

use serde::{Deserialize, Serialize};

pub use scenekit_core::geometry::{BoundingBox, Point};
use scenekit_core::geometry::rotate_point_deg;
use scenekit_core::EntityId;

mod circle;
mod connection;
mod line;
mod node;
mod rectangle;
mod text;

pub use circle::SceneCircle;
pub use connection::{ConnectionRoute, SceneConnection};
pub use line::SceneLine;
pub use node::SceneNode;
pub use rectangle::SceneRectangle;
pub use text::{SceneText, TextExtent};

/// Geometry contract shared by every entity type.
///
/// `position` is the pivot the entity rotates and scales about: the center
/// for circles, rectangles and nodes, the midpoint for lines and the
/// baseline start for text. `rotation` is in degrees and never folds into
/// `scale`.
pub trait SceneShape {
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
    fn scale(&self) -> f64;
    fn set_scale(&mut self, scale: f64);
    fn rotation(&self) -> f64;
    fn set_rotation(&mut self, degrees: f64);

    /// Unrotated, type-specific box. `None` while the geometry is unknown.
    fn local_bounding_box(&self) -> Option<BoundingBox>;

    fn contains_point(&self, p: Point, tolerance: f64) -> bool;

    fn translate(&mut self, dx: f64, dy: f64) {
        let p = self.position();
        self.set_position(p.offset(dx, dy));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Circle,
    Rectangle,
    Line,
    Text,
    Node,
    Connection,
}

impl ShapeType {
    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Circle => "circle",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Line => "line",
            ShapeType::Text => "text",
            ShapeType::Node => "node",
            ShapeType::Connection => "connection",
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(SceneCircle),
    Rectangle(SceneRectangle),
    Line(SceneLine),
    Text(SceneText),
    Node(SceneNode),
    Connection(SceneConnection),
}

impl SceneShape for Shape {
    fn position(&self) -> Point {
        match self {
            Shape::Circle(s) => s.position(),
            Shape::Rectangle(s) => s.position(),
            Shape::Line(s) => s.position(),
            Shape::Text(s) => s.position(),
            Shape::Node(s) => s.position(),
            Shape::Connection(s) => s.position(),
        }
    }

    fn set_position(&mut self, position: Point) {
        match self {
            Shape::Circle(s) => s.set_position(position),
            Shape::Rectangle(s) => s.set_position(position),
            Shape::Line(s) => s.set_position(position),
            Shape::Text(s) => s.set_position(position),
            Shape::Node(s) => s.set_position(position),
            Shape::Connection(s) => s.set_position(position),
        }
    }

    fn scale(&self) -> f64 {
        match self {
            Shape::Circle(s) => s.scale(),
            Shape::Rectangle(s) => s.scale(),
            Shape::Line(s) => s.scale(),
            Shape::Text(s) => s.scale(),
            Shape::Node(s) => s.scale(),
            Shape::Connection(s) => s.scale(),
        }
    }

    fn set_scale(&mut self, scale: f64) {
        match self {
            Shape::Circle(s) => s.set_scale(scale),
            Shape::Rectangle(s) => s.set_scale(scale),
            Shape::Line(s) => s.set_scale(scale),
            Shape::Text(s) => s.set_scale(scale),
            Shape::Node(s) => s.set_scale(scale),
            Shape::Connection(s) => s.set_scale(scale),
        }
    }

    fn rotation(&self) -> f64 {
        match self {
            Shape::Circle(s) => s.rotation(),
            Shape::Rectangle(s) => s.rotation(),
            Shape::Line(s) => s.rotation(),
            Shape::Text(s) => s.rotation(),
            Shape::Node(s) => s.rotation(),
            Shape::Connection(s) => s.rotation(),
        }
    }

    fn set_rotation(&mut self, degrees: f64) {
        match self {
            Shape::Circle(s) => s.set_rotation(degrees),
            Shape::Rectangle(s) => s.set_rotation(degrees),
            Shape::Line(s) => s.set_rotation(degrees),
            Shape::Text(s) => s.set_rotation(degrees),
            Shape::Node(s) => s.set_rotation(degrees),
            Shape::Connection(s) => s.set_rotation(degrees),
        }
    }

    fn local_bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Shape::Circle(s) => s.local_bounding_box(),
            Shape::Rectangle(s) => s.local_bounding_box(),
            Shape::Line(s) => s.local_bounding_box(),
            Shape::Text(s) => s.local_bounding_box(),
            Shape::Node(s) => s.local_bounding_box(),
            Shape::Connection(s) => s.local_bounding_box(),
        }
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        match self {
            Shape::Circle(s) => s.contains_point(p, tolerance),
            Shape::Rectangle(s) => s.contains_point(p, tolerance),
            Shape::Line(s) => s.contains_point(p, tolerance),
            Shape::Text(s) => s.contains_point(p, tolerance),
            Shape::Node(s) => s.contains_point(p, tolerance),
            Shape::Connection(s) => s.contains_point(p, tolerance),
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Shape::Circle(s) => s.translate(dx, dy),
            Shape::Rectangle(s) => s.translate(dx, dy),
            Shape::Line(s) => s.translate(dx, dy),
            Shape::Text(s) => s.translate(dx, dy),
            Shape::Node(s) => s.translate(dx, dy),
            Shape::Connection(s) => s.translate(dx, dy),
        }
    }
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Rectangle(_) => ShapeType::Rectangle,
            Shape::Line(_) => ShapeType::Line,
            Shape::Text(_) => ShapeType::Text,
            Shape::Node(_) => ShapeType::Node,
            Shape::Connection(_) => ShapeType::Connection,
        }
    }

    /// Axis-aligned box in world space.
    ///
    /// Rotated rectangles and nodes return the envelope of their rotated
    /// corners, not a tight polygon; selection and marquee hit-tests use it.
    pub fn world_bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Shape::Rectangle(_) | Shape::Node(_) if self.rotation() != 0.0 => {
                let corners = self.true_corners()?;
                BoundingBox::envelope(corners)
            }
            _ => self.local_bounding_box(),
        }
    }

    /// The four corners of a rectangle or node after its own rotation.
    pub fn true_corners(&self) -> Option<[Point; 4]> {
        match self {
            Shape::Rectangle(r) => Some(rotated_box_corners(
                r.position,
                r.width * r.scale,
                r.height * r.scale,
                r.rotation,
            )),
            Shape::Node(n) => Some(rotated_box_corners(
                n.position,
                n.width * n.scale,
                n.height * n.scale,
                n.rotation,
            )),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&SceneNode> {
        match self {
            Shape::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut SceneNode> {
        match self {
            Shape::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&SceneLine> {
        match self {
            Shape::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&SceneConnection> {
        match self {
            Shape::Connection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_connection_mut(&mut self) -> Option<&mut SceneConnection> {
        match self {
            Shape::Connection(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Shape::Connection(_))
    }
}

/// A live entity: registry id, selection flag and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: EntityId,
    pub selected: bool,
    pub shape: Shape,
}

impl SceneObject {
    pub fn new(id: EntityId, shape: Shape) -> Self {
        Self {
            id,
            selected: false,
            shape,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }
}

/// Corners of a `width` x `height` box centered on `center`, rotated by
/// `rotation` degrees about that center. Clockwise from top-left.
pub fn rotated_box_corners(center: Point, width: f64, height: f64, rotation: f64) -> [Point; 4] {
    let hw = width / 2.0;
    let hh = height / 2.0;
    [
        Point::new(center.x - hw, center.y - hh),
        Point::new(center.x + hw, center.y - hh),
        Point::new(center.x + hw, center.y + hh),
        Point::new(center.x - hw, center.y + hh),
    ]
    .map(|p| rotate_point_deg(p, center, rotation))
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let l2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if l2 == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / l2).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance_to(&proj)
}

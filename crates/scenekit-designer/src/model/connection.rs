use serde::{Deserialize, Serialize};

use scenekit_core::EntityId;

use super::{distance_to_segment, BoundingBox, Point, SceneShape};

const HIT_SAMPLES: usize = 24;

/// Cubic bezier from an output connector to an input connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRoute {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl ConnectionRoute {
    pub fn point_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// Approximate distance from `p` to the curve, via a sampled polyline.
    pub fn distance_to(&self, p: Point) -> f64 {
        let mut best = f64::INFINITY;
        let mut prev = self.start;
        for i in 1..=HIT_SAMPLES {
            let next = self.point_at(i as f64 / HIT_SAMPLES as f64);
            best = best.min(distance_to_segment(p, prev, next));
            prev = next;
        }
        best
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(&self.end)
    }

    /// SVG path data, `M x y C ...`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Edge between an output connector of `from_node` and an input connector
/// of `to_node`. Geometry is derived from the nodes; only the last computed
/// route is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConnection {
    pub from_node: EntityId,
    pub from_index: usize,
    pub to_node: EntityId,
    pub to_index: usize,
    /// Manual first control point, relative to the start connector.
    pub control_offset1: Option<Point>,
    /// Manual second control point, relative to the end connector.
    pub control_offset2: Option<Point>,
    pub route: Option<ConnectionRoute>,
}

impl SceneConnection {
    pub fn new(from_node: EntityId, from_index: usize, to_node: EntityId, to_index: usize) -> Self {
        Self {
            from_node,
            from_index,
            to_node,
            to_index,
            control_offset1: None,
            control_offset2: None,
            route: None,
        }
    }

    pub fn touches(&self, node: EntityId) -> bool {
        self.from_node == node || self.to_node == node
    }
}

impl SceneShape for SceneConnection {
    fn position(&self) -> Point {
        self.route.map(|r| r.midpoint()).unwrap_or_default()
    }

    // Derived geometry: the transform setters are no-ops.
    fn set_position(&mut self, _position: Point) {}

    fn scale(&self) -> f64 {
        1.0
    }

    fn set_scale(&mut self, _scale: f64) {}

    fn rotation(&self) -> f64 {
        0.0
    }

    fn set_rotation(&mut self, _degrees: f64) {}

    /// Envelope of the routed endpoints; `None` before the first routing.
    fn local_bounding_box(&self) -> Option<BoundingBox> {
        let route = self.route?;
        Some(BoundingBox::from_points(route.start, route.end))
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.route.is_some_and(|r| r.distance_to(p) <= tolerance)
    }
}

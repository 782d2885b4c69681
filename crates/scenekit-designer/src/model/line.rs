use serde::{Deserialize, Serialize};

use super::{distance_to_segment, BoundingBox, Point, SceneShape};

/// Straight segment. Endpoints are authoritative; `position` is always their
/// midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLine {
    pub start: Point,
    pub end: Point,
    pub scale: f64,
    /// Accumulated rotation in degrees. Informational; the endpoints carry it.
    pub rotation: f64,
}

impl SceneLine {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(&self.end)
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Unit normal `(-dy, dx) / len`, with the length floored to 1.
    pub fn normal(&self) -> Point {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len = dx.hypot(dy);
        let len = if len == 0.0 { 1.0 } else { len };
        Point::new(-dy / len, dx / len)
    }
}

impl SceneShape for SceneLine {
    fn position(&self) -> Point {
        self.midpoint()
    }

    fn set_position(&mut self, position: Point) {
        let mid = self.midpoint();
        self.translate(position.x - mid.x, position.y - mid.y);
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
    }

    fn local_bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox::from_points(self.start, self.end))
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        distance_to_segment(p, self.start, self.end) <= tolerance
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.offset(dx, dy);
        self.end = self.end.offset(dx, dy);
    }
}

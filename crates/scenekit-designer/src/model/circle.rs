use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point, SceneShape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCircle {
    pub position: Point,
    pub r: f64,
    pub scale: f64,
    /// Rotation in degrees. Has no visible effect but turns the handle frame.
    pub rotation: f64,
}

impl SceneCircle {
    pub fn new(center: Point, r: f64) -> Self {
        Self {
            position: center,
            r,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn effective_radius(&self) -> f64 {
        self.r * self.scale
    }
}

impl SceneShape for SceneCircle {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
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
        let r = self.effective_radius();
        Some(BoundingBox::new(
            self.position.x - r,
            self.position.y - r,
            2.0 * r,
            2.0 * r,
        ))
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        p.distance_to(&self.position) <= self.effective_radius() + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_bbox_uses_scale() {
        let mut circle = SceneCircle::new(Point::new(50.0, 50.0), 10.0);
        circle.scale = 2.0;
        assert_eq!(
            circle.local_bounding_box(),
            Some(BoundingBox::new(30.0, 30.0, 40.0, 40.0))
        );
        assert!(circle.contains_point(Point::new(69.0, 50.0), 0.0));
        assert!(!circle.contains_point(Point::new(71.0, 50.0), 0.0));
    }
}

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point, SceneShape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRectangle {
    /// Center of the rectangle.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    /// Rotation angle in degrees about `position`
    pub rotation: f64,
}

impl SceneRectangle {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            position: center,
            width,
            height,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Build from a top-left corner, as drawing tools report it.
    pub fn from_corner(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x + width / 2.0, y + height / 2.0), width, height)
    }
}

impl SceneShape for SceneRectangle {
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
        let w = self.width * self.scale;
        let h = self.height * self.scale;
        Some(BoundingBox::new(
            self.position.x - w / 2.0,
            self.position.y - h / 2.0,
            w,
            h,
        ))
    }

    /// Hit test against the world envelope, so a rotated rectangle also
    /// answers in the empty corners of its envelope.
    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        let corners = super::rotated_box_corners(
            self.position,
            self.width * self.scale,
            self.height * self.scale,
            self.rotation,
        );
        BoundingBox::envelope(corners).is_some_and(|bbox| bbox.contains_point(p, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corner() {
        let rect = SceneRectangle::from_corner(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.position, Point::new(60.0, 45.0));
        assert_eq!(
            rect.local_bounding_box(),
            Some(BoundingBox::new(10.0, 20.0, 100.0, 50.0))
        );
    }

    #[test]
    fn test_rotated_hit_uses_envelope() {
        let mut rect = SceneRectangle::new(Point::new(0.0, 0.0), 100.0, 10.0);
        rect.rotation = 45.0;
        // Outside the rotated body but inside its envelope.
        assert!(rect.contains_point(Point::new(30.0, -30.0), 0.0));
        assert!(!rect.contains_point(Point::new(60.0, 0.0), 0.0));
    }
}

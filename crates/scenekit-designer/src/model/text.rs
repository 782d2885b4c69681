use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point, SceneShape};

/// Unscaled text extent, as measured by the renderer after layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneText {
    /// Baseline start.
    pub position: Point,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub fill: String,
    pub scale: f64,
    pub rotation: f64,
    /// `None` until measured; the text has no bounding box before that.
    pub measured: Option<TextExtent>,
}

impl SceneText {
    pub fn new(position: Point, text: impl Into<String>, font_size: f64) -> Self {
        Self {
            position,
            text: text.into(),
            font_size,
            font_family: String::new(),
            fill: String::new(),
            scale: 1.0,
            rotation: 0.0,
            measured: None,
        }
    }

    /// Rendered font size, never below 1.
    pub fn effective_font_size(&self) -> f64 {
        (self.font_size * self.scale).max(1.0)
    }
}

impl SceneShape for SceneText {
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
        let extent = self.measured?;
        let w = extent.width * self.scale;
        let h = extent.height * self.scale;
        Some(BoundingBox::new(self.position.x, self.position.y - h, w, h))
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.local_bounding_box()
            .is_some_and(|bbox| bbox.contains_point(p, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmeasured_text_has_no_bbox() {
        let text = SceneText::new(Point::new(0.0, 0.0), "hello", 18.0);
        assert!(text.local_bounding_box().is_none());
        assert!(!text.contains_point(Point::new(0.0, 0.0), 10.0));
    }

    #[test]
    fn test_measured_bbox_sits_above_baseline() {
        let mut text = SceneText::new(Point::new(10.0, 100.0), "hello", 18.0);
        text.measured = Some(TextExtent {
            width: 40.0,
            height: 20.0,
        });
        text.scale = 2.0;
        assert_eq!(
            text.local_bounding_box(),
            Some(BoundingBox::new(10.0, 60.0, 80.0, 40.0))
        );
        assert_eq!(text.effective_font_size(), 36.0);
    }
}

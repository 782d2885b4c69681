use serde::{Deserialize, Serialize};

use scenekit_core::geometry::{rotate_point_deg, rotate_vector_deg};
use scenekit_core::{ConnectorKind, EntityId};

use super::{rotated_box_corners, BoundingBox, Point, SceneShape};

/// Flow-graph node: a rounded box with input connectors on its left edge and
/// output connectors on its right edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Center of the node.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub rotation: f64,
    pub input_count: usize,
    pub output_count: usize,
    pub corner_radius: f64,
    pub connector_radius: f64,
    pub label: String,
    /// Ids of attached connections, resolved through the registry.
    pub connections: Vec<EntityId>,
}

impl SceneNode {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            position: center,
            width,
            height,
            scale: 1.0,
            rotation: 0.0,
            input_count: 1,
            output_count: 1,
            corner_radius: 12.0,
            connector_radius: 5.0,
            label: String::new(),
            connections: Vec::new(),
        }
    }

    pub fn connector_count(&self, kind: ConnectorKind) -> usize {
        match kind {
            ConnectorKind::Input => self.input_count,
            ConnectorKind::Output => self.output_count,
        }
    }

    pub fn connector_count_mut(&mut self, kind: ConnectorKind) -> &mut usize {
        match kind {
            ConnectorKind::Input => &mut self.input_count,
            ConnectorKind::Output => &mut self.output_count,
        }
    }

    /// Connector position before the node rotation is applied.
    ///
    /// Connector `i` of `n` sits at `top + h * (i + 1) / (n + 1)`.
    pub fn connector_base_position(&self, kind: ConnectorKind, index: usize) -> Option<Point> {
        let count = self.connector_count(kind);
        if index >= count {
            return None;
        }
        let half_w = self.width * self.scale / 2.0;
        let half_h = self.height * self.scale / 2.0;
        let x = match kind {
            ConnectorKind::Input => self.position.x - half_w,
            ConnectorKind::Output => self.position.x + half_w,
        };
        let gap = self.height * self.scale / (count as f64 + 1.0);
        Some(Point::new(x, self.position.y - half_h + gap * (index as f64 + 1.0)))
    }

    /// World position of a connector. An out-of-range index falls back to
    /// the node center.
    pub fn connector_position(&self, kind: ConnectorKind, index: usize) -> Point {
        match self.connector_base_position(kind, index) {
            Some(base) => rotate_point_deg(base, self.position, self.rotation),
            None => self.position,
        }
    }

    /// Outward unit normal of a connector side in world space.
    pub fn connector_normal(&self, kind: ConnectorKind) -> Point {
        let normal = match kind {
            ConnectorKind::Input => Point::new(-1.0, 0.0),
            ConnectorKind::Output => Point::new(1.0, 0.0),
        };
        rotate_vector_deg(normal, self.rotation)
    }

    /// All connector positions of one side, in index order.
    pub fn connector_positions(&self, kind: ConnectorKind) -> Vec<Point> {
        (0..self.connector_count(kind))
            .map(|i| self.connector_position(kind, i))
            .collect()
    }

    pub fn world_corners(&self) -> [Point; 4] {
        rotated_box_corners(
            self.position,
            self.width * self.scale,
            self.height * self.scale,
            self.rotation,
        )
    }

    pub fn register_connection(&mut self, id: EntityId) {
        if !self.connections.contains(&id) {
            self.connections.push(id);
        }
    }

    pub fn unregister_connection(&mut self, id: EntityId) {
        self.connections.retain(|c| *c != id);
    }
}

impl SceneShape for SceneNode {
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

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        BoundingBox::envelope(self.world_corners())
            .is_some_and(|bbox| bbox.contains_point(p, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> SceneNode {
        SceneNode::new(Point::new(100.0, 100.0), 160.0, 90.0)
    }

    #[test]
    fn test_connector_spacing() {
        let mut n = node();
        n.input_count = 2;
        let first = n.connector_position(ConnectorKind::Input, 0);
        let second = n.connector_position(ConnectorKind::Input, 1);
        assert!((first.x - 20.0).abs() < 1e-9);
        assert!((first.y - 85.0).abs() < 1e-9);
        assert!((second.y - 115.0).abs() < 1e-9);

        let out = n.connector_position(ConnectorKind::Output, 0);
        assert!((out.x - 180.0).abs() < 1e-9);
        assert!((out.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_connector_falls_back_to_center() {
        let n = node();
        assert_eq!(n.connector_position(ConnectorKind::Output, 5), n.position);
    }

    #[test]
    fn test_rotated_connectors_and_normals() {
        let mut n = node();
        n.rotation = 90.0;
        let out = n.connector_position(ConnectorKind::Output, 0);
        assert!((out.x - 100.0).abs() < 1e-9);
        assert!((out.y - 180.0).abs() < 1e-9);

        let normal = n.connector_normal(ConnectorKind::Input);
        assert!(normal.x.abs() < 1e-9);
        assert!((normal.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_register_connection_is_idempotent() {
        let mut n = node();
        n.register_connection(7);
        n.register_connection(7);
        assert_eq!(n.connections, vec![7]);
        n.unregister_connection(7);
        assert!(n.connections.is_empty());
    }
}

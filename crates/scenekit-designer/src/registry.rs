//! Owner of the live entity set.

use std::collections::HashMap;

use scenekit_core::{EntityId, Point, Result, SceneError};

use crate::model::{SceneNode, SceneObject, SceneShape, Shape};

/// Live entities by id, in draw order.
///
/// Connections are kept at the bottom of the draw order so they render (and
/// hit-test) beneath the nodes they join.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    objects: HashMap<EntityId, SceneObject>,
    draw_order: Vec<EntityId>,
    next_id: EntityId,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            draw_order: Vec::new(),
            next_id: 1,
        }
    }

    pub fn generate_id(&mut self) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Allocate an id and insert `shape` under it.
    pub fn add(&mut self, shape: Shape) -> EntityId {
        let id = self.generate_id();
        let obj = SceneObject::new(id, shape);
        self.place(obj);
        id
    }

    /// Insert an object carrying its own id.
    pub fn insert(&mut self, obj: SceneObject) -> Result<()> {
        if self.objects.contains_key(&obj.id) {
            return Err(SceneError::DuplicateId { id: obj.id });
        }
        if obj.id >= self.next_id {
            self.next_id = obj.id + 1;
        }
        self.place(obj);
        Ok(())
    }

    fn place(&mut self, obj: SceneObject) {
        let id = obj.id;
        if obj.shape.is_connection() {
            self.draw_order.insert(0, id);
        } else {
            self.draw_order.push(id);
        }
        self.objects.insert(id, obj);
    }

    /// Remove without cascading. See `graph::delete_entity` for the
    /// connection-aware version.
    pub fn remove(&mut self, id: EntityId) -> Option<SceneObject> {
        let obj = self.objects.remove(&id)?;
        self.draw_order.retain(|d| *d != id);
        Some(obj)
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn shape(&self, id: EntityId) -> Result<&Shape> {
        self.get(id)
            .map(|o| &o.shape)
            .ok_or(SceneError::EntityNotFound { id })
    }

    pub fn node(&self, id: EntityId) -> Result<&SceneNode> {
        self.shape(id)?
            .as_node()
            .ok_or(SceneError::NotANode { id })
    }

    pub fn node_mut(&mut self, id: EntityId) -> Result<&mut SceneNode> {
        self.get_mut(id)
            .ok_or(SceneError::EntityNotFound { id })?
            .shape
            .as_node_mut()
            .ok_or(SceneError::NotANode { id })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Entities bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SceneObject> {
        self.draw_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Mutable access in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    pub fn draw_order(&self) -> &[EntityId] {
        &self.draw_order
    }

    /// Topmost entity whose body contains `p`.
    pub fn entity_at(&self, p: Point, tolerance: f64) -> Option<EntityId> {
        self.iter()
            .rev()
            .find(|obj| obj.shape.contains_point(p, tolerance))
            .map(|obj| obj.id)
    }

    /// Ids of connections attached to any of `nodes`.
    pub fn connections_of(&self, nodes: &[EntityId]) -> Vec<EntityId> {
        let mut out = Vec::new();
        for node in nodes {
            if let Ok(n) = self.node(*node) {
                for c in &n.connections {
                    if !out.contains(c) {
                        out.push(*c);
                    }
                }
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.draw_order.clear();
    }
}

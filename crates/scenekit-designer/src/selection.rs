use scenekit_core::geometry::rotate_point_deg;
use scenekit_core::{BoundingBox, EntityId, Point};

use crate::model::{SceneShape, Shape};
use crate::registry::ElementRegistry;

/// Manages the ordered selection list and the group rotation state.
///
/// `SelectionService` is responsible for:
/// - Tracking which entities are selected, in selection order
/// - Keeping every entity's `selected` flag in sync with that list
/// - Holding the group rotation angle and pivot for multi-selections
/// - Computing the bounding box the handles are anchored to
///
/// # Group rotation
///
/// Rotating a multi-selection leaves the members individually rotated; the
/// group handle box stays aligned with the gesture by remembering the
/// accumulated angle and the pivot. Both reset whenever membership changes,
/// and they only exist while two or more entities are selected.
///
/// The service does not own entities: every call that needs geometry takes
/// the registry by reference.
#[derive(Debug, Clone, Default)]
pub struct SelectionService {
    selected: Vec<EntityId>,
    group_rotation: f64,
    group_pivot: Option<Point>,
}

impl SelectionService {
    /// Creates an empty selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenekit_designer::selection::SelectionService;
    ///
    /// let selection = SelectionService::new();
    /// assert!(selection.is_empty());
    /// assert_eq!(selection.group_rotation(), 0.0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects an entity.
    ///
    /// # Arguments
    ///
    /// * `registry` - The registry holding the entity
    /// * `id` - The entity to select
    /// * `additive` - When `true`, toggles `id` in the current selection;
    ///   otherwise the selection is replaced by `id` alone
    ///
    /// # Returns
    ///
    /// `true` if the selection changed. Unknown ids are ignored.
    pub fn select(&mut self, registry: &mut ElementRegistry, id: EntityId, additive: bool) -> bool {
        if !registry.contains(id) {
            return false;
        }

        let was_selected = self.is_selected(id);
        if additive {
            if was_selected {
                self.selected.retain(|s| *s != id);
            } else {
                self.selected.push(id);
            }
        } else {
            if was_selected && self.selected.len() == 1 {
                return false;
            }
            self.selected.clear();
            self.selected.push(id);
        }

        self.reset_group();
        self.sync_flags(registry);
        tracing::debug!("Selection now {:?}", self.selected);
        true
    }

    /// Removes one entity from the selection.
    ///
    /// # Returns
    ///
    /// `true` if `id` was selected.
    pub fn deselect(&mut self, registry: &mut ElementRegistry, id: EntityId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| *s != id);
        if self.selected.len() == before {
            return false;
        }
        self.reset_group();
        self.sync_flags(registry);
        true
    }

    /// Clears the selection.
    ///
    /// # Returns
    ///
    /// `true` if anything was selected.
    pub fn deselect_all(&mut self, registry: &mut ElementRegistry) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        self.reset_group();
        self.sync_flags(registry);
        changed
    }

    /// Replaces the selection wholesale.
    ///
    /// Used by marquee selection and paste. Ids the registry does not know
    /// and repeated ids are dropped; the remaining order is preserved.
    pub fn set_selection<I>(&mut self, registry: &mut ElementRegistry, ids: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.selected.clear();
        for id in ids {
            if registry.contains(id) && !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.reset_group();
        self.sync_flags(registry);
    }

    /// Drops ids that are no longer in the registry.
    ///
    /// # Returns
    ///
    /// `true` if anything was dropped.
    pub fn prune(&mut self, registry: &mut ElementRegistry) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| registry.contains(*id));
        if self.selected.len() == before {
            return false;
        }
        self.reset_group();
        self.sync_flags(registry);
        true
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_group(&self) -> bool {
        self.selected.len() > 1
    }

    /// Accumulated group rotation in degrees. Always 0 below two members.
    pub fn group_rotation(&self) -> f64 {
        self.group_rotation
    }

    pub fn group_pivot(&self) -> Option<Point> {
        self.group_pivot
    }

    /// Records the group rotation left behind by a rotate gesture.
    ///
    /// Ignored unless two or more entities are selected.
    pub fn set_group_transform(&mut self, rotation: f64, pivot: Point) {
        if !self.is_group() {
            return;
        }
        self.group_rotation = rotation;
        self.group_pivot = Some(pivot);
    }

    /// Moves the group pivot along with a drag.
    pub fn translate_pivot(&mut self, dx: f64, dy: f64) {
        if let Some(pivot) = self.group_pivot.as_mut() {
            *pivot = pivot.offset(dx, dy);
        }
    }

    /// The box handles are anchored to.
    ///
    /// A single member yields its unrotated local box; the handle layer
    /// applies the member's own rotation. Two or more yield
    /// [`group_bounding_box`](Self::group_bounding_box).
    pub fn bounding_box(&self, registry: &ElementRegistry) -> Option<BoundingBox> {
        match self.selected.as_slice() {
            [] => None,
            [id] => registry.get(*id)?.shape.local_bounding_box(),
            _ => self.group_bounding_box(registry),
        }
    }

    /// Bounding box of all members.
    ///
    /// With an active group rotation and pivot, member geometry is
    /// inverse-rotated about the pivot and the envelope is taken in that
    /// local frame, so the box stays tight around a rotated group. Without
    /// one it is the union of member world boxes. Members without geometry
    /// are skipped.
    pub fn group_bounding_box(&self, registry: &ElementRegistry) -> Option<BoundingBox> {
        if self.selected.len() > 1 && self.group_rotation != 0.0 {
            if let Some(pivot) = self.group_pivot {
                if let Some(bbox) = self.rotated_group_box(registry, pivot) {
                    return Some(bbox);
                }
            }
        }

        self.selected
            .iter()
            .filter_map(|id| registry.get(*id)?.shape.world_bounding_box())
            .reduce(|acc, bbox| acc.union(&bbox))
    }

    fn rotated_group_box(&self, registry: &ElementRegistry, pivot: Point) -> Option<BoundingBox> {
        let inverse = -self.group_rotation;
        let to_local = |p: Point| rotate_point_deg(p, pivot, inverse);
        let mut points: Vec<Point> = Vec::with_capacity(self.selected.len() * 4);

        for id in &self.selected {
            let Some(obj) = registry.get(*id) else {
                continue;
            };
            match &obj.shape {
                Shape::Circle(circle) => {
                    let c = to_local(circle.position);
                    let r = circle.effective_radius();
                    points.push(c.offset(-r, -r));
                    points.push(c.offset(r, r));
                }
                Shape::Line(line) => {
                    points.push(to_local(line.start));
                    points.push(to_local(line.end));
                }
                shape @ (Shape::Rectangle(_) | Shape::Node(_)) => {
                    if let Some(corners) = shape.true_corners() {
                        points.extend(corners.into_iter().map(to_local));
                    }
                }
                shape => {
                    if let Some(bbox) = shape.world_bounding_box() {
                        points.extend(bbox.corners().into_iter().map(to_local));
                    }
                }
            }
        }

        BoundingBox::envelope(points)
    }

    fn reset_group(&mut self) {
        self.group_rotation = 0.0;
        self.group_pivot = None;
    }

    fn sync_flags(&self, registry: &mut ElementRegistry) {
        for obj in registry.iter_mut() {
            obj.selected = self.selected.contains(&obj.id);
        }
    }
}

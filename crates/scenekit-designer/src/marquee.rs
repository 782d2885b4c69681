//! Drag-rectangle selection over empty canvas.

use scenekit_core::{BoundingBox, EntityId, Point};

use crate::registry::ElementRegistry;
use crate::selection::SelectionService;

/// Entities whose world box overlaps `rect`, touching edges included, in
/// draw order. Entities without geometry never match.
pub fn entities_in_rect(registry: &ElementRegistry, rect: &BoundingBox) -> Vec<EntityId> {
    registry
        .iter()
        .filter(|obj| {
            obj.shape
                .world_bounding_box()
                .is_some_and(|bbox| bbox.intersects(rect))
        })
        .map(|obj| obj.id)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct Tracking {
    start_world: Point,
    start_screen: Point,
    current_world: Point,
    additive: bool,
    base: Vec<EntityId>,
    materialised: bool,
}

#[derive(Debug, Clone)]
pub struct MarqueeSelection {
    tracking: Option<Tracking>,
    threshold_px: f64,
}

impl Default for MarqueeSelection {
    fn default() -> Self {
        Self::new(6.0)
    }
}

impl MarqueeSelection {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            tracking: None,
            threshold_px,
        }
    }

    /// Starts tracking a press on empty canvas. With `additive`, the current
    /// selection is kept as the base the marquee adds to.
    pub fn begin(&mut self, selection: &SelectionService, world: Point, screen: Point, additive: bool) {
        self.tracking = Some(Tracking {
            start_world: world,
            start_screen: screen,
            current_world: world,
            additive,
            base: if additive {
                selection.selected().to_vec()
            } else {
                Vec::new()
            },
            materialised: false,
        });
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// The visible rectangle, once the drag has passed the threshold.
    pub fn rect(&self) -> Option<BoundingBox> {
        self.tracking
            .as_ref()
            .filter(|t| t.materialised)
            .map(|t| BoundingBox::from_points(t.start_world, t.current_world))
    }

    /// Returns `true` while the marquee owns the pointer.
    pub fn update(
        &mut self,
        registry: &mut ElementRegistry,
        selection: &mut SelectionService,
        world: Point,
        screen: Point,
    ) -> bool {
        let Some(tracking) = self.tracking.as_mut() else {
            return false;
        };
        if !tracking.materialised {
            if screen.distance_to(&tracking.start_screen) < self.threshold_px {
                return true;
            }
            tracking.materialised = true;
            tracing::debug!("Marquee started");
        }
        tracking.current_world = world;

        let rect = BoundingBox::from_points(tracking.start_world, tracking.current_world);
        let inside = entities_in_rect(registry, &rect);
        let ids: Vec<EntityId> = if tracking.additive {
            tracking.base.iter().copied().chain(inside).collect()
        } else {
            inside
        };
        selection.set_selection(registry, ids);
        true
    }

    /// Ends tracking. A press that never materialised is a click on empty
    /// canvas and clears the selection unless additive.
    ///
    /// Returns `true` if a marquee was being tracked.
    pub fn finish(&mut self, registry: &mut ElementRegistry, selection: &mut SelectionService) -> bool {
        let Some(tracking) = self.tracking.take() else {
            return false;
        };
        if !tracking.materialised && !tracking.additive {
            selection.deselect_all(registry);
        }
        true
    }

    pub fn cancel(&mut self) {
        self.tracking = None;
    }
}

//! Marquee containment for arbitrary entities and rectangles.

use proptest::prelude::*;
use scenekit_core::geometry::{BoundingBox, Point};
use scenekit_core::EntityId;
use scenekit_designer::{
    entities_in_rect, ElementRegistry, MarqueeSelection, SceneCircle, SceneRectangle,
    SelectionService, Shape,
};

fn shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (-500.0f64..500.0, -500.0f64..500.0, 1.0f64..80.0)
            .prop_map(|(x, y, r)| Shape::Circle(SceneCircle::new(Point::new(x, y), r))),
        (
            -500.0f64..500.0,
            -500.0f64..500.0,
            1.0f64..200.0,
            1.0f64..200.0,
            -180.0f64..180.0,
        )
            .prop_map(|(x, y, w, h, rotation)| {
                let mut rect = SceneRectangle::new(Point::new(x, y), w, h);
                rect.rotation = rotation;
                Shape::Rectangle(rect)
            }),
    ]
}

fn single(shape: Shape) -> (ElementRegistry, EntityId, BoundingBox) {
    let mut registry = ElementRegistry::new();
    let id = registry.add(shape);
    let bbox = registry
        .get(id)
        .and_then(|obj| obj.shape.world_bounding_box())
        .expect("shape has geometry");
    (registry, id, bbox)
}

proptest! {
    #[test]
    fn enclosing_rect_always_selects(
        shape in shape(),
        left in 0.1f64..50.0, top in 0.1f64..50.0,
        right in 0.1f64..50.0, bottom in 0.1f64..50.0,
    ) {
        let (registry, id, bbox) = single(shape);
        let rect = BoundingBox::new(
            bbox.x - left,
            bbox.y - top,
            bbox.width + left + right,
            bbox.height + top + bottom,
        );
        prop_assert_eq!(entities_in_rect(&registry, &rect), vec![id]);
    }

    #[test]
    fn rect_outside_never_selects(
        shape in shape(),
        gap in 0.1f64..100.0,
        side in 0usize..4,
        w in 1.0f64..300.0, h in 1.0f64..300.0,
        slide in -300.0f64..300.0,
    ) {
        let (registry, _, bbox) = single(shape);
        let rect = match side {
            0 => BoundingBox::new(bbox.x + bbox.width + gap, bbox.y + slide, w, h),
            1 => BoundingBox::new(bbox.x - gap - w, bbox.y + slide, w, h),
            2 => BoundingBox::new(bbox.x + slide, bbox.y + bbox.height + gap, w, h),
            _ => BoundingBox::new(bbox.x + slide, bbox.y - gap - h, w, h),
        };
        prop_assert!(entities_in_rect(&registry, &rect).is_empty());
    }

    #[test]
    fn additive_marquee_keeps_base_selection(
        kept in shape(),
        other in shape(),
        sx in -600.0f64..600.0, sy in -600.0f64..600.0,
        ex in -600.0f64..600.0, ey in -600.0f64..600.0,
    ) {
        let mut registry = ElementRegistry::new();
        let base = registry.add(kept);
        let other = registry.add(other);
        let mut selection = SelectionService::new();
        selection.select(&mut registry, base, false);

        let mut marquee = MarqueeSelection::default();
        marquee.begin(&selection, Point::new(sx, sy), Point::new(0.0, 0.0), true);
        marquee.update(&mut registry, &mut selection, Point::new(ex, ey), Point::new(100.0, 100.0));
        let rect = marquee.rect().expect("marquee past threshold");
        marquee.finish(&mut registry, &mut selection);

        prop_assert!(selection.selected().contains(&base));
        let other_inside = entities_in_rect(&registry, &rect).contains(&other);
        prop_assert_eq!(selection.selected().contains(&other), other_inside);
    }
}

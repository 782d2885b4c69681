//! Algebraic properties of the geometry kernel.

use proptest::prelude::*;
use scenekit_core::geometry::{
    corner_positions, distance, opposite_corner, rotate_point, BoundingBox, Corner, Point,
};

fn coord() -> impl Strategy<Value = f64> {
    -1.0e4..1.0e4
}

proptest! {
    #[test]
    fn rotation_round_trip(
        px in coord(), py in coord(),
        cx in coord(), cy in coord(),
        theta in -10.0f64..10.0,
    ) {
        let p = Point::new(px, py);
        let c = Point::new(cx, cy);
        let back = rotate_point(rotate_point(p, c, theta), c, -theta);
        prop_assert!((back.x - p.x).abs() < 1e-9);
        prop_assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn rotation_preserves_distance_to_center(
        px in coord(), py in coord(),
        cx in coord(), cy in coord(),
        theta in -10.0f64..10.0,
    ) {
        let p = Point::new(px, py);
        let c = Point::new(cx, cy);
        let before = distance(p, c);
        let after = distance(rotate_point(p, c, theta), c);
        prop_assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn opposite_corner_is_point_reflection_through_center(
        x in coord(), y in coord(),
        w in 0.0f64..1.0e3, h in 0.0f64..1.0e3,
        idx in 0usize..8,
    ) {
        let bbox = BoundingBox::new(x, y, w, h);
        let corner = Corner::ALL[idx];
        let here = corner.position(&bbox);
        let there = opposite_corner(corner, &bbox);
        let center = bbox.center();
        prop_assert!((here.x + there.x - 2.0 * center.x).abs() < 1e-6);
        prop_assert!((here.y + there.y - 2.0 * center.y).abs() < 1e-6);
    }

    #[test]
    fn envelope_contains_every_point(points in prop::collection::vec((coord(), coord()), 1..16)) {
        let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let bbox = BoundingBox::envelope(pts.iter().copied()).expect("non-empty envelope");
        for p in pts {
            prop_assert!(bbox.contains_point(p, 1e-9));
        }
    }
}

#[test]
fn opposite_corner_is_involution() {
    for corner in Corner::ALL {
        assert_eq!(corner.opposite().opposite(), corner, "{}", corner);
        assert_ne!(corner.opposite(), corner);
        assert_eq!(corner.opposite().is_corner(), corner.is_corner());
    }
}

#[test]
fn corner_positions_cover_all_names_once() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let anchors = corner_positions(&bbox);
    for corner in Corner::ALL {
        assert_eq!(anchors.iter().filter(|(c, _)| *c == corner).count(), 1);
    }
}

#[test]
fn from_points_normalises() {
    let bbox = BoundingBox::from_points(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
    assert_eq!(bbox, BoundingBox::new(10.0, 5.0, 20.0, 20.0));
}

#[test]
fn union_spans_both() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(20.0, -5.0, 5.0, 5.0);
    assert_eq!(a.union(&b), BoundingBox::new(0.0, -5.0, 25.0, 15.0));
}

//! Geometry kernel
//!
//! Pure, stateless helpers shared by every layer of the editor:
//! - `Point` and `BoundingBox` value types
//! - point rotation about an arbitrary center
//! - the 8 named anchors of a box (4 corners + 4 edge midpoints)
//! - the involutive opposite-anchor mapping used by scale handles
//!
//! Nothing in here can fail; results are exact within floating-point tolerance.

use serde::{Deserialize, Serialize};

/// A point (or vector) in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// Component-wise `self + other`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned box in world space. `y` grows downward, so `y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanned by two arbitrary corners (min/max normalised).
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest axis-aligned box containing every point.
    ///
    /// Returns `None` for an empty iterator or when any coordinate is not finite.
    pub fn envelope<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
            return None;
        }

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Closed-interval overlap test: touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.x - tolerance
            && p.x <= self.right() + tolerance
            && p.y >= self.y - tolerance
            && p.y <= self.bottom() + tolerance
    }

    pub fn translated(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// One of the 8 named anchors of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Top,
    Right,
    Bottom,
    Left,
}

impl Corner {
    /// All anchors: the 4 corners first, then the 4 edge midpoints.
    pub const ALL: [Corner; 8] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
        Corner::Top,
        Corner::Right,
        Corner::Bottom,
        Corner::Left,
    ];

    /// The 4 true corners, clockwise from top-left.
    pub const CORNERS: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Corner maps to the diagonal corner, edge midpoint to the facing midpoint.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::Top => Corner::Bottom,
            Corner::Right => Corner::Left,
            Corner::Bottom => Corner::Top,
            Corner::Left => Corner::Right,
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Corner::TopLeft | Corner::TopRight | Corner::BottomRight | Corner::BottomLeft
        )
    }

    /// Position of this anchor on `bbox`.
    pub fn position(self, bbox: &BoundingBox) -> Point {
        let cx = bbox.x + bbox.width / 2.0;
        let cy = bbox.y + bbox.height / 2.0;
        match self {
            Corner::TopLeft => Point::new(bbox.x, bbox.y),
            Corner::TopRight => Point::new(bbox.right(), bbox.y),
            Corner::BottomRight => Point::new(bbox.right(), bbox.bottom()),
            Corner::BottomLeft => Point::new(bbox.x, bbox.bottom()),
            Corner::Top => Point::new(cx, bbox.y),
            Corner::Right => Point::new(bbox.right(), cy),
            Corner::Bottom => Point::new(cx, bbox.bottom()),
            Corner::Left => Point::new(bbox.x, cy),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomRight => "bottom-right",
            Corner::BottomLeft => "bottom-left",
            Corner::Top => "top",
            Corner::Right => "right",
            Corner::Bottom => "bottom",
            Corner::Left => "left",
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown corner '{}'", s))
    }
}

/// Rotates `p` about `center` by `angle` radians.
pub fn rotate_point(p: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Rotates `p` about `center` by `degrees`. Zero is a fast path.
pub fn rotate_point_deg(p: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    rotate_point(p, center, degrees.to_radians())
}

/// Rotates a direction vector (no translation) by `degrees`.
pub fn rotate_vector_deg(v: Point, degrees: f64) -> Point {
    rotate_point_deg(v, Point::default(), degrees)
}

/// All 8 named anchors of `bbox`.
pub fn corner_positions(bbox: &BoundingBox) -> [(Corner, Point); 8] {
    Corner::ALL.map(|c| (c, c.position(bbox)))
}

pub fn opposite_corner_name(corner: Corner) -> Corner {
    corner.opposite()
}

/// Position of the anchor opposite `corner` on `bbox`.
pub fn opposite_corner(corner: Corner, bbox: &BoundingBox) -> Point {
    corner.opposite().position(bbox)
}

pub fn distance(p: Point, q: Point) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Guards a divisor against zero so ratios never become NaN or infinite.
pub fn floor_divisor(value: f64) -> f64 {
    if value.abs() < f64::EPSILON || !value.is_finite() {
        1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::new(0.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!(approx(p, Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_rotate_about_offset_center() {
        let p = rotate_point_deg(Point::new(2.0, 1.0), Point::new(1.0, 1.0), 180.0);
        assert!(approx(p, Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_corner_positions() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let anchors = corner_positions(&bbox);
        assert_eq!(anchors[0], (Corner::TopLeft, Point::new(0.0, 0.0)));
        assert_eq!(anchors[2], (Corner::BottomRight, Point::new(100.0, 50.0)));
        assert_eq!(anchors[4], (Corner::Top, Point::new(50.0, 0.0)));
        assert_eq!(anchors[7], (Corner::Left, Point::new(0.0, 25.0)));
    }

    #[test]
    fn test_opposite_corner_position() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(opposite_corner(Corner::TopLeft, &bbox), Point::new(40.0, 60.0));
        assert_eq!(opposite_corner(Corner::Right, &bbox), Point::new(10.0, 40.0));
    }

    #[test]
    fn test_corner_names_parse() {
        for corner in Corner::ALL {
            assert_eq!(corner.name().parse::<Corner>(), Ok(corner));
        }
        assert!("middle".parse::<Corner>().is_err());
    }

    #[test]
    fn test_envelope_empty_is_none() {
        assert!(BoundingBox::envelope(Vec::new()).is_none());
    }

    #[test]
    fn test_intersects_is_closed() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let touching = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        let apart = BoundingBox::new(10.1, 0.0, 5.0, 5.0);
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_floor_divisor() {
        assert_eq!(floor_divisor(0.0), 1.0);
        assert_eq!(floor_divisor(f64::NAN), 1.0);
        assert_eq!(floor_divisor(2.5), 2.5);
    }
}

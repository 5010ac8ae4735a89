//! Core geometry types
//!
//! Points, sizes, rectangles and 2D affine transforms shared by paths,
//! paints, renderers and the node tree.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance used by the `is_equal_approx` helpers
pub const EPSILON: f32 = 1e-5;

// ─────────────────────────────────────────────────────────────────────────────
// Point / Size / Rect
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_equal_approx(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The larger of the two dimensions
    pub fn max_dimension(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Create a rectangle spanning two corner points
    pub fn from_points(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let max_x = p1.x.max(p2.x);
        let max_y = p1.y.max(p2.y);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Bounding rectangle of a set of points, `None` for an empty set
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_points(min, max))
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.max_x()
            && point.y >= self.origin.y
            && point.y <= self.max_y()
    }

    /// True when the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Self {
        let min_x = self.x().min(other.x());
        let min_y = self.y().min(other.y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn is_equal_approx(&self, other: &Rect) -> bool {
        self.origin.is_equal_approx(other.origin)
            && (self.size.width - other.size.width).abs() <= EPSILON
            && (self.size.height - other.size.height).abs() <= EPSILON
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Affine2D
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transformation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self {
            elements: [a, b, c, d, tx, ty],
        }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(
            a * point.x + c * point.y + tx,
            b * point.x + d * point.y + ty,
        )
    }

    /// Transform a direction, ignoring the translation part
    pub fn transform_vector(&self, v: Point) -> Point {
        let [a, b, c, d, _, _] = self.elements;
        Point::new(a * v.x + c * v.y, b * v.x + d * v.y)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, _, _] = self.elements;
        a * d - b * c
    }

    /// Inverse transform, `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let [a, b, c, d, tx, ty] = self.elements;
        let inv = 1.0 / det;
        let (na, nb, nc, nd) = (d * inv, -b * inv, -c * inv, a * inv);
        Some(Affine2D::new(
            na,
            nb,
            nc,
            nd,
            -(na * tx + nc * ty),
            -(nb * tx + nd * ty),
        ))
    }

    /// Translation component
    pub fn origin(&self) -> Point {
        Point::new(self.elements[4], self.elements[5])
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.elements[4] = origin.x;
        self.elements[5] = origin.y;
        self
    }

    /// Post-translate: the offset is added in parent space
    pub fn translated(&self, offset: Point) -> Self {
        self.with_origin(self.origin() + offset)
    }

    /// Same linear part, translation dropped
    pub fn untranslated(&self) -> Self {
        self.with_origin(Point::ZERO)
    }

    /// Lengths of the x and y basis columns
    pub fn scale_factors(&self) -> Size {
        let [a, b, c, d, _, _] = self.elements;
        Size::new((a * a + b * b).sqrt(), (c * c + d * d).sqrt())
    }

    /// Uniform scale estimate used for line widths and tolerances
    pub fn mean_scale(&self) -> f32 {
        self.determinant().abs().sqrt()
    }

    pub fn is_equal_approx(&self, other: &Affine2D) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_inverse_roundtrip() {
        let t = Affine2D::translation(10.0, -4.0)
            .then(&Affine2D::rotation(0.7))
            .then(&Affine2D::scale(2.0, 3.0));
        let inv = t.inverse().unwrap();
        let p = Point::new(3.0, 5.0);
        let back = inv.transform_point(t.transform_point(p));
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
        assert!(t.then(&inv).is_equal_approx(&Affine2D::IDENTITY));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine2D::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_then_applies_right_first() {
        let t = Affine2D::translation(5.0, 0.0).then(&Affine2D::scale(2.0, 2.0));
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(7.0, 2.0));
    }

    #[test]
    fn test_scale_factors_and_untranslated() {
        let t = Affine2D::scale(3.0, 4.0).translated(Point::new(1.0, 2.0));
        assert_eq!(t.origin(), Point::new(1.0, 2.0));
        assert_eq!(t.scale_factors(), Size::new(3.0, 4.0));
        assert_eq!(t.untranslated().origin(), Point::ZERO);
    }

    #[test]
    fn test_rect_bounding_and_union() {
        let r = Rect::bounding([Point::new(2.0, 3.0), Point::new(-1.0, 7.0)]).unwrap();
        assert_eq!(r, Rect::new(-1.0, 3.0, 3.0, 4.0));
        assert_eq!(r.center(), Point::new(0.5, 5.0));
        assert!(Rect::bounding(std::iter::empty()).is_none());

        let u = r.union(&Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(u, Rect::new(-1.0, 0.0, 3.0, 7.0));
    }
}

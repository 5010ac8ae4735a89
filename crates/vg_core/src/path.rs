//! Vector paths
//!
//! A [`Path`] is a named list of [`Subpath`]s sharing one fill paint, one line
//! paint and one line style. Each subpath stores the control polygon of a
//! chain of cubic Bézier curves: the start point followed by three points
//! (control 1, control 2, end) per curve, so a subpath with `n` points holds
//! `(n - 1) / 3` curves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, VgError};
use crate::geometry::{Affine2D, Point, Rect};
use crate::paint::Paint;

/// Magic number for cubic Bézier circle approximation
const KAPPA: f32 = 0.552_284_8;

/// Line segments per curve when flattening for hit tests
const HIT_SEGMENTS: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Line style
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    /// Flat cap at the endpoint
    #[default]
    Butt,
    /// Rounded cap extending past the endpoint
    Round,
    /// Square cap extending past the endpoint
    Square,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineJoin {
    /// Miter join (sharp corner)
    #[default]
    Miter,
    /// Round join
    Round,
    /// Bevel join (flat corner)
    Bevel,
}

/// Fill rule used to decide which regions are inside
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillRule {
    type Err = VgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            other => Err(VgError::InvalidValue {
                property: "fill_rule".into(),
                value: other.into(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subpath
// ─────────────────────────────────────────────────────────────────────────────

/// A chain of cubic Bézier curves
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    points: Vec<Point>,
    closed: bool,
}

impl Subpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Ellipse made of four cubic curves, starting at the rightmost point
    pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32) -> Self {
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        let points = vec![
            Point::new(cx + rx, cy),
            Point::new(cx + rx, cy + ky),
            Point::new(cx + kx, cy + ry),
            Point::new(cx, cy + ry),
            Point::new(cx - kx, cy + ry),
            Point::new(cx - rx, cy + ky),
            Point::new(cx - rx, cy),
            Point::new(cx - rx, cy - ky),
            Point::new(cx - kx, cy - ry),
            Point::new(cx, cy - ry),
            Point::new(cx + kx, cy - ry),
            Point::new(cx + rx, cy - ky),
            Point::new(cx + rx, cy),
        ];
        Self::from_points(points, true)
    }

    /// Axis-aligned rectangle made of four straight curves
    pub fn rect(rect: Rect) -> Self {
        let mut subpath = Self::new();
        subpath.move_to(rect.origin);
        subpath.line_to(Point::new(rect.max_x(), rect.y()));
        subpath.line_to(Point::new(rect.max_x(), rect.max_y()));
        subpath.line_to(Point::new(rect.x(), rect.max_y()));
        subpath.line_to(rect.origin);
        subpath.set_closed(true);
        subpath
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_curves(&self) -> usize {
        self.points.len().saturating_sub(1) / 3
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace the control polygon
    pub fn set_points(&mut self, points: &[Point]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Start the subpath at `p`, discarding previous points
    pub fn move_to(&mut self, p: Point) {
        self.points.clear();
        self.points.push(p);
    }

    /// Append a straight curve (controls at thirds)
    pub fn line_to(&mut self, p: Point) {
        let Some(from) = self.last_point() else {
            self.points.push(p);
            return;
        };
        self.points
            .extend([from.lerp(p, 1.0 / 3.0), from.lerp(p, 2.0 / 3.0), p]);
    }

    /// Append a quadratic curve, elevated to a cubic
    pub fn quad_to(&mut self, control: Point, p: Point) {
        let Some(from) = self.last_point() else {
            self.points.push(p);
            return;
        };
        self.points.extend([
            from.lerp(control, 2.0 / 3.0),
            p.lerp(control, 2.0 / 3.0),
            p,
        ]);
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.points.is_empty() {
            self.points.push(Point::ZERO);
        }
        self.points.extend([c1, c2, p]);
    }

    /// Control points of curve `index`
    pub fn curve(&self, index: usize) -> Option<[Point; 4]> {
        if index >= self.num_curves() {
            return None;
        }
        let i = index * 3;
        Some([
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
        ])
    }

    /// Point at global parameter `t`: the integer part selects the curve,
    /// the fraction is the position along it.
    pub fn evaluate(&self, t: f32) -> Option<Point> {
        let n = self.num_curves();
        if n == 0 {
            return self.points.first().copied();
        }
        let t = t.clamp(0.0, n as f32);
        let index = (t.floor() as usize).min(n - 1);
        let local = t - index as f32;
        self.curve(index).map(|c| cubic_point(&c, local))
    }

    /// Split the curve under global parameter `t` into two curves.
    ///
    /// Returns false when `t` falls on a knot or outside the subpath.
    pub fn insert_curve_at(&mut self, t: f32) -> bool {
        let n = self.num_curves();
        if n == 0 || !t.is_finite() || t < 0.0 {
            return false;
        }
        let index = t.floor() as usize;
        if index >= n {
            return false;
        }
        let local = t - index as f32;
        if local <= 1e-6 || local >= 1.0 - 1e-6 {
            return false;
        }

        let [p0, p1, p2, p3] = match self.curve(index) {
            Some(c) => c,
            None => return false,
        };
        let p01 = p0.lerp(p1, local);
        let p12 = p1.lerp(p2, local);
        let p23 = p2.lerp(p3, local);
        let p012 = p01.lerp(p12, local);
        let p123 = p12.lerp(p23, local);
        let mid = p012.lerp(p123, local);

        let start = index * 3 + 1;
        self.points
            .splice(start..start + 3, [p01, p012, mid, p123, p23, p3]);
        true
    }

    /// Remove curve `index`; the previous knot connects to the next curve
    pub fn remove_curve(&mut self, index: usize) -> Result<()> {
        let n = self.num_curves();
        if index >= n {
            return Err(VgError::IndexOutOfRange {
                what: "curve",
                index,
                len: n,
            });
        }
        let start = index * 3 + 1;
        self.points.drain(start..start + 3);
        Ok(())
    }

    /// Exact bounds of the curves (control points of degenerate tails are
    /// included as-is)
    pub fn bounds(&self) -> Option<Rect> {
        if self.points.is_empty() {
            return None;
        }
        let mut extrema: Vec<Point> = Vec::with_capacity(self.points.len());
        extrema.push(self.points[0]);
        for i in 0..self.num_curves() {
            let Some(curve) = self.curve(i) else { continue };
            extrema.push(curve[3]);
            for t in cubic_extrema(&curve) {
                extrema.push(cubic_point(&curve, t));
            }
        }
        // trailing points that don't form a full curve
        let used = self.num_curves() * 3 + 1;
        extrema.extend_from_slice(&self.points[used.min(self.points.len())..]);
        Rect::bounding(extrema)
    }

    /// Map every control point through `transform`
    pub fn transform(&mut self, transform: &Affine2D) {
        for p in &mut self.points {
            *p = transform.transform_point(*p);
        }
    }

    /// Winding number of the flattened outline around `point`; the outline
    /// is treated as closed, as filling does
    pub fn winding_number(&self, point: Point) -> i32 {
        let Some(&first) = self.points.first() else {
            return 0;
        };
        let mut polygon = Vec::with_capacity(self.num_curves() * HIT_SEGMENTS + 1);
        polygon.push(first);
        for curve in (0..self.num_curves()).filter_map(|i| self.curve(i)) {
            for step in 1..=HIT_SEGMENTS {
                polygon.push(cubic_point(&curve, step as f32 / HIT_SEGMENTS as f32));
            }
        }
        polygon_winding(&polygon, point)
    }
}

fn polygon_winding(polygon: &[Point], p: Point) -> i32 {
    let mut winding = 0;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let cross = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}

fn cubic_point(c: &[Point; 4], t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let d = 3.0 * mt * t * t;
    let e = t * t * t;
    Point::new(
        a * c[0].x + b * c[1].x + d * c[2].x + e * c[3].x,
        a * c[0].y + b * c[1].y + d * c[2].y + e * c[3].y,
    )
}

/// Parameters in (0, 1) where either coordinate has a local extremum
fn cubic_extrema(c: &[Point; 4]) -> Vec<f32> {
    let mut roots = Vec::with_capacity(4);
    for axis in [0usize, 1] {
        let v = |p: Point| if axis == 0 { p.x } else { p.y };
        let (p0, p1, p2, p3) = (v(c[0]), v(c[1]), v(c[2]), v(c[3]));
        // derivative / 3 = a t^2 + b t + c
        let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let b = 2.0 * (p0 - 2.0 * p1 + p2);
        let k = p1 - p0;
        if a.abs() < 1e-9 {
            if b.abs() > 1e-9 {
                roots.push(-k / b);
            }
            continue;
        }
        let disc = b * b - 4.0 * a * k;
        if disc < 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        roots.push((-b + sq) / (2.0 * a));
        roots.push((-b - sq) / (2.0 * a));
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

// ─────────────────────────────────────────────────────────────────────────────
// Path
// ─────────────────────────────────────────────────────────────────────────────

/// A styled vector path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub name: String,
    pub subpaths: Vec<Subpath>,
    /// Fill paint, `None` for no fill
    pub fill: Option<Paint>,
    /// Line paint, `None` for no stroke
    pub line: Option<Paint>,
    pub line_width: f32,
    pub fill_rule: FillRule,
    pub miter_limit: f32,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            name: String::new(),
            subpaths: Vec::new(),
            fill: None,
            line: None,
            line_width: 1.0,
            fill_rule: FillRule::NonZero,
            miter_limit: 4.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
        }
    }
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// The content a freshly created path node starts with
    pub fn default_shape() -> Self {
        let mut path = Self::new();
        path.subpaths.push(Subpath::ellipse(0.0, 0.0, 100.0, 100.0));
        path.fill = Some(Paint::Color(Color::rgb(0.8, 0.1, 0.1)));
        path.line = Some(Paint::Color(Color::BLACK));
        path
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_fill(mut self, paint: impl Into<Paint>) -> Self {
        self.fill = Some(paint.into());
        self
    }

    pub fn with_line(mut self, paint: impl Into<Paint>, width: f32) -> Self {
        self.line = Some(paint.into());
        self.line_width = width;
        self
    }

    pub fn add_subpath(&mut self, subpath: Subpath) {
        self.subpaths.push(subpath);
    }

    pub fn num_subpaths(&self) -> usize {
        self.subpaths.len()
    }

    pub fn subpath(&self, index: usize) -> Result<&Subpath> {
        let len = self.subpaths.len();
        self.subpaths.get(index).ok_or(VgError::IndexOutOfRange {
            what: "subpath",
            index,
            len,
        })
    }

    pub fn subpath_mut(&mut self, index: usize) -> Result<&mut Subpath> {
        let len = self.subpaths.len();
        self.subpaths.get_mut(index).ok_or(VgError::IndexOutOfRange {
            what: "subpath",
            index,
            len,
        })
    }

    /// True when no subpath has any point
    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(Subpath::is_empty)
    }

    /// Geometric bounds, [`Rect::ZERO`] for an empty path
    pub fn bounds(&self) -> Rect {
        self.subpaths
            .iter()
            .filter_map(Subpath::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Rect::ZERO)
    }

    /// Center of the bounds
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether `point` lies in the fill area under the path's fill rule.
    ///
    /// Paint is ignored: an unfilled outline still has an inside.
    pub fn is_inside(&self, point: Point) -> bool {
        let winding: i32 = self.subpaths.iter().map(|s| s.winding_number(point)).sum();
        match self.fill_rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    /// Copy of this path mapped through `transform`, paints included.
    ///
    /// With `scale_line_width` the line width follows the transform's mean
    /// scale.
    pub fn transformed(&self, transform: &Affine2D, scale_line_width: bool) -> Path {
        let mut out = self.clone();
        out.transform(transform, scale_line_width);
        out
    }

    pub fn transform(&mut self, transform: &Affine2D, scale_line_width: bool) {
        for subpath in &mut self.subpaths {
            subpath.transform(transform);
        }
        self.fill = self.fill.as_ref().map(|p| p.transformed(transform));
        self.line = self.line.as_ref().map(|p| p.transformed(transform));
        if scale_line_width {
            self.line_width *= transform.mean_scale();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_subpath() -> Subpath {
        let mut s = Subpath::new();
        s.move_to(Point::new(0.0, 0.0));
        s.line_to(Point::new(30.0, 0.0));
        s.line_to(Point::new(30.0, 30.0));
        s
    }

    #[test]
    fn test_curve_counts() {
        let s = line_subpath();
        assert_eq!(s.num_points(), 7);
        assert_eq!(s.num_curves(), 2);
        assert_eq!(Subpath::new().num_curves(), 0);
        assert_eq!(Subpath::ellipse(0.0, 0.0, 1.0, 1.0).num_curves(), 4);
    }

    #[test]
    fn test_insert_curve_splits_in_place() {
        let mut s = line_subpath();
        assert!(s.insert_curve_at(0.5));
        assert_eq!(s.num_curves(), 3);
        assert!(s.points()[3].is_equal_approx(Point::new(15.0, 0.0)));
        // the remaining curve is untouched
        assert_eq!(s.last_point(), Some(Point::new(30.0, 30.0)));
    }

    #[test]
    fn test_insert_curve_on_knot_is_noop() {
        let mut s = line_subpath();
        assert!(!s.insert_curve_at(1.0));
        assert!(!s.insert_curve_at(2.0));
        assert!(!s.insert_curve_at(-0.5));
        assert_eq!(s.num_curves(), 2);
    }

    #[test]
    fn test_remove_curve_bridges() {
        let mut s = line_subpath();
        s.remove_curve(0).unwrap();
        assert_eq!(s.num_curves(), 1);
        assert_eq!(s.points()[0], Point::new(0.0, 0.0));
        assert_eq!(s.last_point(), Some(Point::new(30.0, 30.0)));

        let err = s.remove_curve(3).unwrap_err();
        assert!(matches!(err, VgError::IndexOutOfRange { index: 3, len: 1, .. }));
    }

    #[test]
    fn test_ellipse_bounds_are_exact() {
        let s = Subpath::ellipse(10.0, 20.0, 5.0, 8.0);
        let b = s.bounds().unwrap();
        assert!(b.is_equal_approx(&Rect::new(5.0, 12.0, 10.0, 16.0)));
    }

    #[test]
    fn test_curve_bounds_tighter_than_hull() {
        let mut s = Subpath::new();
        s.move_to(Point::new(0.0, 0.0));
        s.cubic_to(Point::new(0.0, 100.0), Point::new(100.0, 100.0), Point::new(100.0, 0.0));
        let b = s.bounds().unwrap();
        assert!((b.max_y() - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_default_shape() {
        let path = Path::default_shape();
        assert!(!path.is_empty());
        assert!(path.bounds().is_equal_approx(&Rect::new(-100.0, -100.0, 200.0, 200.0)));
        assert_eq!(path.fill, Some(Paint::Color(Color::rgb(0.8, 0.1, 0.1))));
        assert_eq!(path.line, Some(Paint::Color(Color::BLACK)));
    }

    #[test]
    fn test_empty_path() {
        let mut path = Path::new();
        assert!(path.is_empty());
        path.add_subpath(Subpath::new());
        assert!(path.is_empty());
        assert_eq!(path.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_transform_scales_line_width() {
        let path = Path::default_shape().with_line(Color::BLACK, 2.0);
        let scaled = path.transformed(&Affine2D::scale(3.0, 3.0), true);
        assert!((scaled.line_width - 6.0).abs() < 1e-5);
        let kept = path.transformed(&Affine2D::scale(3.0, 3.0), false);
        assert_eq!(kept.line_width, 2.0);
    }

    #[test]
    fn test_fill_rule_text() {
        assert_eq!("evenodd".parse::<FillRule>().unwrap(), FillRule::EvenOdd);
        assert_eq!(FillRule::NonZero.to_string(), "nonzero");
        assert!("winding".parse::<FillRule>().is_err());
    }

    #[test]
    fn test_quad_elevation_hits_endpoints() {
        let mut s = Subpath::new();
        s.move_to(Point::new(0.0, 0.0));
        s.quad_to(Point::new(50.0, 100.0), Point::new(100.0, 0.0));
        let mid = s.evaluate(0.5).unwrap();
        assert!(mid.is_equal_approx(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_is_inside_follows_fill_rule() {
        let mut path = Path::new();
        path.add_subpath(Subpath::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        path.add_subpath(Subpath::rect(Rect::new(2.5, 2.5, 5.0, 5.0)));

        assert!(path.is_inside(Point::new(1.0, 1.0)));
        assert!(path.is_inside(Point::new(5.0, 5.0)));
        assert!(!path.is_inside(Point::new(11.0, 5.0)));

        path.fill_rule = FillRule::EvenOdd;
        assert!(path.is_inside(Point::new(1.0, 1.0)));
        assert!(!path.is_inside(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_is_inside_curved_and_open() {
        let mut circle = Path::new();
        circle.add_subpath(Subpath::ellipse(0.0, 0.0, 10.0, 10.0));
        assert!(circle.is_inside(Point::new(6.0, 6.0)));
        // inside the bounding box, outside the circle
        assert!(!circle.is_inside(Point::new(9.0, 9.0)));

        // open outlines close implicitly
        let mut open = Path::new();
        open.add_subpath(line_subpath());
        assert!(open.is_inside(Point::new(25.0, 5.0)));
        assert!(!open.is_inside(Point::new(5.0, 25.0)));
        assert!(!Path::new().is_inside(Point::ZERO));
    }
}

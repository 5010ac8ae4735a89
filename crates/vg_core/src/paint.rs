//! Fill and line paints
//!
//! A [`Paint`] is either a solid color or a gradient. Gradients share a
//! [`ColorRamp`] (the list of color stops) and differ in how a point in user
//! space is mapped onto the ramp parameter `t`.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::color::Color;
use crate::geometry::{Affine2D, Point};

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    /// Color at this stop
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// How gradient colors are spread outside the 0..1 range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spread {
    /// Clamp to edge colors
    #[default]
    Pad,
    /// Mirror the gradient pattern
    Reflect,
    /// Repeat the gradient pattern
    Repeat,
}

impl Spread {
    /// Map an unbounded gradient parameter into 0..=1
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Spread::Pad => t.clamp(0.0, 1.0),
            Spread::Repeat => t - t.floor(),
            Spread::Reflect => {
                let t_mod = t.abs() % 2.0;
                if t_mod > 1.0 {
                    2.0 - t_mod
                } else {
                    t_mod
                }
            }
        }
    }
}

/// Ordered list of color stops
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: SmallVec<[GradientStop; 4]>,
}

impl Default for ColorRamp {
    /// Black at 0, white at 1
    fn default() -> Self {
        Self {
            stops: smallvec![
                GradientStop::new(0.0, Color::BLACK),
                GradientStop::new(1.0, Color::WHITE),
            ],
        }
    }
}

impl ColorRamp {
    /// A ramp without stops
    pub fn empty() -> Self {
        Self {
            stops: SmallVec::new(),
        }
    }

    /// Build a ramp from unordered stops
    pub fn from_stops(stops: impl IntoIterator<Item = GradientStop>) -> Self {
        let mut ramp = Self::empty();
        for stop in stops {
            ramp.add_stop(stop.offset, stop.color);
        }
        ramp
    }

    /// Insert a stop, keeping stops sorted by offset. Stops with equal
    /// offsets keep their insertion order.
    pub fn add_stop(&mut self, offset: f32, color: Color) {
        let stop = GradientStop::new(offset, color);
        let index = self.stops.partition_point(|s| s.offset <= stop.offset);
        self.stops.insert(index, stop);
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn offsets(&self) -> Vec<f32> {
        self.stops.iter().map(|s| s.offset).collect()
    }

    pub fn colors(&self) -> Vec<Color> {
        self.stops.iter().map(|s| s.color).collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Color of the last stop, transparent for an empty ramp
    pub fn last_color(&self) -> Color {
        self.stops
            .last()
            .map(|s| s.color)
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Sample the ramp at `t` (already spread into 0..=1)
    pub fn sample(&self, t: f32) -> Color {
        let stops = &self.stops;
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return Color::TRANSPARENT;
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        for pair in stops.windows(2) {
            let (s0, s1) = (&pair[0], &pair[1]);
            if t >= s0.offset && t <= s1.offset {
                let range = s1.offset - s0.offset;
                if range < 0.0001 {
                    return s0.color;
                }
                return Color::lerp(&s0.color, &s1.color, (t - s0.offset) / range);
            }
        }

        last.color
    }
}

/// Gradient along the line from `p1` to `p2`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub p1: Point,
    pub p2: Point,
    pub ramp: ColorRamp,
    #[serde(default)]
    pub spread: Spread,
}

impl LinearGradient {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            ramp: ColorRamp::default(),
            spread: Spread::Pad,
        }
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    /// Gradient parameter of `point` before spreading, `None` when degenerate
    pub fn parameter(&self, point: Point) -> Option<f32> {
        let axis = self.p2 - self.p1;
        let len_sq = axis.dot(axis);
        if len_sq <= f32::EPSILON {
            return None;
        }
        Some((point - self.p1).dot(axis) / len_sq)
    }
}

/// Two-point radial gradient: `t = 0` at `focal`, `t = 1` on the circle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub center: Point,
    pub focal: Point,
    pub radius: f32,
    pub ramp: ColorRamp,
    #[serde(default)]
    pub spread: Spread,
}

impl RadialGradient {
    pub fn new(center: Point, focal: Point, radius: f32) -> Self {
        Self {
            center,
            focal,
            radius,
            ramp: ColorRamp::default(),
            spread: Spread::Pad,
        }
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    /// Gradient parameter of `point` before spreading, `None` when degenerate
    pub fn parameter(&self, point: Point) -> Option<f32> {
        if self.radius <= 0.0 {
            return None;
        }

        // A focal point outside the circle is pulled just inside it
        let mut focal = self.focal;
        let offset = focal - self.center;
        let offset_len = offset.length();
        if offset_len >= self.radius {
            focal = self.center + offset * (self.radius * 0.999 / offset_len);
        }

        let dir = point - focal;
        let dir_len_sq = dir.dot(dir);
        if dir_len_sq <= f32::EPSILON {
            return Some(0.0);
        }

        // Solve |focal + s * dir - center| = radius for the positive root;
        // `point` sits at s = 1, so t = 1 / s.
        let fc = focal - self.center;
        let b = 2.0 * dir.dot(fc);
        let c = fc.dot(fc) - self.radius * self.radius;
        let disc = b * b - 4.0 * dir_len_sq * c;
        if disc < 0.0 {
            return None;
        }
        let s = (-b + disc.sqrt()) / (2.0 * dir_len_sq);
        if s <= 0.0 {
            return None;
        }
        Some(1.0 / s)
    }
}

/// Fill or line paint of a path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Color(Color),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Paint::LinearGradient(gradient)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Paint::RadialGradient(gradient)
    }
}

impl Paint {
    /// Registered class name of this paint kind
    pub fn class_name(&self) -> &'static str {
        match self {
            Paint::Color(_) => "VGColor",
            Paint::LinearGradient(_) => "VGLinearGradient",
            Paint::RadialGradient(_) => "VGRadialGradient",
        }
    }

    pub fn is_gradient(&self) -> bool {
        !matches!(self, Paint::Color(_))
    }

    /// Color ramp shared by gradient paints
    pub fn ramp(&self) -> Option<&ColorRamp> {
        match self {
            Paint::Color(_) => None,
            Paint::LinearGradient(g) => Some(&g.ramp),
            Paint::RadialGradient(g) => Some(&g.ramp),
        }
    }

    pub fn ramp_mut(&mut self) -> Option<&mut ColorRamp> {
        match self {
            Paint::Color(_) => None,
            Paint::LinearGradient(g) => Some(&mut g.ramp),
            Paint::RadialGradient(g) => Some(&mut g.ramp),
        }
    }

    /// Representative solid color (the color itself, or the first stop)
    pub fn solid_color(&self) -> Color {
        match self {
            Paint::Color(c) => *c,
            _ => self
                .ramp()
                .and_then(|r| r.stops().first())
                .map(|s| s.color)
                .unwrap_or(Color::TRANSPARENT),
        }
    }

    /// Evaluate the paint at a point in user space
    pub fn color_at(&self, point: Point) -> Color {
        match self {
            Paint::Color(c) => *c,
            Paint::LinearGradient(g) => match g.parameter(point) {
                Some(t) => g.ramp.sample(g.spread.apply(t)),
                None => g.ramp.last_color(),
            },
            Paint::RadialGradient(g) => match g.parameter(point) {
                Some(t) => g.ramp.sample(g.spread.apply(t)),
                None => g.ramp.last_color(),
            },
        }
    }

    /// Map the paint geometry through `transform`
    ///
    /// Radial radii are scaled by the transform's mean scale, so skewed or
    /// non-uniformly scaled radial gradients stay circular.
    pub fn transformed(&self, transform: &Affine2D) -> Paint {
        match self {
            Paint::Color(c) => Paint::Color(*c),
            Paint::LinearGradient(g) => Paint::LinearGradient(LinearGradient {
                p1: transform.transform_point(g.p1),
                p2: transform.transform_point(g.p2),
                ramp: g.ramp.clone(),
                spread: g.spread,
            }),
            Paint::RadialGradient(g) => Paint::RadialGradient(RadialGradient {
                center: transform.transform_point(g.center),
                focal: transform.transform_point(g.focal),
                radius: g.radius * transform.mean_scale(),
                ramp: g.ramp.clone(),
                spread: g.spread,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-3
            && (a.g - b.g).abs() < 1e-3
            && (a.b - b.b).abs() < 1e-3
            && (a.a - b.a).abs() < 1e-3
    }

    #[test]
    fn test_default_ramp_is_black_to_white() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.offsets(), vec![0.0, 1.0]);
        assert_eq!(ramp.colors(), vec![Color::BLACK, Color::WHITE]);
    }

    #[test]
    fn test_add_stop_keeps_order() {
        let mut ramp = ColorRamp::empty();
        ramp.add_stop(0.8, Color::BLUE);
        ramp.add_stop(0.1, Color::RED);
        ramp.add_stop(0.5, Color::GREEN);
        assert_eq!(ramp.offsets(), vec![0.1, 0.5, 0.8]);
        assert_eq!(ramp.sample(0.0), Color::RED);
        assert_eq!(ramp.sample(1.0), Color::BLUE);
        assert!(close(ramp.sample(0.3), Color::lerp(&Color::RED, &Color::GREEN, 0.5)));
    }

    #[test]
    fn test_empty_ramp_samples_transparent() {
        assert_eq!(ColorRamp::empty().sample(0.5), Color::TRANSPARENT);
    }

    #[test]
    fn test_spread_modes() {
        assert_eq!(Spread::Pad.apply(1.5), 1.0);
        assert!((Spread::Repeat.apply(1.25) - 0.25).abs() < 1e-6);
        assert!((Spread::Reflect.apply(1.25) - 0.75).abs() < 1e-6);
        assert!((Spread::Repeat.apply(-0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_linear_gradient_projection() {
        let paint = Paint::from(LinearGradient::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert!(close(paint.color_at(Point::new(0.0, 50.0)), Color::BLACK));
        assert!(close(paint.color_at(Point::new(50.0, -20.0)), Color::rgb(0.5, 0.5, 0.5)));
        assert!(close(paint.color_at(Point::new(200.0, 0.0)), Color::WHITE));
    }

    #[test]
    fn test_degenerate_linear_uses_last_color() {
        let paint = Paint::from(LinearGradient::new(Point::new(3.0, 3.0), Point::new(3.0, 3.0)));
        assert_eq!(paint.color_at(Point::new(10.0, 10.0)), Color::WHITE);
    }

    #[test]
    fn test_radial_gradient_centered() {
        let g = RadialGradient::new(Point::ZERO, Point::ZERO, 10.0);
        assert!((g.parameter(Point::new(5.0, 0.0)).unwrap() - 0.5).abs() < 1e-4);
        assert!((g.parameter(Point::new(0.0, -10.0)).unwrap() - 1.0).abs() < 1e-4);
        assert_eq!(g.parameter(Point::ZERO), Some(0.0));
    }

    #[test]
    fn test_radial_gradient_with_focal() {
        let g = RadialGradient::new(Point::ZERO, Point::new(5.0, 0.0), 10.0);
        // On the ray through the focal point towards +x the circle is 5 away
        assert!((g.parameter(Point::new(7.5, 0.0)).unwrap() - 0.5).abs() < 1e-4);
        // Towards -x the circle is 15 away
        assert!((g.parameter(Point::new(-2.5, 0.0)).unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_transformed_radial_scales_radius() {
        let paint = Paint::from(RadialGradient::new(Point::ZERO, Point::ZERO, 10.0));
        let moved = paint.transformed(&Affine2D::translation(5.0, 5.0).then(&Affine2D::scale(2.0, 2.0)));
        match moved {
            Paint::RadialGradient(g) => {
                assert_eq!(g.center, Point::new(5.0, 5.0));
                assert!((g.radius - 20.0).abs() < 1e-5);
            }
            other => panic!("unexpected paint {other:?}"),
        }
    }

    #[test]
    fn test_class_names() {
        assert_eq!(Paint::from(Color::RED).class_name(), "VGColor");
        assert!(!Paint::from(Color::RED).is_gradient());
        assert!(Paint::from(LinearGradient::new(Point::ZERO, Point::new(1.0, 0.0))).is_gradient());
    }
}

//! SVG style conversion to paints and line styles

use vg_core::{
    Affine2D, Color, ColorRamp, FillRule, GradientStop, LineCap, LineJoin, LinearGradient, Paint,
    Path, Point, RadialGradient, Spread,
};

use crate::path::to_affine;

fn color(c: usvg::Color, opacity: f32) -> Color {
    Color::rgba(
        c.red as f32 / 255.0,
        c.green as f32 / 255.0,
        c.blue as f32 / 255.0,
        opacity,
    )
}

fn ramp(stops: &[usvg::Stop], opacity: f32) -> ColorRamp {
    ColorRamp::from_stops(stops.iter().map(|s| {
        GradientStop::new(s.offset().get(), color(s.color(), s.opacity().get() * opacity))
    }))
}

fn spread(method: usvg::SpreadMethod) -> Spread {
    match method {
        usvg::SpreadMethod::Pad => Spread::Pad,
        usvg::SpreadMethod::Reflect => Spread::Reflect,
        usvg::SpreadMethod::Repeat => Spread::Repeat,
    }
}

/// Convert a usvg paint to a paint in the space `transform` maps into
pub fn paint_to_vg(paint: &usvg::Paint, opacity: f32, transform: &Affine2D) -> Paint {
    match paint {
        usvg::Paint::Color(c) => Paint::Color(color(*c, opacity)),
        usvg::Paint::LinearGradient(lg) => {
            let gradient = LinearGradient {
                p1: Point::new(lg.x1(), lg.y1()),
                p2: Point::new(lg.x2(), lg.y2()),
                ramp: ramp(lg.stops(), opacity),
                spread: spread(lg.spread_method()),
            };
            Paint::from(gradient).transformed(&transform.then(&to_affine(&lg.transform())))
        }
        usvg::Paint::RadialGradient(rg) => {
            let gradient = RadialGradient {
                center: Point::new(rg.cx(), rg.cy()),
                focal: Point::new(rg.fx(), rg.fy()),
                radius: rg.r().get(),
                ramp: ramp(rg.stops(), opacity),
                spread: spread(rg.spread_method()),
            };
            Paint::from(gradient).transformed(&transform.then(&to_affine(&rg.transform())))
        }
        // Patterns are not supported - use a neutral fallback color
        usvg::Paint::Pattern(_) => Paint::Color(Color::rgba(0.5, 0.5, 0.5, opacity)),
    }
}

/// Apply an SVG fill to a path
pub fn apply_fill(path: &mut Path, fill: &usvg::Fill, transform: &Affine2D) {
    path.fill = Some(paint_to_vg(fill.paint(), fill.opacity().get(), transform));
    path.fill_rule = match fill.rule() {
        usvg::FillRule::NonZero => FillRule::NonZero,
        usvg::FillRule::EvenOdd => FillRule::EvenOdd,
    };
}

/// Apply an SVG stroke to a path; the width follows the transform's scale
pub fn apply_stroke(path: &mut Path, stroke: &usvg::Stroke, transform: &Affine2D) {
    path.line = Some(paint_to_vg(stroke.paint(), stroke.opacity().get(), transform));
    path.line_width = stroke.width().get() * transform.mean_scale();
    path.miter_limit = stroke.miterlimit().get();
    path.line_cap = match stroke.linecap() {
        usvg::LineCap::Butt => LineCap::Butt,
        usvg::LineCap::Round => LineCap::Round,
        usvg::LineCap::Square => LineCap::Square,
    };
    path.line_join = match stroke.linejoin() {
        usvg::LineJoin::Miter | usvg::LineJoin::MiterClip => LineJoin::Miter,
        usvg::LineJoin::Round => LineJoin::Round,
        usvg::LineJoin::Bevel => LineJoin::Bevel,
    };
}

//! CPU rasterization of graphics using tiny-skia
//!
//! Produces straight-alpha RGBA8 textures that cover the bounds of the
//! graphics (strokes included) at a given pixels-per-unit scale.

use std::path::Path as FsPath;

use tiny_skia::{
    FillRule as SkFillRule, GradientStop as SkGradientStop, LineCap as SkLineCap,
    LineJoin as SkLineJoin, Pixmap, Shader, SpreadMode, Stroke, Transform,
};
use vg_core::{
    Color, ColorRamp, FillRule, Graphics, LineCap, LineJoin, Paint, Path, Rect, Spread, Texture,
};

use crate::error::RenderError;

/// Bounds of the graphics grown by half of the widest stroke
fn painted_bounds(graphics: &Graphics) -> Rect {
    let bounds = graphics.bounds();
    let half_line = graphics
        .paths()
        .iter()
        .filter(|p| p.line.is_some())
        .map(|p| p.line_width / 2.0)
        .fold(0.0_f32, f32::max);
    Rect::new(
        bounds.x() - half_line,
        bounds.y() - half_line,
        bounds.width() + half_line * 2.0,
        bounds.height() + half_line * 2.0,
    )
}

fn sk_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn sk_point(p: vg_core::Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x, p.y)
}

fn sk_stops(ramp: &ColorRamp) -> Vec<SkGradientStop> {
    ramp.stops()
        .iter()
        .map(|s| SkGradientStop::new(s.offset, sk_color(s.color)))
        .collect()
}

fn sk_spread(spread: Spread) -> SpreadMode {
    match spread {
        Spread::Pad => SpreadMode::Pad,
        Spread::Reflect => SpreadMode::Reflect,
        Spread::Repeat => SpreadMode::Repeat,
    }
}

/// Shader for a paint; degenerate gradients fall back to their last color
fn shader(paint: &Paint) -> Shader<'static> {
    let gradient = match paint {
        Paint::Color(c) => return Shader::SolidColor(sk_color(*c)),
        Paint::LinearGradient(g) => tiny_skia::LinearGradient::new(
            sk_point(g.p1),
            sk_point(g.p2),
            sk_stops(&g.ramp),
            sk_spread(g.spread),
            Transform::identity(),
        ),
        Paint::RadialGradient(g) => tiny_skia::RadialGradient::new(
            sk_point(g.focal),
            sk_point(g.center),
            g.radius,
            sk_stops(&g.ramp),
            sk_spread(g.spread),
            Transform::identity(),
        ),
    };
    gradient.unwrap_or_else(|| Shader::SolidColor(sk_color(paint.solid_color())))
}

fn sk_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
    tiny_skia::Paint {
        shader: shader(paint),
        anti_alias: true,
        ..Default::default()
    }
}

fn sk_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for subpath in &path.subpaths {
        let points = subpath.points();
        let Some(first) = points.first() else {
            continue;
        };
        pb.move_to(first.x, first.y);
        for curve in points[1..].chunks_exact(3) {
            pb.cubic_to(curve[0].x, curve[0].y, curve[1].x, curve[1].y, curve[2].x, curve[2].y);
        }
        if subpath.is_closed() {
            pb.close();
        }
    }
    pb.finish()
}

fn sk_stroke(path: &Path) -> Stroke {
    Stroke {
        width: path.line_width,
        miter_limit: path.miter_limit,
        line_cap: match path.line_cap {
            LineCap::Butt => SkLineCap::Butt,
            LineCap::Round => SkLineCap::Round,
            LineCap::Square => SkLineCap::Square,
        },
        line_join: match path.line_join {
            LineJoin::Miter => SkLineJoin::Miter,
            LineJoin::Round => SkLineJoin::Round,
            LineJoin::Bevel => SkLineJoin::Bevel,
        },
        dash: None,
    }
}

/// Rasterize graphics at `scale` pixels per unit
pub fn rasterize(graphics: &Graphics, scale: f32) -> Result<Texture, RenderError> {
    let bounds = painted_bounds(graphics);
    let width = ((bounds.width() * scale).ceil() as u32).max(1);
    let height = ((bounds.height() * scale).ceil() as u32).max(1);

    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
    let transform = Transform::from_scale(scale, scale).pre_translate(-bounds.x(), -bounds.y());

    for path in graphics.paths() {
        let Some(sk) = sk_path(path) else {
            continue;
        };
        if let Some(fill) = &path.fill {
            let rule = match path.fill_rule {
                FillRule::NonZero => SkFillRule::Winding,
                FillRule::EvenOdd => SkFillRule::EvenOdd,
            };
            pixmap.fill_path(&sk, &sk_paint(fill), rule, transform, None);
        }
        if let Some(line) = &path.line {
            if path.line_width > 0.0 {
                pixmap.stroke_path(&sk, &sk_paint(line), &sk_stroke(path), transform, None);
            }
        }
    }

    tracing::debug!(width, height, scale, "rasterized graphics");

    Ok(Texture {
        width,
        height,
        origin: bounds.origin,
        scale,
        pixels: unpremultiply_alpha(pixmap.data()),
    })
}

/// Write a texture as a PNG file
pub fn save_png(texture: &Texture, path: impl AsRef<FsPath>) -> Result<(), RenderError> {
    image::save_buffer(
        path,
        &texture.pixels,
        texture.width,
        texture.height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Convert premultiplied alpha to straight alpha
///
/// tiny-skia outputs premultiplied alpha; textures hold straight alpha.
fn unpremultiply_alpha(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());

    for chunk in data.chunks_exact(4) {
        let a = chunk[3] as f32 / 255.0;
        if a > 0.0 {
            let r = (chunk[0] as f32 / a).min(255.0) as u8;
            let g = (chunk[1] as f32 / a).min(255.0) as u8;
            let b = (chunk[2] as f32 / a).min(255.0) as u8;
            result.extend_from_slice(&[r, g, b, chunk[3]]);
        } else {
            result.extend_from_slice(&[0, 0, 0, 0]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use vg_core::{Point, Subpath};

    fn square(x: f32, y: f32, size: f32, color: Color) -> Path {
        let mut path = Path::new().with_fill(color);
        path.add_subpath(Subpath::rect(Rect::new(x, y, size, size)));
        path
    }

    #[test]
    fn test_rasterize_covers_bounds() {
        let graphics = Graphics::from_paths(vec![square(10.0, 20.0, 8.0, Color::RED)]);
        let texture = rasterize(&graphics, 2.0).unwrap();
        assert_eq!((texture.width, texture.height), (16, 16));
        assert_eq!(texture.origin, Point::new(10.0, 20.0));
        assert_eq!(texture.pixels.len(), 16 * 16 * 4);
        assert_eq!(texture.pixel(8, 8), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_grows_texture() {
        let path = square(0.0, 0.0, 10.0, Color::RED).with_line(Color::BLACK, 4.0);
        let texture = rasterize(&Graphics::from_paths(vec![path]), 1.0).unwrap();
        assert_eq!((texture.width, texture.height), (14, 14));
        assert_eq!(texture.origin, Point::new(-2.0, -2.0));
        assert_eq!(texture.pixel(0, 7), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_empty_graphics_yield_single_transparent_pixel() {
        let texture = rasterize(&Graphics::new(), 1.0).unwrap();
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_unpremultiply() {
        assert_eq!(unpremultiply_alpha(&[64, 0, 0, 128]), vec![127, 0, 0, 128]);
        assert_eq!(unpremultiply_alpha(&[10, 10, 10, 0]), vec![0, 0, 0, 0]);
    }
}

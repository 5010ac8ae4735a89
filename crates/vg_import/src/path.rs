//! SVG path conversion to subpaths

use usvg::tiny_skia_path::PathSegment;
use vg_core::{Affine2D, Point, Subpath};

/// Convert a usvg transform to an affine transform
pub fn to_affine(t: &usvg::Transform) -> Affine2D {
    Affine2D::new(t.sx, t.ky, t.kx, t.sy, t.tx, t.ty)
}

/// Convert usvg path data to subpaths mapped through `transform`
///
/// Lines and quadratic segments are elevated to cubic curves; `Close` ends
/// the current subpath.
pub fn usvg_path_to_subpaths(
    path_data: &usvg::tiny_skia_path::Path,
    transform: &Affine2D,
) -> Vec<Subpath> {
    let mut subpaths = Vec::new();
    let mut current = Subpath::new();

    let mut flush = |current: &mut Subpath| {
        if current.num_points() > 1 {
            let mut done = std::mem::take(current);
            done.transform(transform);
            subpaths.push(done);
        } else {
            current.set_points(&[]);
        }
    };

    for segment in path_data.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                flush(&mut current);
                current.move_to(Point::new(p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                current.line_to(Point::new(p.x, p.y));
            }
            PathSegment::QuadTo(c, e) => {
                current.quad_to(Point::new(c.x, c.y), Point::new(e.x, e.y));
            }
            PathSegment::CubicTo(c1, c2, e) => {
                current.cubic_to(
                    Point::new(c1.x, c1.y),
                    Point::new(c2.x, c2.y),
                    Point::new(e.x, e.y),
                );
            }
            PathSegment::Close => {
                current.set_closed(true);
                flush(&mut current);
            }
        }
    }
    flush(&mut current);

    subpaths
}

#[cfg(test)]
mod tests {
    use super::*;
    use usvg::tiny_skia_path::PathBuilder;

    #[test]
    fn test_segments_become_closed_subpaths() {
        let mut pb = PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.line_to(10.0, 0.0);
        pb.quad_to(15.0, 5.0, 10.0, 10.0);
        pb.close();
        pb.move_to(20.0, 20.0);
        pb.cubic_to(21.0, 21.0, 22.0, 22.0, 23.0, 20.0);
        let data = pb.finish().unwrap();

        let subpaths = usvg_path_to_subpaths(&data, &Affine2D::translation(1.0, 0.0));
        assert_eq!(subpaths.len(), 2);
        assert!(subpaths[0].is_closed());
        assert_eq!(subpaths[0].num_curves(), 2);
        assert_eq!(subpaths[0].points()[0], Point::new(1.0, 0.0));
        assert!(!subpaths[1].is_closed());
        assert_eq!(subpaths[1].last_point(), Some(Point::new(24.0, 20.0)));
    }
}

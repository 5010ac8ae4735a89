//! Path tessellation
//!
//! Converts styled paths into colored triangle meshes using lyon.

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::PathEvent;
use vg_core::{FillRule, LineCap, LineJoin, Mesh, MeshVertex, Paint, Path, Point};

/// Maps a tessellated 2D position to an output vertex position
pub type Placement = fn(Point) -> [f32; 3];

/// Keeps 2D coordinates, `z = 0`
pub fn flat(p: Point) -> [f32; 3] {
    [p.x, p.y, 0.0]
}

/// Millimeter-scaled, y-up coordinates for meshes placed in 3D
pub fn spatial(p: Point) -> [f32; 3] {
    [p.x * 0.001, -p.y * 0.001, 0.0]
}

fn to_lyon(p: Point) -> lyon::math::Point {
    point(p.x, p.y)
}

/// Convert the subpaths of a path to lyon path events
fn path_to_lyon_events(path: &Path) -> Vec<PathEvent> {
    let mut events = Vec::new();

    for subpath in &path.subpaths {
        let points = subpath.points();
        if points.len() < 4 {
            continue;
        }
        let first = points[0];
        events.push(PathEvent::Begin { at: to_lyon(first) });

        let mut current = first;
        for curve in points[1..].chunks_exact(3) {
            events.push(PathEvent::Cubic {
                from: to_lyon(current),
                ctrl1: to_lyon(curve[0]),
                ctrl2: to_lyon(curve[1]),
                to: to_lyon(curve[2]),
            });
            current = curve[2];
        }

        events.push(PathEvent::End {
            last: to_lyon(current),
            first: to_lyon(first),
            close: subpath.is_closed(),
        });
    }

    events
}

fn vertex(paint: &Paint, position: lyon::math::Point, place: Placement) -> MeshVertex {
    let p = Point::new(position.x, position.y);
    MeshVertex {
        position: place(p),
        color: paint.color_at(p).to_array(),
    }
}

/// Tessellate the interior of a path, coloring vertices from `paint`
pub fn tessellate_fill(path: &Path, paint: &Paint, tolerance: f32, place: Placement) -> Mesh {
    let events = path_to_lyon_events(path);
    if events.is_empty() {
        return Mesh::new();
    }

    let mut geometry: VertexBuffers<MeshVertex, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    let options = FillOptions::default()
        .with_tolerance(tolerance)
        .with_fill_rule(match path.fill_rule {
            FillRule::NonZero => lyon::lyon_tessellation::FillRule::NonZero,
            FillRule::EvenOdd => lyon::lyon_tessellation::FillRule::EvenOdd,
        });

    let result = tessellator.tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |v: FillVertex| {
            vertex(paint, v.position(), place)
        }),
    );

    if let Err(err) = result {
        tracing::warn!("Path fill tessellation failed: {:?}", err);
        return Mesh::new();
    }

    Mesh {
        vertices: geometry.vertices,
        indices: geometry.indices,
    }
}

/// Tessellate the outline of a path, coloring vertices from `paint`
pub fn tessellate_stroke(path: &Path, paint: &Paint, tolerance: f32, place: Placement) -> Mesh {
    if path.line_width <= 0.0 {
        return Mesh::new();
    }
    let events = path_to_lyon_events(path);
    if events.is_empty() {
        return Mesh::new();
    }

    let mut geometry: VertexBuffers<MeshVertex, u32> = VertexBuffers::new();
    let mut tessellator = StrokeTessellator::new();

    let options = StrokeOptions::default()
        .with_line_width(path.line_width)
        .with_tolerance(tolerance)
        .with_line_cap(match path.line_cap {
            LineCap::Butt => lyon::lyon_tessellation::LineCap::Butt,
            LineCap::Round => lyon::lyon_tessellation::LineCap::Round,
            LineCap::Square => lyon::lyon_tessellation::LineCap::Square,
        })
        .with_line_join(match path.line_join {
            LineJoin::Miter => lyon::lyon_tessellation::LineJoin::Miter,
            LineJoin::Round => lyon::lyon_tessellation::LineJoin::Round,
            LineJoin::Bevel => lyon::lyon_tessellation::LineJoin::Bevel,
        })
        // lyon asserts on limits below 1
        .with_miter_limit(path.miter_limit.max(StrokeOptions::MINIMUM_MITER_LIMIT));

    let result = tessellator.tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |v: StrokeVertex| {
            vertex(paint, v.position(), place)
        }),
    );

    if let Err(err) = result {
        tracing::warn!("Path stroke tessellation failed: {:?}", err);
        return Mesh::new();
    }

    Mesh {
        vertices: geometry.vertices,
        indices: geometry.indices,
    }
}

/// Fill then stroke, as a single mesh
pub fn tessellate_path(path: &Path, tolerance: f32, place: Placement) -> Mesh {
    let mut mesh = Mesh::new();
    if let Some(fill) = &path.fill {
        mesh.append(&tessellate_fill(path, fill, tolerance, place), [0.0; 3]);
    }
    if let Some(line) = &path.line {
        mesh.append(&tessellate_stroke(path, line, tolerance, place), [0.0; 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use vg_core::{Color, LinearGradient, Rect, Subpath};

    fn triangle_area(mesh: &Mesh) -> f32 {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [t[0], t[1], t[2]].map(|i| mesh.vertices[i as usize].position);
                ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
            })
            .sum()
    }

    fn square(rect: Rect) -> Path {
        let mut path = Path::new().with_fill(Color::RED);
        path.add_subpath(Subpath::rect(rect));
        path
    }

    #[test]
    fn test_fill_square() {
        let path = square(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mesh = tessellate_fill(&path, &Paint::Color(Color::RED), 0.1, flat);
        assert!(!mesh.is_empty());
        assert!((triangle_area(&mesh) - 100.0).abs() < 0.01);
        assert!(mesh.vertices.iter().all(|v| v.color == Color::RED.to_array()));
    }

    #[test]
    fn test_even_odd_leaves_hole() {
        let mut path = square(Rect::new(0.0, 0.0, 10.0, 10.0));
        path.add_subpath(Subpath::rect(Rect::new(2.5, 2.5, 5.0, 5.0)));
        let paint = Paint::Color(Color::RED);

        let nonzero = tessellate_fill(&path, &paint, 0.1, flat);
        assert!((triangle_area(&nonzero) - 100.0).abs() < 0.01);

        path.fill_rule = FillRule::EvenOdd;
        let evenodd = tessellate_fill(&path, &paint, 0.1, flat);
        assert!((triangle_area(&evenodd) - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_stroke_covers_outline() {
        let mut path = square(Rect::new(0.0, 0.0, 10.0, 10.0));
        path.line_width = 2.0;
        let mesh = tessellate_stroke(&path, &Paint::Color(Color::BLACK), 0.1, flat);
        let area = mesh.area();
        assert!(area.is_equal_approx(&Rect::new(-1.0, -1.0, 12.0, 12.0)));

        path.line_width = 0.0;
        assert!(tessellate_stroke(&path, &Paint::Color(Color::BLACK), 0.1, flat).is_empty());
    }

    #[test]
    fn test_gradient_vertex_colors() {
        let path = square(Rect::new(0.0, 0.0, 10.0, 10.0));
        let paint = Paint::from(LinearGradient::new(Point::ZERO, Point::new(10.0, 0.0)));
        let mesh = tessellate_fill(&path, &paint, 0.1, flat);
        for v in &mesh.vertices {
            let expected = if v.position[0] < 5.0 { 0.0 } else { 1.0 };
            assert!((v.color[0] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_spatial_placement() {
        let path = square(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        let mesh = tessellate_path(&path, 0.5, spatial);
        let aabb = mesh.aabb();
        assert!((aabb.min[1] + 1.0).abs() < 1e-5);
        assert!((aabb.max[0] - 1.0).abs() < 1e-5);
        assert_eq!(aabb.size()[2], 0.0);
    }

    #[test]
    fn test_open_short_subpaths_are_skipped() {
        let mut path = Path::new().with_fill(Color::RED);
        path.add_subpath(Subpath::from_points(vec![Point::ZERO], false));
        assert!(tessellate_path(&path, 0.1, flat).is_empty());
    }
}

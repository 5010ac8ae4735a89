//! Ordered collections of paths

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine2D, Point, Rect};
use crate::path::Path;

/// A drawing: paths painted in order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    paths: Vec<Path>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths(paths: Vec<Path>) -> Self {
        Self { paths }
    }

    pub fn add_path(&mut self, path: Path) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut [Path] {
        &mut self.paths
    }

    pub fn into_paths(self) -> Vec<Path> {
        self.paths
    }

    pub fn num_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Path::is_empty)
    }

    /// Union of the bounds of all non-empty paths
    pub fn bounds(&self) -> Rect {
        self.paths
            .iter()
            .filter(|p| !p.is_empty())
            .map(Path::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Rect::ZERO)
    }

    /// Index of the topmost path whose fill area contains `point`
    pub fn hit(&self, point: Point) -> Option<usize> {
        self.paths.iter().rposition(|p| p.is_inside(point))
    }

    /// Map every path through `transform`
    pub fn transform(&mut self, transform: &Affine2D, scale_line_width: bool) {
        for path in &mut self.paths {
            path.transform(transform, scale_line_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Subpath;

    #[test]
    fn test_bounds_skip_empty_paths() {
        let mut graphics = Graphics::new();
        graphics.add_path(Path::new());
        let mut path = Path::new();
        path.add_subpath(Subpath::rect(Rect::new(10.0, 10.0, 5.0, 5.0)));
        graphics.add_path(path);
        assert_eq!(graphics.bounds(), Rect::new(10.0, 10.0, 5.0, 5.0));
        assert!(!graphics.is_empty());
        assert!(Graphics::new().is_empty());
    }

    #[test]
    fn test_hit_returns_topmost_path() {
        let square = |x: f32| {
            let mut path = Path::new();
            path.add_subpath(Subpath::rect(Rect::new(x, 0.0, 10.0, 10.0)));
            path
        };
        let graphics = Graphics::from_paths(vec![square(0.0), square(5.0)]);
        assert_eq!(graphics.hit(Point::new(2.0, 5.0)), Some(0));
        assert_eq!(graphics.hit(Point::new(7.0, 5.0)), Some(1));
        assert_eq!(graphics.hit(Point::new(20.0, 5.0)), None);
        assert_eq!(Graphics::new().hit(Point::ZERO), None);
    }
}

//! Fluent path construction
//!
//! Lines and quadratic curves are elevated to cubic curves so every built
//! subpath uses the same control-polygon layout.

use crate::geometry::Point;
use crate::path::{Path, Subpath};

/// Builder for constructing paths with fluent API
///
/// PathBuilder maintains cursor state; `move_to` starts a new subpath and
/// `close` marks the current one closed.
pub struct PathBuilder {
    path: Path,
    current: Subpath,
    cursor: Point,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            path: Path::new(),
            current: Subpath::new(),
            cursor: Point::ZERO,
        }
    }

    /// Start from an existing path, keeping its style
    pub fn from_path(path: Path) -> Self {
        Self {
            path,
            current: Subpath::new(),
            cursor: Point::ZERO,
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let done = std::mem::take(&mut self.current);
            self.path.add_subpath(done);
        }
    }

    fn ensure_started(&mut self) {
        if self.current.is_empty() {
            self.current.move_to(self.cursor);
        }
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.flush();
        self.cursor = Point::new(x, y);
        self.current.move_to(self.cursor);
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.ensure_started();
        self.cursor = Point::new(x, y);
        self.current.line_to(self.cursor);
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.ensure_started();
        self.cursor = Point::new(x, y);
        self.current.quad_to(Point::new(cx, cy), self.cursor);
        self
    }

    pub fn cubic_to(mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> Self {
        self.ensure_started();
        self.cursor = Point::new(x, y);
        self.current
            .cubic_to(Point::new(c1x, c1y), Point::new(c2x, c2y), self.cursor);
        self
    }

    /// Close the current subpath; the cursor returns to its start
    pub fn close(mut self) -> Self {
        if let Some(start) = self.current.points().first().copied() {
            self.current.set_closed(true);
            self.cursor = start;
        }
        self.flush();
        self
    }

    pub fn build(mut self) -> Path {
        self.flush();
        self.path
    }

    /// Get the current cursor position
    pub fn current_position(&self) -> Point {
        self.cursor
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

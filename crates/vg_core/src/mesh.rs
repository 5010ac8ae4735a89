//! Renderer output types
//!
//! Meshes are plain indexed triangle lists with per-vertex colors. 2D meshes
//! keep `z = 0`; spatial meshes are already in 3D units.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// A vertex of a tessellated path
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Indexed triangle list
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append `other`, moving its vertices by `offset`
    pub fn append(&mut self, other: &Mesh, offset: [f32; 3]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().map(|v| MeshVertex {
            position: [
                v.position[0] + offset[0],
                v.position[1] + offset[1],
                v.position[2] + offset[2],
            ],
            color: v.color,
        }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn aabb(&self) -> Aabb {
        let Some(first) = self.vertices.first() else {
            return Aabb::default();
        };
        let mut aabb = Aabb {
            min: first.position,
            max: first.position,
        };
        for v in &self.vertices {
            for axis in 0..3 {
                aabb.min[axis] = aabb.min[axis].min(v.position[axis]);
                aabb.max[axis] = aabb.max[axis].max(v.position[axis]);
            }
        }
        aabb
    }

    /// 2D bounds of the vertex positions
    pub fn area(&self) -> Rect {
        Rect::bounding(
            self.vertices
                .iter()
                .map(|v| Point::new(v.position[0], v.position[1])),
        )
        .unwrap_or(Rect::ZERO)
    }
}

/// Material flags attached to rendered meshes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshMaterial {
    pub albedo_from_vertex_color: bool,
    pub depth_draw_always: bool,
    pub depth_test_disabled: bool,
    pub cull_disabled: bool,
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self {
            albedo_from_vertex_color: true,
            depth_draw_always: false,
            depth_test_disabled: false,
            cull_disabled: false,
        }
    }
}

impl MeshMaterial {
    /// Material for flat vector meshes placed in 3D: vertex colors, always
    /// drawn on top, visible from both sides
    pub fn spatial() -> Self {
        Self {
            albedo_from_vertex_color: true,
            depth_draw_always: true,
            depth_test_disabled: true,
            cull_disabled: true,
        }
    }
}

/// Straight-alpha RGBA8 image
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Top-left corner of the image in path units
    pub origin: Point,
    /// Pixels per path unit
    pub scale: f32,
    pub pixels: Vec<u8>,
}

impl Texture {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Result of rendering graphics into a mesh
#[derive(Clone, Debug, Default)]
pub struct RenderedMesh {
    pub mesh: Mesh,
    pub material: Option<MeshMaterial>,
    pub texture: Option<Texture>,
    /// 2D area covered by the geometry, [`Rect::ZERO`] when nothing was emitted
    pub area: Rect,
}

impl RenderedMesh {
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

//! CPU-side mesh representation produced by the OBJ loader.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::material::MaterialId;

/// Interleaved vertex: homogeneous position, normal (w = 0) and uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub uv: [f32; 2],
}

impl ObjVertex {
    pub const POSITION_OFFSET: usize = 0;
    pub const NORMAL_OFFSET: usize = Self::POSITION_OFFSET + size_of::<[f32; 4]>();
    pub const UV_OFFSET: usize = Self::NORMAL_OFFSET + size_of::<[f32; 4]>();
    pub const STRIDE: usize = size_of::<Self>();

    pub fn new(position: Vec4, normal: Vec4, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec4 {
        Vec4::from_array(self.position)
    }

    #[inline]
    pub fn normal(&self) -> Vec4 {
        Vec4::from_array(self.normal)
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

impl Default for ObjVertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0, 1.0],
            normal: [0.0; 4],
            uv: [0.0; 2],
        }
    }
}

/// One group of a model: its own vertices, fan-triangulated indices and an
/// optional material owned by the parent model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMesh {
    pub name: String,
    pub vertices: Vec<ObjVertex>,
    pub indices: Vec<u32>,
    pub material: Option<MaterialId>,
}

impl ObjMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer as raw bytes, laid out per [`ObjVertex::STRIDE`].
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Flat normal of the triangle `a, b, c` (winding order decides the sign).
    /// Degenerate triangles yield a zero vector.
    ///
    /// # Panics
    ///
    /// Panics if any index is outside `self.vertices`.
    pub fn calculate_face_normal(&self, a: u32, b: u32, c: u32) -> Vec4 {
        let p = |i: u32| self.vertices[i as usize].position().truncate();
        let (a, b, c) = (p(a), p(b), p(c));
        (b - a).cross(c - a).normalize_or_zero().extend(0.0)
    }

    /// Assign every triangle's face normal to its three vertices.
    pub fn calculate_face_normals(&mut self) {
        self.calculate_face_normals_from(0);
    }

    /// Like [`Self::calculate_face_normals`], starting at triangle `first`.
    ///
    /// # Panics
    ///
    /// Panics if an index of those triangles is outside `self.vertices`.
    pub fn calculate_face_normals_from(&mut self, first: usize) {
        for tri in first..self.triangle_count() {
            let [a, b, c] = [
                self.indices[tri * 3],
                self.indices[tri * 3 + 1],
                self.indices[tri * 3 + 2],
            ];
            let normal = self.calculate_face_normal(a, b, c).to_array();
            for i in [a, b, c] {
                self.vertices[i as usize].normal = normal;
            }
        }
    }
}

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec3;

/// Vertex layout shared by faces and edges.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BrushVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl BrushVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    #[inline]
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BrushVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Append-only vertex list sized up front by the count pass.
#[derive(Debug)]
pub struct VertexListBuilder {
    vertices: Vec<BrushVertex>,
    capacity: usize,
}

impl VertexListBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn push(&mut self, vertex: BrushVertex) {
        debug_assert!(self.vertices.len() < self.capacity, "vertex list overflow");
        self.vertices.push(vertex);
    }

    pub fn extend_from_slice(&mut self, vertices: &[BrushVertex]) {
        debug_assert!(
            self.vertices.len() + vertices.len() <= self.capacity,
            "vertex list overflow: {} + {} > {}",
            self.vertices.len(),
            vertices.len(),
            self.capacity
        );
        self.vertices.extend_from_slice(vertices);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Seals the list. The count pass and the collect pass must agree exactly.
    pub fn finish(self) -> VertexArray {
        debug_assert_eq!(self.vertices.len(), self.capacity, "vertex count/collect mismatch");
        if self.vertices.len() != self.capacity {
            log::warn!(
                "vertex list: collected {} vertices, counted {}",
                self.vertices.len(),
                self.capacity
            );
        }
        VertexArray { vertices: self.vertices }
    }
}

/// Immutable vertex storage shared by every index bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArray {
    vertices: Vec<BrushVertex>,
}

impl VertexArray {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[BrushVertex] {
        &self.vertices
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

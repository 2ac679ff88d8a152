use crate::coords::Vec3;

use super::NodeId;

/// Index of a face inside a brush node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FaceRef {
    pub brush: NodeId,
    pub face: usize,
}

impl FaceRef {
    #[inline]
    pub const fn new(brush: NodeId, face: usize) -> Self {
        Self { brush, face }
    }
}

/// An edge between two adjacent faces of the same brush.
///
/// Edges are derived when a brush is built and only carry handles to their
/// faces, so they stay valid while face geometry is edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) first: FaceRef,
    pub(crate) second: FaceRef,
    start: Vec3,
    end: Vec3,
}

impl Edge {
    pub fn new(first: FaceRef, second: FaceRef, start: Vec3, end: Vec3) -> Self {
        Self { first, second, start, end }
    }

    #[inline]
    pub fn first_face(&self) -> FaceRef {
        self.first
    }

    #[inline]
    pub fn second_face(&self) -> FaceRef {
        self.second
    }

    #[inline]
    pub fn start(&self) -> Vec3 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Both faces belong to the same brush. Always true for edges built by
    /// [`Brush::from_polygons`](super::Brush::from_polygons).
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.first.brush == self.second.brush
    }

    pub(crate) fn attach(&mut self, brush: NodeId) {
        self.first.brush = brush;
        self.second.brush = brush;
    }
}

//! Draw descriptors handed from the brush renderer to a batch collector.
//!
//! Batches hold `Arc`s to the renderer's current buffers. A later
//! revalidation replaces the renderer's buffers and leaves submitted batches
//! untouched.

use std::ops::Range;
use std::sync::Arc;

use crate::model::MaterialId;
use crate::paint::Color;

use super::buffers::{IndexArray, PrimitiveKind, TexturedIndexArray, VertexArray};

/// Per-frame view switches owned by the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderContext {
    show_faces: bool,
    show_edges: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { show_faces: true, show_edges: true }
    }
}

impl RenderContext {
    pub fn new(show_faces: bool, show_edges: bool) -> Self {
        Self { show_faces, show_edges }
    }

    #[inline]
    pub fn show_faces(&self) -> bool {
        self.show_faces
    }

    #[inline]
    pub fn show_edges(&self) -> bool {
        self.show_edges
    }
}

/// One indexed draw over the shared vertex array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    /// `None` for untextured geometry (edges).
    pub material: Option<MaterialId>,
    pub primitive: PrimitiveKind,
    pub range: Range<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaceBucket {
    Opaque,
    Transparent,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FaceStyle {
    pub color: Color,
    pub grayscale: bool,
    pub tint: Option<Color>,
    /// `Some` for the transparent bucket.
    pub alpha: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct FaceBatch {
    pub bucket: FaceBucket,
    pub vertices: Arc<VertexArray>,
    pub indices: Arc<TexturedIndexArray>,
    pub style: FaceStyle,
}

impl FaceBatch {
    /// One call per material run, in material order.
    pub fn draw_calls(&self) -> impl Iterator<Item = DrawCall> + '_ {
        self.indices.runs().iter().map(|run| DrawCall {
            material: Some(run.material),
            primitive: run.primitive,
            range: run.range.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EdgeBatch {
    pub vertices: Arc<VertexArray>,
    pub indices: Arc<IndexArray>,
    pub color: Color,
    /// Drawn without depth testing.
    pub occluded: bool,
}

impl EdgeBatch {
    pub fn draw_calls(&self) -> impl Iterator<Item = DrawCall> + '_ {
        self.indices.ranges().iter().map(|(primitive, range)| DrawCall {
            material: None,
            primitive: *primitive,
            range: range.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum BatchItem {
    Faces(FaceBatch),
    Edges(EdgeBatch),
}

impl BatchItem {
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        match self {
            BatchItem::Faces(faces) => faces.draw_calls().collect(),
            BatchItem::Edges(edges) => edges.draw_calls().collect(),
        }
    }
}

/// Receives draw descriptors. Items are consumed once, in submission order.
pub trait RenderBatch {
    fn add_one_shot(&mut self, item: BatchItem);
}

/// Collector that keeps every submitted item.
#[derive(Debug, Clone, Default)]
pub struct RecordingBatch {
    items: Vec<BatchItem>,
}

impl RecordingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn face_batches(&self) -> impl Iterator<Item = &FaceBatch> {
        self.items.iter().filter_map(|item| match item {
            BatchItem::Faces(faces) => Some(faces),
            BatchItem::Edges(_) => None,
        })
    }

    pub fn edge_batches(&self) -> impl Iterator<Item = &EdgeBatch> {
        self.items.iter().filter_map(|item| match item {
            BatchItem::Edges(edges) => Some(edges),
            BatchItem::Faces(_) => None,
        })
    }

    pub fn face_batch(&self, bucket: FaceBucket) -> Option<&FaceBatch> {
        self.face_batches().find(|b| b.bucket == bucket)
    }

    pub fn draw_call_count(&self) -> usize {
        self.items.iter().map(|item| item.draw_calls().len()).sum()
    }
}

impl RenderBatch for RecordingBatch {
    fn add_one_shot(&mut self, item: BatchItem) {
        self.items.push(item);
    }
}

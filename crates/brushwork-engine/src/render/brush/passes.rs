//! Count and collect traversals over the renderer's brush list.
//!
//! Each revalidation runs a count pass to size storage exactly and a collect
//! pass to fill it. Both passes of one revalidation must see the same filter,
//! model and brush list, in the same order.

use crate::model::{Brush, BrushVisitor, Face, NodeId};

use super::buffers::{
    IndexArray, IndexArrayBuilder, IndexArraySize, PrimitiveKind, TexturedIndexArray,
    TexturedIndexArrayBuilder, TexturedIndexArraySize, VertexArray, VertexListBuilder,
};
use super::filter::{BrushFilter, BrushRef, FilterContext};

fn shown_faces<'b>(
    filter: &'b dyn BrushFilter,
    ctx: &'b FilterContext<'b>,
    id: NodeId,
    brush: &'b Brush,
) -> impl Iterator<Item = &'b Face> + 'b {
    let brush_ref = BrushRef::new(id, brush);
    brush
        .faces()
        .iter()
        .filter(move |face| filter.show_face(ctx, brush_ref, face))
}

// ── vertices ──────────────────────────────────────────────────────────────

pub(crate) struct CountVertices<'a> {
    filter: &'a dyn BrushFilter,
    ctx: FilterContext<'a>,
    count: usize,
}

impl<'a> CountVertices<'a> {
    pub(crate) fn new(filter: &'a dyn BrushFilter, ctx: FilterContext<'a>) -> Self {
        Self { filter, ctx, count: 0 }
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.count
    }
}

impl BrushVisitor for CountVertices<'_> {
    fn visit_brush(&mut self, id: NodeId, brush: &Brush) {
        self.count += shown_faces(self.filter, &self.ctx, id, brush)
            .map(Face::vertex_count)
            .sum::<usize>();
    }
}

pub(crate) struct CollectVertices<'a> {
    filter: &'a dyn BrushFilter,
    ctx: FilterContext<'a>,
    builder: VertexListBuilder,
}

impl<'a> CollectVertices<'a> {
    pub(crate) fn new(filter: &'a dyn BrushFilter, ctx: FilterContext<'a>, vertex_count: usize) -> Self {
        Self {
            filter,
            ctx,
            builder: VertexListBuilder::with_capacity(vertex_count),
        }
    }

    pub(crate) fn finish(self) -> VertexArray {
        self.builder.finish()
    }
}

impl BrushVisitor for CollectVertices<'_> {
    fn visit_brush(&mut self, id: NodeId, brush: &Brush) {
        for face in shown_faces(self.filter, &self.ctx, id, brush) {
            face.get_vertices(&mut self.builder);
        }
    }
}

// ── indices ───────────────────────────────────────────────────────────────

pub(crate) struct CountIndices<'a> {
    filter: &'a dyn BrushFilter,
    ctx: FilterContext<'a>,
    opaque: TexturedIndexArraySize,
    transparent: TexturedIndexArraySize,
    edges: IndexArraySize,
}

impl<'a> CountIndices<'a> {
    pub(crate) fn new(filter: &'a dyn BrushFilter, ctx: FilterContext<'a>) -> Self {
        Self {
            filter,
            ctx,
            opaque: TexturedIndexArraySize::new(),
            transparent: TexturedIndexArraySize::new(),
            edges: IndexArraySize::new(),
        }
    }
}

impl BrushVisitor for CountIndices<'_> {
    fn visit_brush(&mut self, id: NodeId, brush: &Brush) {
        let transparent = self.filter.transparent(&self.ctx, BrushRef::new(id, brush));
        let faces = if transparent { &mut self.transparent } else { &mut self.opaque };

        for face in shown_faces(self.filter, &self.ctx, id, brush) {
            faces.inc(face.material(), PrimitiveKind::Polygon, face.vertex_count());
            self.edges.inc(PrimitiveKind::LineLoop, face.vertex_count());
        }
    }
}

/// The three index buckets produced by one index revalidation.
pub(crate) struct CollectedIndices {
    pub(crate) opaque: TexturedIndexArray,
    pub(crate) transparent: TexturedIndexArray,
    pub(crate) edges: IndexArray,
    pub(crate) vertex_count: u32,
}

pub(crate) struct CollectIndices<'a> {
    filter: &'a dyn BrushFilter,
    ctx: FilterContext<'a>,
    opaque: TexturedIndexArrayBuilder,
    transparent: TexturedIndexArrayBuilder,
    edges: IndexArrayBuilder,
    next_vertex: u32,
}

impl<'a> CollectIndices<'a> {
    pub(crate) fn new(count: CountIndices<'a>) -> Self {
        Self {
            filter: count.filter,
            ctx: count.ctx,
            opaque: TexturedIndexArrayBuilder::new(&count.opaque),
            transparent: TexturedIndexArrayBuilder::new(&count.transparent),
            edges: IndexArrayBuilder::new(&count.edges),
            next_vertex: 0,
        }
    }

    pub(crate) fn finish(self) -> CollectedIndices {
        CollectedIndices {
            opaque: self.opaque.finish(),
            transparent: self.transparent.finish(),
            edges: self.edges.finish(),
            vertex_count: self.next_vertex,
        }
    }
}

impl BrushVisitor for CollectIndices<'_> {
    fn visit_brush(&mut self, id: NodeId, brush: &Brush) {
        let transparent = self.filter.transparent(&self.ctx, BrushRef::new(id, brush));
        let faces = if transparent { &mut self.transparent } else { &mut self.opaque };

        for face in shown_faces(self.filter, &self.ctx, id, brush) {
            face.get_face_index(self.next_vertex, faces);
            face.get_edge_index(self.next_vertex, &mut self.edges);
            self.next_vertex += face.vertex_count() as u32;
        }
    }
}

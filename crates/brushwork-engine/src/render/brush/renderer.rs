use std::sync::Arc;

use crate::model::{EditorContext, Model, NodeId};
use crate::paint::Color;

use super::batch::{BatchItem, EdgeBatch, FaceBatch, FaceBucket, FaceStyle, RenderBatch, RenderContext};
use super::buffers::{IndexArray, TexturedIndexArray, VertexArray};
use super::filter::{BrushFilter, FilterContext, NoFilter, RevealHidden};
use super::passes::{CollectIndices, CollectVertices, CountIndices, CountVertices};
use super::style::BrushStyle;

/// Number of revalidations performed since construction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RevalidationStats {
    pub vertex_passes: u64,
    pub index_passes: u64,
}

/// Incremental compiler from a brush list to batched draw data.
///
/// Holds non-owning [`NodeId`] handles into a [`Model`]. Vertex and index
/// buffers are rebuilt lazily on the next [`render`](Self::render) after an
/// invalidation, vertices first. Invalidating vertices always invalidates
/// indices too.
///
/// Geometry, selection and visibility changes made outside this renderer
/// must be signalled with [`invalidate`](Self::invalidate) or picked up with
/// [`sync_revisions`](Self::sync_revisions).
pub struct BrushRenderer {
    filter: Box<dyn BrushFilter>,
    brushes: Vec<NodeId>,
    revisions: Vec<(NodeId, Option<u64>)>,

    vertex_array: Arc<VertexArray>,
    opaque: Arc<TexturedIndexArray>,
    transparent: Arc<TexturedIndexArray>,
    edges: Arc<IndexArray>,

    vertices_valid: bool,
    indices_valid: bool,

    style: BrushStyle,
    show_hidden_brushes: bool,
    stats: RevalidationStats,
}

impl BrushRenderer {
    pub fn new(filter: Box<dyn BrushFilter>) -> Self {
        Self {
            filter,
            brushes: Vec::new(),
            revisions: Vec::new(),
            vertex_array: Arc::new(VertexArray::empty()),
            opaque: Arc::new(TexturedIndexArray::empty()),
            transparent: Arc::new(TexturedIndexArray::empty()),
            edges: Arc::new(IndexArray::empty()),
            vertices_valid: true,
            indices_valid: true,
            style: BrushStyle::default(),
            show_hidden_brushes: false,
            stats: RevalidationStats::default(),
        }
    }

    /// Renderer that shows every face, all in the opaque or all in the transparent bucket.
    pub fn unfiltered(transparent: bool) -> Self {
        Self::new(Box::new(NoFilter::new(transparent)))
    }

    // ── structural mutators ───────────────────────────────────────────────

    pub fn add_brushes(&mut self, brushes: &[NodeId]) {
        self.brushes.extend_from_slice(brushes);
        self.invalidate_vertices();
    }

    pub fn set_brushes(&mut self, brushes: Vec<NodeId>) {
        self.brushes = brushes;
        self.invalidate_vertices();
    }

    /// Removes every occurrence of the given handles.
    pub fn remove_brushes(&mut self, brushes: &[NodeId]) {
        let before = self.brushes.len();
        self.brushes.retain(|id| !brushes.contains(id));
        if self.brushes.len() != before {
            self.invalidate_vertices();
        }
    }

    /// Drops all brushes and buffers. The next render with brushes rebuilds everything.
    pub fn clear(&mut self) {
        self.brushes.clear();
        self.revisions.clear();
        self.invalidate_vertices();
    }

    pub fn set_show_hidden_brushes(&mut self, show_hidden_brushes: bool) {
        if self.show_hidden_brushes == show_hidden_brushes {
            return;
        }
        self.show_hidden_brushes = show_hidden_brushes;
        self.invalidate_vertices();
    }

    /// Marks all compiled geometry stale after an external edit.
    pub fn invalidate(&mut self) {
        self.invalidate_vertices();
    }

    /// Invalidates if any brush changed revision since the last vertex
    /// validation. Returns whether it invalidated.
    pub fn sync_revisions(&mut self, model: &Model) -> bool {
        if !self.vertices_valid {
            return false;
        }
        let changed = self
            .revisions
            .iter()
            .any(|&(id, revision)| model.brush(id).map(|b| b.revision()) != revision);
        if changed {
            log::trace!("brush renderer: revision change detected");
            self.invalidate_vertices();
        }
        changed
    }

    fn invalidate_vertices(&mut self) {
        self.invalidate_indices();
        self.vertex_array = Arc::new(VertexArray::empty());
        self.vertices_valid = false;
    }

    fn invalidate_indices(&mut self) {
        self.opaque = Arc::new(TexturedIndexArray::empty());
        self.transparent = Arc::new(TexturedIndexArray::empty());
        self.edges = Arc::new(IndexArray::empty());
        self.indices_valid = false;
    }

    // ── cosmetic setters ──────────────────────────────────────────────────

    pub fn set_style(&mut self, style: BrushStyle) {
        self.style = style;
    }

    pub fn set_face_color(&mut self, color: Color) {
        self.style.face_color = color;
    }

    pub fn set_edge_color(&mut self, color: Color) {
        self.style.edge_color = color;
    }

    pub fn set_occluded_edge_color(&mut self, color: Color) {
        self.style.occluded_edge_color = color;
    }

    pub fn set_show_edges(&mut self, show_edges: bool) {
        self.style.show_edges = show_edges;
    }

    pub fn set_show_occluded_edges(&mut self, show_occluded_edges: bool) {
        self.style.show_occluded_edges = show_occluded_edges;
    }

    pub fn set_grayscale(&mut self, grayscale: bool) {
        self.style.grayscale = grayscale;
    }

    pub fn set_tint(&mut self, tint: bool) {
        self.style.tint = tint;
    }

    pub fn set_tint_color(&mut self, color: Color) {
        self.style.tint_color = color;
    }

    /// Clamped to `0..=1`; non-finite input falls back to opaque.
    pub fn set_transparency_alpha(&mut self, alpha: f32) {
        let alpha = if alpha.is_finite() { alpha } else { 1.0 };
        self.style.transparency_alpha = alpha.clamp(0.0, 1.0);
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Revalidates stale buffers, then submits face and edge batches.
    ///
    /// Does nothing while the brush list is empty.
    pub fn render(
        &mut self,
        model: &Model,
        editor: &EditorContext,
        ctx: &RenderContext,
        batch: &mut dyn RenderBatch,
    ) {
        if self.brushes.is_empty() {
            return;
        }

        let filter_ctx = FilterContext::new(model, editor);
        if !self.vertices_valid {
            self.validate_vertices(filter_ctx);
        }
        if !self.indices_valid {
            self.validate_indices(filter_ctx);
        }

        if ctx.show_faces() {
            self.render_faces(batch);
        }
        if ctx.show_edges() && self.style.show_edges {
            self.render_edges(batch);
        }
    }

    fn validate_vertices(&mut self, ctx: FilterContext<'_>) {
        debug_assert!(!self.vertices_valid);
        let filter = RevealHidden::new(self.filter.as_ref(), self.show_hidden_brushes);

        let mut count = CountVertices::new(&filter, ctx);
        ctx.model.accept(&self.brushes, &mut count);

        let mut collect = CollectVertices::new(&filter, ctx, count.vertex_count());
        ctx.model.accept(&self.brushes, &mut collect);

        self.vertex_array = Arc::new(collect.finish());
        self.revisions = self
            .brushes
            .iter()
            .map(|&id| (id, ctx.model.brush(id).map(|b| b.revision())))
            .collect();
        self.vertices_valid = true;
        self.stats.vertex_passes += 1;

        log::debug!(
            "brush renderer: {} vertices from {} brushes",
            self.vertex_array.len(),
            self.brushes.len()
        );
    }

    fn validate_indices(&mut self, ctx: FilterContext<'_>) {
        debug_assert!(!self.indices_valid);
        let filter = RevealHidden::new(self.filter.as_ref(), self.show_hidden_brushes);

        let mut count = CountIndices::new(&filter, ctx);
        ctx.model.accept(&self.brushes, &mut count);

        let mut collect = CollectIndices::new(count);
        ctx.model.accept(&self.brushes, &mut collect);
        let collected = collect.finish();

        debug_assert_eq!(
            collected.vertex_count as usize,
            self.vertex_array.len(),
            "index pass saw different faces than the vertex pass"
        );

        self.opaque = Arc::new(collected.opaque);
        self.transparent = Arc::new(collected.transparent);
        self.edges = Arc::new(collected.edges);
        self.indices_valid = true;
        self.stats.index_passes += 1;

        log::debug!(
            "brush renderer: {} opaque, {} transparent, {} edge indices",
            self.opaque.len(),
            self.transparent.len(),
            self.edges.len()
        );
    }

    fn face_style(&self, alpha: Option<f32>) -> FaceStyle {
        FaceStyle {
            color: self.style.face_color,
            grayscale: self.style.grayscale,
            tint: self.style.tint.then_some(self.style.tint_color),
            alpha,
        }
    }

    fn render_faces(&self, batch: &mut dyn RenderBatch) {
        if !self.opaque.is_empty() {
            batch.add_one_shot(BatchItem::Faces(FaceBatch {
                bucket: FaceBucket::Opaque,
                vertices: Arc::clone(&self.vertex_array),
                indices: Arc::clone(&self.opaque),
                style: self.face_style(None),
            }));
        }
        if !self.transparent.is_empty() {
            batch.add_one_shot(BatchItem::Faces(FaceBatch {
                bucket: FaceBucket::Transparent,
                vertices: Arc::clone(&self.vertex_array),
                indices: Arc::clone(&self.transparent),
                style: self.face_style(Some(self.style.transparency_alpha)),
            }));
        }
    }

    fn render_edges(&self, batch: &mut dyn RenderBatch) {
        if self.edges.is_empty() {
            return;
        }

        let edges = |color, occluded| {
            BatchItem::Edges(EdgeBatch {
                vertices: Arc::clone(&self.vertex_array),
                indices: Arc::clone(&self.edges),
                color,
                occluded,
            })
        };

        if self.style.show_occluded_edges {
            batch.add_one_shot(edges(self.style.occluded_edge_color, true));
        }
        batch.add_one_shot(edges(self.style.edge_color, false));
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn vertex_array(&self) -> &Arc<VertexArray> {
        &self.vertex_array
    }

    #[inline]
    pub fn opaque_indices(&self) -> &Arc<TexturedIndexArray> {
        &self.opaque
    }

    #[inline]
    pub fn transparent_indices(&self) -> &Arc<TexturedIndexArray> {
        &self.transparent
    }

    #[inline]
    pub fn edge_indices(&self) -> &Arc<IndexArray> {
        &self.edges
    }

    #[inline]
    pub fn vertices_valid(&self) -> bool {
        self.vertices_valid
    }

    #[inline]
    pub fn indices_valid(&self) -> bool {
        self.indices_valid
    }

    #[inline]
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    #[inline]
    pub fn brushes(&self) -> &[NodeId] {
        &self.brushes
    }

    #[inline]
    pub fn style(&self) -> &BrushStyle {
        &self.style
    }

    #[inline]
    pub fn show_hidden_brushes(&self) -> bool {
        self.show_hidden_brushes
    }

    #[inline]
    pub fn stats(&self) -> RevalidationStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, MAT_A, MAT_B};
    use crate::render::brush::batch::RecordingBatch;
    use crate::render::brush::filter::{SelectedBrushFilter, UnselectedBrushFilter};

    struct Harness {
        model: Model,
        editor: EditorContext,
        brushes: [NodeId; 2],
        renderer: BrushRenderer,
    }

    impl Harness {
        fn new(filter: Box<dyn BrushFilter>) -> Self {
            let (model, brushes) = fixtures::two_cube_scene();
            let mut renderer = BrushRenderer::new(filter);
            renderer.set_brushes(brushes.to_vec());
            Self { model, editor: EditorContext::new(), brushes, renderer }
        }

        fn render(&mut self) -> RecordingBatch {
            let mut batch = RecordingBatch::new();
            self.renderer
                .render(&self.model, &self.editor, &RenderContext::default(), &mut batch);
            batch
        }
    }

    // ── dirty tracking ────────────────────────────────────────────────────

    #[test]
    fn fresh_renderer_is_valid_and_empty() {
        let renderer = BrushRenderer::unfiltered(false);
        assert!(renderer.vertices_valid() && renderer.indices_valid());
        assert!(renderer.vertex_array().is_empty());
        assert_eq!(renderer.brush_count(), 0);
    }

    #[test]
    fn repeated_renders_revalidate_once() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        assert!(!h.renderer.vertices_valid());
        assert!(!h.renderer.indices_valid());

        h.render();
        h.render();
        assert_eq!(h.renderer.stats(), RevalidationStats { vertex_passes: 1, index_passes: 1 });
        assert!(h.renderer.vertices_valid() && h.renderer.indices_valid());
    }

    #[test]
    fn structural_mutators_revalidate_once_each() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();

        h.renderer.remove_brushes(&[h.brushes[1]]);
        h.render();
        h.render();
        assert_eq!(h.renderer.stats().vertex_passes, 2);
        assert_eq!(h.renderer.vertex_array().len(), 24);

        h.renderer.add_brushes(&[h.brushes[1]]);
        h.render();
        assert_eq!(h.renderer.stats(), RevalidationStats { vertex_passes: 3, index_passes: 3 });
        assert_eq!(h.renderer.vertex_array().len(), 48);
    }

    #[test]
    fn cosmetic_setters_do_not_invalidate() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();

        let r = &mut h.renderer;
        r.set_face_color(Color::white());
        r.set_edge_color(Color::white());
        r.set_occluded_edge_color(Color::white());
        r.set_show_edges(false);
        r.set_show_occluded_edges(true);
        r.set_grayscale(true);
        r.set_tint(true);
        r.set_tint_color(Color::white());
        r.set_transparency_alpha(0.25);
        assert_eq!(r.style().transparency_alpha, 0.25);
        r.set_style(BrushStyle::default());
        assert!(r.vertices_valid() && r.indices_valid());

        h.render();
        assert_eq!(h.renderer.stats().vertex_passes, 1);
    }

    #[test]
    fn show_hidden_invalidates_only_on_change() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();

        h.renderer.set_show_hidden_brushes(false);
        assert!(h.renderer.vertices_valid());

        h.renderer.set_show_hidden_brushes(true);
        assert!(h.renderer.show_hidden_brushes());
        assert!(!h.renderer.vertices_valid());
        assert!(!h.renderer.indices_valid());

        h.render();
        h.render();
        assert_eq!(h.renderer.stats(), RevalidationStats { vertex_passes: 2, index_passes: 2 });
    }

    #[test]
    fn emptying_the_list_drops_index_buckets() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();
        assert_eq!(h.renderer.opaque_indices().len(), 36);

        let all = h.brushes;
        h.renderer.remove_brushes(&all);
        let batch = h.render();

        assert!(batch.is_empty());
        assert!(h.renderer.vertex_array().is_empty());
        assert!(h.renderer.opaque_indices().is_empty());
        assert!(h.renderer.transparent_indices().is_empty());
        assert!(h.renderer.edge_indices().is_empty());
    }

    #[test]
    fn invalidation_never_leaves_indices_past_the_vertex_array() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();

        h.renderer.set_brushes(Vec::new());
        assert!(h.renderer.opaque_indices().is_empty());
        assert!(h.renderer.edge_indices().is_empty());

        h.renderer.set_brushes(vec![h.brushes[0]]);
        h.render();
        let len = h.renderer.vertex_array().len() as u32;
        assert!(h.renderer.edge_indices().as_slice().iter().all(|&i| i < len));
    }

    #[test]
    fn transparency_alpha_is_clamped_and_finite() {
        let mut renderer = BrushRenderer::unfiltered(true);
        renderer.set_transparency_alpha(2.0);
        assert_eq!(renderer.style().transparency_alpha, 1.0);
        renderer.set_transparency_alpha(-1.0);
        assert_eq!(renderer.style().transparency_alpha, 0.0);
        renderer.set_transparency_alpha(f32::NAN);
        assert_eq!(renderer.style().transparency_alpha, 1.0);
        renderer.set_transparency_alpha(f32::NEG_INFINITY);
        assert_eq!(renderer.style().transparency_alpha, 1.0);
    }

    #[test]
    fn removing_unknown_brush_is_a_no_op() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();
        h.renderer.remove_brushes(&[NodeId::WORLD]);
        assert!(h.renderer.vertices_valid());
    }

    #[test]
    fn sync_revisions_picks_up_model_edits() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();
        assert!(!h.renderer.sync_revisions(&h.model));

        h.model.touch(h.brushes[0]);
        assert!(h.renderer.sync_revisions(&h.model));
        assert!(!h.renderer.vertices_valid());
        h.render();
        assert_eq!(h.renderer.stats().vertex_passes, 2);
    }

    #[test]
    fn material_edit_moves_face_between_materials() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();
        assert_eq!(h.renderer.opaque_indices().material_len(MAT_B), 0);

        if let Some(face) = h.model.brush_mut(h.brushes[0]).and_then(|b| b.face_mut(0)) {
            face.set_material(MAT_B);
        }
        assert!(h.renderer.sync_revisions(&h.model));
        h.render();

        let opaque = h.renderer.opaque_indices();
        assert_eq!(opaque.material_len(MAT_A), 30);
        assert_eq!(opaque.material_len(MAT_B), 6);
    }

    #[test]
    fn sync_revisions_notices_removed_brushes() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.render();
        h.model.remove(h.brushes[1]);
        assert!(h.renderer.sync_revisions(&h.model));

        let batch = h.render();
        assert_eq!(h.renderer.vertex_array().len(), 24);
        assert!(batch.face_batch(FaceBucket::Transparent).is_none());
    }

    // ── submission ────────────────────────────────────────────────────────

    #[test]
    fn empty_brush_list_submits_nothing() {
        let model = Model::new();
        let mut renderer = BrushRenderer::unfiltered(false);
        let mut batch = RecordingBatch::new();
        renderer.render(&model, &EditorContext::new(), &RenderContext::default(), &mut batch);
        assert!(batch.is_empty());
        assert_eq!(renderer.stats(), RevalidationStats::default());
    }

    #[test]
    fn occluded_edges_are_submitted_first() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.renderer.set_show_occluded_edges(true);
        let batch = h.render();

        let edges: Vec<&EdgeBatch> = batch.edge_batches().collect();
        assert_eq!(edges.len(), 2);
        assert!(edges[0].occluded);
        assert_eq!(edges[0].color, h.renderer.style().occluded_edge_color);
        assert!(!edges[1].occluded);
        assert!(Arc::ptr_eq(&edges[0].indices, &edges[1].indices));
    }

    #[test]
    fn render_context_gates_faces_and_edges() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        let mut batch = RecordingBatch::new();
        h.renderer
            .render(&h.model, &h.editor, &RenderContext::new(false, true), &mut batch);
        assert_eq!(batch.face_batches().count(), 0);
        assert_eq!(batch.edge_batches().count(), 1);

        h.renderer.set_show_edges(false);
        let mut batch = RecordingBatch::new();
        h.renderer
            .render(&h.model, &h.editor, &RenderContext::new(true, true), &mut batch);
        assert_eq!(batch.face_batches().count(), 2);
        assert_eq!(batch.edge_batches().count(), 0);
    }

    #[test]
    fn transparent_batch_carries_alpha_and_tint() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.renderer.set_transparency_alpha(0.5);
        h.renderer.set_tint(true);
        let batch = h.render();

        let opaque = batch.face_batch(FaceBucket::Opaque).unwrap();
        let transparent = batch.face_batch(FaceBucket::Transparent).unwrap();
        assert_eq!(opaque.style.alpha, None);
        assert_eq!(transparent.style.alpha, Some(0.5));
        assert_eq!(transparent.style.tint, Some(h.renderer.style().tint_color));
        assert_eq!(opaque.indices.material_len(MAT_A), 36);
        assert_eq!(transparent.indices.material_len(MAT_B), 36);
    }

    #[test]
    fn submitted_batches_survive_revalidation() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        let first = h.render();
        h.renderer.invalidate();
        h.render();

        let old = first.face_batch(FaceBucket::Opaque).unwrap();
        assert_eq!(old.vertices.len(), 48);
        assert!(!Arc::ptr_eq(&old.vertices, h.renderer.vertex_array()));
    }

    // ── filters ───────────────────────────────────────────────────────────

    #[test]
    fn reveal_hidden_restores_hidden_brushes() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.editor.hide(h.brushes[0]);
        h.render();
        assert_eq!(h.renderer.vertex_array().len(), 24);

        h.renderer.set_show_hidden_brushes(true);
        let batch = h.render();
        assert_eq!(h.renderer.vertex_array().len(), 48);
        assert!(batch.face_batch(FaceBucket::Opaque).is_some());
    }

    #[test]
    fn selection_filter_compiles_selected_faces() {
        let mut h = Harness::new(Box::new(SelectedBrushFilter));
        h.model.select_face(h.brushes[0], 0, true);
        let batch = h.render();

        assert_eq!(h.renderer.vertex_array().len(), 4);
        assert_eq!(h.renderer.opaque_indices().len(), 6);
        assert_eq!(h.renderer.edge_indices().len(), 8);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn all_hidden_scene_yields_empty_buffers() {
        let mut h = Harness::new(Box::new(UnselectedBrushFilter));
        h.editor.hide(h.brushes[0]);
        h.editor.hide(h.brushes[1]);
        let batch = h.render();

        assert!(batch.is_empty());
        assert!(h.renderer.vertices_valid() && h.renderer.indices_valid());
        assert!(h.renderer.vertex_array().is_empty());
    }
}

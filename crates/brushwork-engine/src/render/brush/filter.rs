//! Per-frame face/edge visibility and transparency predicates.
//!
//! A [`BrushFilter`] decides what the renderer compiles. Filters are queried
//! through a [`FilterContext`], which answers the shared editor questions
//! (visible, editable, selected) once so every variant agrees on them.

use crate::model::{Brush, Edge, EditorContext, Face, FaceRef, Model, NodeId};

/// A brush handle paired with the brush it resolves to.
#[derive(Debug, Copy, Clone)]
pub struct BrushRef<'a> {
    pub id: NodeId,
    pub brush: &'a Brush,
}

impl<'a> BrushRef<'a> {
    #[inline]
    pub fn new(id: NodeId, brush: &'a Brush) -> Self {
        Self { id, brush }
    }
}

/// Read-only view of the model and editor state shared by all filters.
#[derive(Copy, Clone)]
pub struct FilterContext<'a> {
    pub model: &'a Model,
    pub editor: &'a EditorContext,
}

impl<'a> FilterContext<'a> {
    #[inline]
    pub fn new(model: &'a Model, editor: &'a EditorContext) -> Self {
        Self { model, editor }
    }

    #[inline]
    pub fn visible_brush(&self, id: NodeId) -> bool {
        self.editor.visible(self.model, id)
    }

    /// A face is visible when its brush is.
    #[inline]
    pub fn visible_face(&self, face: &Face) -> bool {
        self.visible_brush(face.brush())
    }

    /// An edge is visible when either adjoining face is.
    pub fn visible_edge(&self, edge: &Edge) -> bool {
        self.face_ref_visible(edge.first_face()) || self.face_ref_visible(edge.second_face())
    }

    #[inline]
    pub fn editable_brush(&self, id: NodeId) -> bool {
        self.editor.editable(self.model, id)
    }

    #[inline]
    pub fn editable_face(&self, face: &Face) -> bool {
        self.editable_brush(face.brush())
    }

    /// Selected directly or through a selected group/entity.
    pub fn selected_brush(&self, brush: BrushRef<'_>) -> bool {
        brush.brush.selected() || self.model.parent_selected(brush.id)
    }

    #[inline]
    pub fn selected_face(&self, face: &Face) -> bool {
        face.selected()
    }

    /// An edge is selected when its brush is, or either adjoining face is.
    ///
    /// Both faces must belong to the same brush.
    pub fn selected_edge(&self, edge: &Edge) -> bool {
        let (first, second) = (edge.first_face(), edge.second_face());
        debug_assert_eq!(first.brush, second.brush, "edge joins faces of different brushes");

        let Some(brush) = self.model.brush(first.brush) else { return false };
        if self.selected_brush(BrushRef::new(first.brush, brush)) {
            return true;
        }

        let face_selected = |r: FaceRef| {
            self.model
                .brush(r.brush)
                .and_then(|b| b.face(r.face))
                .is_some_and(Face::selected)
        };
        face_selected(first) || face_selected(second)
    }

    #[inline]
    pub fn has_selected_faces(&self, brush: &Brush) -> bool {
        brush.descendant_selected()
    }

    fn face_ref_visible(&self, face: FaceRef) -> bool {
        self.visible_brush(face.brush)
    }
}

/// Decides which faces and edges are compiled, and into which face bucket.
pub trait BrushFilter {
    fn show_face(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>, face: &Face) -> bool;

    fn show_edge(&self, ctx: &FilterContext<'_>, edge: &Edge) -> bool;

    /// Whether the faces of `brush` go to the transparent bucket.
    fn transparent(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>) -> bool;
}

// ── variants ──────────────────────────────────────────────────────────────

/// Shows everything. Every brush lands in one bucket chosen up front.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoFilter {
    pub transparent: bool,
}

impl NoFilter {
    pub fn new(transparent: bool) -> Self {
        Self { transparent }
    }
}

impl BrushFilter for NoFilter {
    fn show_face(&self, _ctx: &FilterContext<'_>, _brush: BrushRef<'_>, _face: &Face) -> bool {
        true
    }

    fn show_edge(&self, _ctx: &FilterContext<'_>, _edge: &Edge) -> bool {
        true
    }

    fn transparent(&self, _ctx: &FilterContext<'_>, _brush: BrushRef<'_>) -> bool {
        self.transparent
    }
}

/// Selected brushes and selected faces.
#[derive(Debug, Copy, Clone, Default)]
pub struct SelectedBrushFilter;

impl BrushFilter for SelectedBrushFilter {
    fn show_face(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>, face: &Face) -> bool {
        ctx.selected_brush(brush) || ctx.selected_face(face)
    }

    fn show_edge(&self, ctx: &FilterContext<'_>, edge: &Edge) -> bool {
        ctx.selected_edge(edge)
    }

    fn transparent(&self, _ctx: &FilterContext<'_>, brush: BrushRef<'_>) -> bool {
        brush.brush.transparent()
    }
}

/// Visible, editable geometry that is not part of the selection.
#[derive(Debug, Copy, Clone, Default)]
pub struct UnselectedBrushFilter;

impl BrushFilter for UnselectedBrushFilter {
    fn show_face(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>, face: &Face) -> bool {
        ctx.visible_face(face)
            && ctx.editable_face(face)
            && !ctx.selected_face(face)
            && !ctx.selected_brush(brush)
    }

    fn show_edge(&self, ctx: &FilterContext<'_>, edge: &Edge) -> bool {
        ctx.visible_edge(edge) && !ctx.selected_edge(edge)
    }

    fn transparent(&self, _ctx: &FilterContext<'_>, brush: BrushRef<'_>) -> bool {
        brush.brush.transparent()
    }
}

/// Visible geometry that cannot be edited. Always opaque.
#[derive(Debug, Copy, Clone, Default)]
pub struct LockedBrushFilter;

impl BrushFilter for LockedBrushFilter {
    fn show_face(&self, ctx: &FilterContext<'_>, _brush: BrushRef<'_>, face: &Face) -> bool {
        ctx.visible_face(face) && !ctx.editable_face(face)
    }

    fn show_edge(&self, ctx: &FilterContext<'_>, edge: &Edge) -> bool {
        ctx.visible_edge(edge) && !ctx.editable_brush(edge.first_face().brush)
    }

    fn transparent(&self, _ctx: &FilterContext<'_>, _brush: BrushRef<'_>) -> bool {
        false
    }
}

// ── decorator ─────────────────────────────────────────────────────────────

/// Forces faces and edges visible when `reveal` is set; otherwise defers to
/// `inner`. Transparency always comes from `inner`.
pub struct RevealHidden<'f> {
    inner: &'f dyn BrushFilter,
    reveal: bool,
}

impl<'f> RevealHidden<'f> {
    pub fn new(inner: &'f dyn BrushFilter, reveal: bool) -> Self {
        Self { inner, reveal }
    }
}

impl BrushFilter for RevealHidden<'_> {
    fn show_face(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>, face: &Face) -> bool {
        self.reveal || self.inner.show_face(ctx, brush, face)
    }

    fn show_edge(&self, ctx: &FilterContext<'_>, edge: &Edge) -> bool {
        self.reveal || self.inner.show_edge(ctx, edge)
    }

    fn transparent(&self, ctx: &FilterContext<'_>, brush: BrushRef<'_>) -> bool {
        self.inner.transparent(ctx, brush)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn brush_ref(model: &Model, id: NodeId) -> BrushRef<'_> {
        BrushRef::new(id, model.brush(id).unwrap())
    }

    // ── context queries ───────────────────────────────────────────────────

    #[test]
    fn edge_visibility_is_or_of_faces() {
        let (model, [a, _]) = fixtures::two_cube_scene();
        let mut editor = EditorContext::new();
        let ctx = FilterContext::new(&model, &editor);
        let edge = &model.brush(a).unwrap().edges()[0];
        assert!(ctx.visible_edge(edge));

        editor.hide(a);
        let ctx = FilterContext::new(&model, &editor);
        assert!(!ctx.visible_edge(edge));
    }

    #[test]
    fn edge_selected_by_either_face_or_brush() {
        let (mut model, [a, _]) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let edge = model.brush(a).unwrap().edges()[0].clone();

        assert!(!FilterContext::new(&model, &editor).selected_edge(&edge));

        model.select_face(a, edge.second_face().face, true);
        assert!(FilterContext::new(&model, &editor).selected_edge(&edge));

        model.select_face(a, edge.second_face().face, false);
        model.set_selected(a, true);
        assert!(FilterContext::new(&model, &editor).selected_edge(&edge));
    }

    #[test]
    fn edge_not_selected_by_unrelated_face() {
        let (mut model, [a, _]) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let edge = model.brush(a).unwrap().edges()[0].clone();
        let unrelated = (0..6)
            .find(|&f| f != edge.first_face().face && f != edge.second_face().face)
            .unwrap();

        model.select_face(a, unrelated, true);
        assert!(!FilterContext::new(&model, &editor).selected_edge(&edge));
    }

    #[test]
    fn parent_selection_selects_brush() {
        let mut model = Model::new();
        let layer = model.add_layer("default");
        let entity = model.add_entity(layer, "func_door").unwrap();
        let id = model.add_brush(entity, fixtures::cube(0.0, fixtures::MAT_A)).unwrap();
        let editor = EditorContext::new();

        model.set_selected(entity, true);
        let ctx = FilterContext::new(&model, &editor);
        assert!(ctx.selected_brush(brush_ref(&model, id)));
    }

    // ── variants ──────────────────────────────────────────────────────────

    #[test]
    fn selected_filter_shows_selected_faces_only() {
        let (mut model, [a, b]) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        model.select_face(b, 1, true);

        let ctx = FilterContext::new(&model, &editor);
        let filter = SelectedBrushFilter;
        let (ra, rb) = (brush_ref(&model, a), brush_ref(&model, b));
        assert!(ra.brush.faces().iter().all(|f| !filter.show_face(&ctx, ra, f)));
        let shown: Vec<bool> = rb.brush.faces().iter().map(|f| filter.show_face(&ctx, rb, f)).collect();
        assert_eq!(shown, vec![false, true, false, false, false, false]);
    }

    #[test]
    fn unselected_filter_excludes_selection_and_locked() {
        let (mut model, [a, b]) = fixtures::two_cube_scene();
        let mut editor = EditorContext::new();
        model.set_selected(a, true);
        editor.lock(b);

        let ctx = FilterContext::new(&model, &editor);
        let filter = UnselectedBrushFilter;
        for id in [a, b] {
            let r = brush_ref(&model, id);
            assert!(r.brush.faces().iter().all(|f| !filter.show_face(&ctx, r, f)));
        }

        // Locked edges are still visible and unselected.
        let edge = &model.brush(b).unwrap().edges()[0];
        assert!(filter.show_edge(&ctx, edge));
        let edge = &model.brush(a).unwrap().edges()[0];
        assert!(!filter.show_edge(&ctx, edge));
    }

    #[test]
    fn transparency_follows_brush_flag() {
        let (model, [a, b]) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let ctx = FilterContext::new(&model, &editor);

        for filter in [&SelectedBrushFilter as &dyn BrushFilter, &UnselectedBrushFilter] {
            assert!(!filter.transparent(&ctx, brush_ref(&model, a)));
            assert!(filter.transparent(&ctx, brush_ref(&model, b)));
        }
        assert!(!LockedBrushFilter.transparent(&ctx, brush_ref(&model, b)));
        assert!(NoFilter::new(true).transparent(&ctx, brush_ref(&model, a)));
    }

    #[test]
    fn locked_filter_shows_visible_locked_only() {
        let (model, [a, b]) = fixtures::two_cube_scene();
        let mut editor = EditorContext::new();
        editor.lock(a);
        editor.lock(b);
        editor.hide(b);

        let ctx = FilterContext::new(&model, &editor);
        let (ra, rb) = (brush_ref(&model, a), brush_ref(&model, b));
        assert!(LockedBrushFilter.show_face(&ctx, ra, &ra.brush.faces()[0]));
        assert!(!LockedBrushFilter.show_face(&ctx, rb, &rb.brush.faces()[0]));
        assert!(LockedBrushFilter.show_edge(&ctx, &ra.brush.edges()[0]));
    }

    // ── decorator ─────────────────────────────────────────────────────────

    #[test]
    fn reveal_hidden_forces_visibility_and_delegates_transparency() {
        let (model, [a, b]) = fixtures::two_cube_scene();
        let mut editor = EditorContext::new();
        editor.hide(a);
        editor.hide(b);
        let ctx = FilterContext::new(&model, &editor);
        let inner = UnselectedBrushFilter;

        let off = RevealHidden::new(&inner, false);
        let on = RevealHidden::new(&inner, true);
        let rb = brush_ref(&model, b);
        let face = &rb.brush.faces()[0];
        let edge = &rb.brush.edges()[0];

        assert!(!off.show_face(&ctx, rb, face));
        assert!(on.show_face(&ctx, rb, face));
        assert!(!off.show_edge(&ctx, edge));
        assert!(on.show_edge(&ctx, edge));
        assert!(on.transparent(&ctx, rb));
        assert!(!on.transparent(&ctx, brush_ref(&model, a)));
    }
}

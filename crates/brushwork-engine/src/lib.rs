//! Brushwork engine crate.
//!
//! This crate compiles map brushes into batched draw data:
//! - `model` owns brushes, faces and derived edges
//! - `render::brush` filters, counts, collects and submits geometry
//! - `device` provides a headless wgpu device for GPU submission

pub mod coords;
pub mod device;
pub mod logging;
pub mod model;
pub mod paint;
pub mod render;

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use crate::fixtures::{self, MAT_A, MAT_B};
    use crate::model::EditorContext;
    use crate::render::brush::{
        BrushRenderer, FaceBucket, PrimitiveKind, RecordingBatch, RenderContext, RevalidationStats,
        UnselectedBrushFilter,
    };

    // ── two cubes, one transparent ────────────────────────────────────────

    #[test]
    fn two_cubes_partition_into_buckets() {
        let (model, brushes) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let mut renderer = BrushRenderer::new(Box::new(UnselectedBrushFilter));
        renderer.add_brushes(&brushes);

        let mut batch = RecordingBatch::new();
        renderer.render(&model, &editor, &RenderContext::default(), &mut batch);

        assert_eq!(renderer.vertex_array().len(), 48);

        let opaque = renderer.opaque_indices();
        assert_eq!(opaque.len(), 6 * 6);
        assert_eq!(opaque.material_len(MAT_A), 36);
        assert_eq!(opaque.material_len(MAT_B), 0);
        assert!(opaque.as_slice().iter().all(|&i| i < 24));

        let transparent = renderer.transparent_indices();
        assert_eq!(transparent.len(), 6 * 6);
        assert_eq!(transparent.material_len(MAT_B), 36);
        assert!(transparent.as_slice().iter().all(|&i| (24..48).contains(&i)));

        let edges = renderer.edge_indices();
        assert_eq!(edges.len(), 12 * 8);
        assert_eq!(edges.ranges(), &[(PrimitiveKind::LineLoop, 0..96)]);

        assert_eq!(batch.len(), 3);
        assert!(batch.face_batch(FaceBucket::Opaque).is_some());
        assert!(batch.face_batch(FaceBucket::Transparent).is_some());
        assert_eq!(batch.edge_batches().count(), 1);
    }

    #[test]
    fn every_bucket_shares_the_vertex_array() {
        let (model, brushes) = fixtures::two_cube_scene();
        let mut renderer = BrushRenderer::new(Box::new(UnselectedBrushFilter));
        renderer.set_brushes(brushes.to_vec());

        let mut batch = RecordingBatch::new();
        renderer.render(&model, &EditorContext::new(), &RenderContext::default(), &mut batch);

        let shared = renderer.vertex_array();
        assert!(batch.face_batches().all(|b| Arc::ptr_eq(&b.vertices, shared)));
        assert!(batch.edge_batches().all(|b| Arc::ptr_eq(&b.vertices, shared)));
    }

    #[test]
    fn clear_empties_buffers_and_resets_flags() {
        let (model, brushes) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let mut renderer = BrushRenderer::new(Box::new(UnselectedBrushFilter));
        renderer.add_brushes(&brushes);
        renderer.render(&model, &editor, &RenderContext::default(), &mut RecordingBatch::new());

        renderer.clear();
        assert_eq!(renderer.brush_count(), 0);
        assert!(renderer.vertex_array().is_empty());
        assert!(renderer.opaque_indices().is_empty());
        assert!(renderer.transparent_indices().is_empty());
        assert!(renderer.edge_indices().is_empty());
        assert!(!renderer.vertices_valid());
        assert!(!renderer.indices_valid());

        let mut batch = RecordingBatch::new();
        renderer.render(&model, &editor, &RenderContext::default(), &mut batch);
        assert!(batch.is_empty());
        assert_eq!(renderer.stats(), RevalidationStats { vertex_passes: 1, index_passes: 1 });
    }

    #[test]
    fn unfiltered_renderer_uses_one_bucket() {
        let (model, brushes) = fixtures::two_cube_scene();
        let mut renderer = BrushRenderer::unfiltered(true);
        renderer.add_brushes(&brushes);
        renderer.render(&model, &EditorContext::new(), &RenderContext::default(), &mut RecordingBatch::new());

        assert!(renderer.opaque_indices().is_empty());
        assert_eq!(renderer.transparent_indices().len(), 72);
        assert_eq!(renderer.transparent_indices().runs().len(), 2);
    }

    #[test]
    fn selection_moves_faces_between_renderers() {
        use crate::render::brush::SelectedBrushFilter;

        let (mut model, brushes) = fixtures::two_cube_scene();
        let editor = EditorContext::new();
        let mut selected = BrushRenderer::new(Box::new(SelectedBrushFilter));
        let mut unselected = BrushRenderer::new(Box::new(UnselectedBrushFilter));
        selected.set_brushes(brushes.to_vec());
        unselected.set_brushes(brushes.to_vec());

        model.set_selected(brushes[0], true);
        let ctx = RenderContext::default();
        let mut batch = RecordingBatch::new();
        selected.render(&model, &editor, &ctx, &mut batch);
        unselected.render(&model, &editor, &ctx, &mut batch);

        assert_eq!(selected.vertex_array().len(), 24);
        assert_eq!(unselected.vertex_array().len(), 24);

        model.set_selected(brushes[0], false);
        assert!(selected.sync_revisions(&model));
        assert!(unselected.sync_revisions(&model));
        selected.render(&model, &editor, &ctx, &mut batch);
        unselected.render(&model, &editor, &ctx, &mut batch);
        assert!(selected.vertex_array().is_empty());
        assert_eq!(unselected.vertex_array().len(), 48);
    }
}

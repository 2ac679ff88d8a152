use std::collections::HashSet;

use super::{Model, Node, NodeId};

/// Editor-side visibility and lock state queried by brush filters.
///
/// Hiding or locking a node applies to its whole subtree. A locked node stays
/// visible but is not editable.
#[derive(Debug, Clone, Default)]
pub struct EditorContext {
    hidden: HashSet<NodeId>,
    locked: HashSet<NodeId>,
    show_selection_only: bool,
}

impl EditorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the node was not hidden before.
    pub fn hide(&mut self, id: NodeId) -> bool {
        self.hidden.insert(id)
    }

    /// Returns `true` if the node was hidden before.
    pub fn show(&mut self, id: NodeId) -> bool {
        self.hidden.remove(&id)
    }

    pub fn lock(&mut self, id: NodeId) -> bool {
        self.locked.insert(id)
    }

    pub fn unlock(&mut self, id: NodeId) -> bool {
        self.locked.remove(&id)
    }

    /// Whether `id` itself carries the hidden flag (ignores ancestors).
    #[inline]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.hidden.contains(&id)
    }

    /// Whether `id` itself carries the locked flag (ignores ancestors).
    #[inline]
    pub fn is_locked(&self, id: NodeId) -> bool {
        self.locked.contains(&id)
    }

    #[inline]
    pub fn show_selection_only(&self) -> bool {
        self.show_selection_only
    }

    /// When set, only selected nodes (or nodes inside a selected group or
    /// entity, or brushes with selected faces) are visible.
    pub fn set_show_selection_only(&mut self, show_selection_only: bool) {
        self.show_selection_only = show_selection_only;
    }

    /// A node is visible when it exists and neither it nor an ancestor is hidden.
    pub fn visible(&self, model: &Model, id: NodeId) -> bool {
        let Some(node) = model.node(id) else { return false };

        if self.hidden.contains(&id) || model.ancestors(id).any(|a| self.hidden.contains(&a)) {
            return false;
        }

        if self.show_selection_only {
            let selected_faces = matches!(node, Node::Brush(b) if b.descendant_selected());
            return node.selected() || selected_faces || model.parent_selected(id);
        }

        true
    }

    /// A node is editable when it is visible and neither it nor an ancestor is locked.
    pub fn editable(&self, model: &Model, id: NodeId) -> bool {
        self.visible(model, id)
            && !self.locked.contains(&id)
            && !model.ancestors(id).any(|a| self.locked.contains(&a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec3;
    use crate::model::{Brush, MaterialId};

    fn scene() -> (Model, NodeId, NodeId, NodeId) {
        let mut model = Model::new();
        let layer = model.add_layer("default");
        let group = model.add_group(layer, "g").unwrap();
        let brush = Brush::cuboid(Vec3::zero(), Vec3::new(8.0, 8.0, 8.0), MaterialId(0)).unwrap();
        let brush = model.add_brush(group, brush).unwrap();
        (model, layer, group, brush)
    }

    #[test]
    fn hiding_an_ancestor_hides_the_subtree() {
        let (model, layer, _, brush) = scene();
        let mut ctx = EditorContext::new();
        assert!(ctx.visible(&model, brush));

        ctx.hide(layer);
        assert!(!ctx.visible(&model, brush));
        assert!(!ctx.is_hidden(brush));

        ctx.show(layer);
        assert!(ctx.visible(&model, brush));
    }

    #[test]
    fn locked_nodes_stay_visible() {
        let (model, _, group, brush) = scene();
        let mut ctx = EditorContext::new();
        ctx.lock(group);
        assert!(ctx.visible(&model, brush));
        assert!(!ctx.editable(&model, brush));
    }

    #[test]
    fn hidden_nodes_are_not_editable() {
        let (model, _, _, brush) = scene();
        let mut ctx = EditorContext::new();
        ctx.hide(brush);
        assert!(!ctx.editable(&model, brush));
    }

    #[test]
    fn show_selection_only_hides_unselected() {
        let (mut model, _, group, brush) = scene();
        let mut ctx = EditorContext::new();
        ctx.set_show_selection_only(true);
        assert!(!ctx.visible(&model, brush));

        model.set_selected(group, true);
        assert!(ctx.visible(&model, brush));

        model.set_selected(group, false);
        model.select_face(brush, 0, true);
        assert!(ctx.visible(&model, brush));
    }

    #[test]
    fn missing_nodes_are_invisible() {
        let (mut model, _, _, brush) = scene();
        model.remove(brush);
        assert!(!EditorContext::new().visible(&model, brush));
    }
}

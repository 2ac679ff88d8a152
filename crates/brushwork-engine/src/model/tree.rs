use super::{Brush, BrushVisitor, Entity, Group, Layer, ModelError, Node, NodeId};

#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed map tree: world → layers → groups/entities → brushes.
///
/// The model owns all brushes. Renderers keep [`NodeId`] handles and read
/// through `&Model` during a render call; they never hold references across
/// calls.
#[derive(Debug, Clone)]
pub struct Model {
    nodes: Vec<Option<NodeEntry>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(NodeEntry {
                node: Node::World,
                parent: None,
                children: Vec::new(),
            })],
        }
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> NodeId {
        // The world always exists and accepts layers.
        self.push_child(NodeId::WORLD, Node::Layer(Layer { name: name.into() }))
    }

    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, ModelError> {
        self.insert(parent, Node::Group(Group { name: name.into(), selected: false }))
    }

    pub fn add_entity(&mut self, parent: NodeId, classname: impl Into<String>) -> Result<NodeId, ModelError> {
        self.insert(parent, Node::Entity(Entity { classname: classname.into(), selected: false }))
    }

    /// Attaches `brush`, rewriting its face and edge back-references to the new handle.
    pub fn add_brush(&mut self, parent: NodeId, brush: Brush) -> Result<NodeId, ModelError> {
        self.insert(parent, Node::Brush(brush))
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId, ModelError> {
        let accepts = self
            .entry(parent)
            .is_some_and(|entry| entry.node.accepts(node.kind()));
        if !accepts {
            return Err(ModelError::InvalidParent { parent });
        }
        Ok(self.push_child(parent, node))
    }

    fn push_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let Node::Brush(brush) = &mut node {
            brush.attach(id);
        }

        self.nodes.push(Some(NodeEntry {
            node,
            parent: Some(parent),
            children: Vec::new(),
        }));
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.push(id);
        }

        log::trace!("model: attached {id} under {parent}");
        id
    }

    /// Removes `id` and its whole subtree. The world cannot be removed.
    ///
    /// Returns the removed node's payload.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if id == NodeId::WORLD {
            return None;
        }

        let entry = self.nodes.get_mut(id.index())?.take()?;
        if let Some(parent) = entry.parent.and_then(|p| self.entry_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut pending = entry.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.get_mut(child.index()).and_then(Option::take) {
                pending.extend(removed.children);
            }
        }

        Some(entry.node)
    }

    #[inline]
    fn entry(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn entry_mut(&mut self, id: NodeId) -> Option<&mut NodeEntry> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).map(|e| &e.node)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or_default()
    }

    pub fn brush(&self, id: NodeId) -> Option<&Brush> {
        match self.node(id)? {
            Node::Brush(brush) => Some(brush),
            _ => None,
        }
    }

    /// Mutable access to a brush for geometry edits. Bumps the brush revision.
    pub fn brush_mut(&mut self, id: NodeId) -> Option<&mut Brush> {
        match &mut self.entry_mut(id)?.node {
            Node::Brush(brush) => {
                brush.bump_revision();
                Some(brush)
            }
            _ => None,
        }
    }

    /// Marks a brush as changed without editing it. Returns `false` for non-brush handles.
    pub fn touch(&mut self, id: NodeId) -> bool {
        self.brush_mut(id).is_some()
    }

    /// Sets the selection state of a group, entity or brush.
    ///
    /// Returns `false` if the node doesn't exist or isn't selectable.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        let Some(entry) = self.entry_mut(id) else { return false };
        match &mut entry.node {
            Node::World | Node::Layer(_) => false,
            Node::Group(group) => {
                group.selected = selected;
                true
            }
            Node::Entity(entity) => {
                entity.selected = selected;
                true
            }
            Node::Brush(brush) => {
                brush.set_selected(selected);
                brush.bump_revision();
                true
            }
        }
    }

    /// Sets the selection state of a single face of a brush.
    pub fn select_face(&mut self, brush: NodeId, face: usize, selected: bool) -> bool {
        let Some(brush) = self.brush_mut(brush) else { return false };
        let Some(face) = brush.face_mut(face) else { return false };
        face.selected = selected;
        true
    }

    /// Iterates the ancestors of `id`, nearest first. Excludes `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { model: self, next: self.parent(id) }
    }

    /// True when a group or entity containing `id` is selected.
    pub fn parent_selected(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .any(|a| self.node(a).is_some_and(Node::selected))
    }

    /// All brush handles in depth-first, child-order traversal.
    pub fn brushes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![NodeId::WORLD];
        while let Some(id) = stack.pop() {
            if let Some(Node::Brush(_)) = self.node(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Number of live nodes including the world.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Always false: the world node is never removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Dispatches each handle in `ids`, in order, by node kind.
    ///
    /// Stale handles are skipped. Only brush nodes reach the visitor.
    pub fn accept<V>(&self, ids: &[NodeId], visitor: &mut V)
    where
        V: BrushVisitor + ?Sized,
    {
        for &id in ids {
            let Some(node) = self.node(id) else { continue };
            match node {
                Node::World | Node::Layer(_) | Node::Group(_) | Node::Entity(_) => {}
                Node::Brush(brush) => visitor.visit_brush(id, brush),
            }
        }
    }
}

/// Iterator returned by [`Model::ancestors`].
pub struct Ancestors<'a> {
    model: &'a Model,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.model.parent(id);
        Some(id)
    }
}

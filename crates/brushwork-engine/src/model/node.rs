use std::fmt;

use super::Brush;

/// Handle to a node stored in a [`Model`](super::Model).
///
/// Handles are never reused: removing a node leaves a tombstone, so a stale
/// handle resolves to `None` instead of aliasing a newer node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The root world node. Always present.
    pub const WORLD: NodeId = NodeId(0);

    /// Placeholder for faces and edges of a brush that is not attached to a model yet.
    pub const DETACHED: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == NodeId::DETACHED {
            write!(f, "#detached")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Material (texture) handle. Faces sharing a material are drawn by one call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub(crate) selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub classname: String,
    pub(crate) selected: bool,
}

/// Node payload, one variant per node kind.
#[derive(Debug, Clone)]
pub enum Node {
    World,
    Layer(Layer),
    Group(Group),
    Entity(Entity),
    Brush(Brush),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    World,
    Layer,
    Group,
    Entity,
    Brush,
}

impl Node {
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::World => NodeKind::World,
            Node::Layer(_) => NodeKind::Layer,
            Node::Group(_) => NodeKind::Group,
            Node::Entity(_) => NodeKind::Entity,
            Node::Brush(_) => NodeKind::Brush,
        }
    }

    /// Selection state of selectable nodes. Worlds and layers are never selected.
    #[inline]
    pub fn selected(&self) -> bool {
        match self {
            Node::World | Node::Layer(_) => false,
            Node::Group(g) => g.selected,
            Node::Entity(e) => e.selected,
            Node::Brush(b) => b.selected(),
        }
    }

    /// Whether a node of this kind may contain a child of kind `child`.
    pub(crate) fn accepts(&self, child: NodeKind) -> bool {
        match (self.kind(), child) {
            (NodeKind::World, NodeKind::Layer) => true,
            (NodeKind::World | NodeKind::Layer | NodeKind::Group, NodeKind::Group | NodeKind::Entity | NodeKind::Brush) => true,
            (NodeKind::Entity, NodeKind::Brush) => true,
            _ => false,
        }
    }
}

/// Receives the brush nodes of a traversal.
///
/// Only brushes carry renderable geometry; [`Model::accept`](super::Model::accept)
/// skips every other node kind.
pub trait BrushVisitor {
    fn visit_brush(&mut self, id: NodeId, brush: &Brush);
}

use std::fmt;

use super::NodeId;

/// Error returned when building brushes or attaching nodes to a [`Model`](super::Model).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A brush was built from an empty polygon list.
    EmptyBrush,
    /// Face `face` has fewer than three distinct vertices or no usable normal.
    DegenerateFace { face: usize },
    /// The directed edge leaving vertex `vertex` of face `face` has no opposite
    /// half-edge, so the polygons do not close into a solid.
    OpenEdge { face: usize, vertex: usize },
    /// The directed edge leaving vertex `vertex` of face `face` is shared by more
    /// than two faces.
    NonManifoldEdge { face: usize, vertex: usize },
    /// `parent` does not exist or cannot hold children of the requested kind.
    InvalidParent { parent: NodeId },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyBrush => write!(f, "brush has no faces"),
            ModelError::DegenerateFace { face } => {
                write!(f, "face {face} is degenerate (fewer than 3 vertices or zero area)")
            }
            ModelError::OpenEdge { face, vertex } => {
                write!(f, "edge at face {face} vertex {vertex} has no neighbouring face")
            }
            ModelError::NonManifoldEdge { face, vertex } => {
                write!(f, "edge at face {face} vertex {vertex} is shared by more than two faces")
            }
            ModelError::InvalidParent { parent } => {
                write!(f, "node {parent} cannot be used as a parent")
            }
        }
    }
}

impl std::error::Error for ModelError {}

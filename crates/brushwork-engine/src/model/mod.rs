//! Map model consumed by the brush renderer.
//!
//! Responsibilities:
//! - own brushes, faces and derived edges in an arena of [`NodeId`] handles
//! - expose selection state (node, parent, face) to filters
//! - dispatch brush nodes to [`BrushVisitor`]s in a stable order
//!
//! Geometry editing beyond material/selection changes (CSG, plane clipping)
//! lives outside this crate; edits made through [`Model::brush_mut`] bump the
//! brush revision so renderers can notice them.

mod brush;
mod edge;
mod editor;
mod error;
mod face;
mod node;
mod tree;

pub use brush::{Brush, Polygon};
pub use edge::{Edge, FaceRef};
pub use editor::EditorContext;
pub use error::ModelError;
pub use face::Face;
pub use node::{BrushVisitor, Entity, Group, Layer, MaterialId, Node, NodeId, NodeKind};
pub use tree::{Ancestors, Model};

//! CPU-side vertex and index storage produced by the compilation passes.
//!
//! Builders are sized exactly by a count pass, filled once by a collect pass,
//! then sealed into immutable arrays that are shared via `Arc`.

mod index;
mod vertex;

pub use index::{
    IndexArray, IndexArrayBuilder, IndexArraySize, MaterialRun, PrimitiveKind, TexturedIndexArray,
    TexturedIndexArrayBuilder, TexturedIndexArraySize,
};
pub use vertex::{BrushVertex, VertexArray, VertexListBuilder};

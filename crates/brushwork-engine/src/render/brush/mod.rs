//! Brush renderer: filtered, incremental compilation of brush geometry.
//!
//! Pipeline:
//! - [`BrushFilter`] selects faces and picks the face bucket per brush
//! - count/collect passes size and fill [`buffers`] exactly
//! - [`BrushRenderer`] tracks validity and submits [`BatchItem`]s to a [`RenderBatch`]
//! - [`GpuBrushRenderer`] draws recorded batches with wgpu

pub mod batch;
pub mod buffers;
pub mod filter;
mod gpu;
mod passes;
mod renderer;
mod style;

pub use batch::{
    BatchItem, DrawCall, EdgeBatch, FaceBatch, FaceBucket, FaceStyle, RecordingBatch, RenderBatch,
    RenderContext,
};
pub use buffers::{
    BrushVertex, IndexArray, IndexArrayBuilder, IndexArraySize, MaterialRun, PrimitiveKind,
    TexturedIndexArray, TexturedIndexArrayBuilder, TexturedIndexArraySize, VertexArray,
    VertexListBuilder,
};
pub use filter::{
    BrushFilter, BrushRef, FilterContext, LockedBrushFilter, NoFilter, RevealHidden,
    SelectedBrushFilter, UnselectedBrushFilter,
};
pub use gpu::{GpuBrushRenderer, DEPTH_FORMAT};
pub use renderer::{BrushRenderer, RevalidationStats};
pub use style::BrushStyle;

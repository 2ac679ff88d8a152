//! Rendering subsystem.
//!
//! `brush` compiles brush geometry into shared vertex/index buffers and
//! submits draw descriptors; its GPU consumer issues wgpu commands and owns
//! its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - geometry is in world units, +Z up
//! - the vertex shader applies `RenderCtx::view_proj`

pub mod brush;
mod ctx;

pub use ctx::{RenderCtx, RenderTarget};

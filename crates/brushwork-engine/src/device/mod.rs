//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - owning offscreen color/depth targets
//! - providing cleared encoders and submitting them

mod gpu;
mod init;

pub use gpu::{GpuFrame, HeadlessGpu};
pub use init::GpuInit;

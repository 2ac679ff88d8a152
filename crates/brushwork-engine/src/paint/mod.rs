//! Color model shared between the brush renderer and its style configuration.
//!
//! Geometry types remain in `coords`.

pub mod color;

pub use color::Color;

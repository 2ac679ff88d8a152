//! Coordinate types shared by the map model and the renderers.
//!
//! Canonical CPU space:
//! - Map units, right-handed
//! - +Z up
//!
//! Projection to clip space happens in shaders using a view-projection uniform.

mod vec3;

pub use vec3::Vec3;

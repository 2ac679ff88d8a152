//! Shared scenes for unit tests.

use crate::coords::Vec3;
use crate::model::{Brush, MaterialId, Model, NodeId};

pub(crate) const MAT_A: MaterialId = MaterialId(1);
pub(crate) const MAT_B: MaterialId = MaterialId(2);

/// A 32-unit cube offset along +X by `x`.
pub(crate) fn cube(x: f32, material: MaterialId) -> Brush {
    Brush::cuboid(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 32.0, 32.0, 32.0), material)
        .expect("cube fixture is a valid brush")
}

/// Two cubes under one layer: an opaque `MAT_A` cube and a transparent `MAT_B` cube.
pub(crate) fn two_cube_scene() -> (Model, [NodeId; 2]) {
    let mut model = Model::new();
    let layer = model.add_layer("default");

    let opaque = model.add_brush(layer, cube(0.0, MAT_A)).expect("layer accepts brushes");

    let mut glass = cube(64.0, MAT_B);
    glass.set_transparent(true);
    let transparent = model.add_brush(layer, glass).expect("layer accepts brushes");

    (model, [opaque, transparent])
}

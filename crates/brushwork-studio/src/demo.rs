use anyhow::{Context, Result};
use brushwork_engine::coords::Vec3;
use brushwork_engine::model::{Brush, EditorContext, MaterialId, Model, NodeId};

pub const MAT_FLOOR: MaterialId = MaterialId(1);
pub const MAT_WALL: MaterialId = MaterialId(2);
pub const MAT_DOOR: MaterialId = MaterialId(3);
pub const MAT_GLASS: MaterialId = MaterialId(4);
pub const MAT_CRATE: MaterialId = MaterialId(5);

/// A small map exercising every node kind.
pub struct DemoMap {
    pub model: Model,
    pub editor: EditorContext,
    pub pillars: NodeId,
    pub door: NodeId,
    pub glass: NodeId,
    pub crates: Vec<NodeId>,
}

fn cuboid(min: [f32; 3], max: [f32; 3], material: MaterialId) -> Result<Brush> {
    Brush::cuboid(Vec3::new(min[0], min[1], min[2]), Vec3::new(max[0], max[1], max[2]), material)
        .with_context(|| format!("invalid cuboid {min:?}..{max:?}"))
}

impl DemoMap {
    pub fn build() -> Result<Self> {
        let mut model = Model::new();
        let default = model.add_layer("default");
        let detail = model.add_layer("detail");

        model.add_brush(default, cuboid([-256.0, -256.0, -16.0], [256.0, 256.0, 0.0], MAT_FLOOR)?)?;

        let pillars = model.add_group(default, "pillars")?;
        for i in 0..4 {
            let x = -192.0 + i as f32 * 128.0;
            model.add_brush(pillars, cuboid([x, 160.0, 0.0], [x + 32.0, 192.0, 128.0], MAT_WALL)?)?;
        }

        let door = model.add_entity(default, "func_door")?;
        model.add_brush(door, cuboid([-32.0, -8.0, 0.0], [32.0, 8.0, 96.0], MAT_DOOR)?)?;

        let mut pane = cuboid([64.0, -4.0, 0.0], [192.0, 4.0, 96.0], MAT_GLASS)?;
        pane.set_transparent(true);
        let glass = model.add_brush(default, pane)?;

        let mut crates = Vec::new();
        for i in 0..3 {
            let x = -160.0 + i as f32 * 48.0;
            crates.push(model.add_brush(detail, cuboid([x, -160.0, 0.0], [x + 32.0, -128.0, 32.0], MAT_CRATE)?)?);
        }

        let mut editor = EditorContext::new();
        editor.hide(detail);
        editor.lock(pillars);

        log::info!(
            "demo map: {} nodes, {} brushes",
            model.len(),
            model.brushes().len()
        );

        Ok(Self { model, editor, pillars, door, glass, crates })
    }

    /// Axis-aligned bounds of every brush vertex.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vec3::new(f32::MIN, f32::MIN, f32::MIN);
        let points = self
            .model
            .brushes()
            .into_iter()
            .filter_map(|id| self.model.brush(id))
            .flat_map(|b| b.faces().iter().flat_map(|f| f.positions().to_vec()))
            .collect::<Vec<_>>();
        for p in points {
            min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        (min, max)
    }
}

/// Top-down orthographic view fitting `min..max`, column-major, depth in 0..1
/// with higher Z nearer.
pub fn top_down_view(min: Vec3, max: Vec3) -> [[f32; 4]; 4] {
    let extent = |a: f32, b: f32| (b - a).max(1.0);
    let (dx, dy, dz) = (extent(min.x, max.x), extent(min.y, max.y), extent(min.z, max.z));
    [
        [2.0 / dx, 0.0, 0.0, 0.0],
        [0.0, 2.0 / dy, 0.0, 0.0],
        [0.0, 0.0, -1.0 / dz, 0.0],
        [-(max.x + min.x) / dx, -(max.y + min.y) / dy, max.z / dz, 1.0],
    ]
}

use crate::coords::Vec3;
use crate::render::brush::{
    BrushVertex, IndexArrayBuilder, PrimitiveKind, TexturedIndexArrayBuilder, VertexListBuilder,
};

use super::{MaterialId, NodeId};

/// Map units covered by one texture repeat in the paraxial projection.
const TEXTURE_SCALE: f32 = 64.0;

/// A planar convex polygon bounding a brush.
///
/// Vertices are wound counter-clockwise when seen from outside the brush.
/// The renderer never stores faces; it queries vertex counts during the count
/// pass and emits vertices/indices during the collect pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub(crate) brush: NodeId,
    material: MaterialId,
    positions: Vec<Vec3>,
    vertices: Vec<BrushVertex>,
    normal: Vec3,
    pub(crate) selected: bool,
}

impl Face {
    /// Builds a face from a convex polygon.
    ///
    /// Returns `None` for fewer than three vertices or a zero-area polygon.
    pub fn from_polygon(material: MaterialId, positions: Vec<Vec3>) -> Option<Face> {
        if positions.len() < 3 || positions.iter().any(|p| !p.is_finite()) {
            return None;
        }

        let normal = newell_normal(&positions).normalize_or_zero();
        if normal == Vec3::zero() {
            return None;
        }

        let vertices = positions
            .iter()
            .map(|&p| BrushVertex::new(p, normal, paraxial_uv(p, normal)))
            .collect();

        Some(Face {
            brush: NodeId::DETACHED,
            material,
            positions,
            vertices,
            normal,
            selected: false,
        })
    }

    /// Owning brush. [`NodeId::DETACHED`] until the brush is added to a model.
    #[inline]
    pub fn brush(&self) -> NodeId {
        self.brush
    }

    #[inline]
    pub fn material(&self) -> MaterialId {
        self.material
    }

    #[inline]
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices [`get_face_index`](Self::get_face_index) emits.
    #[inline]
    pub fn face_index_count(&self) -> usize {
        PrimitiveKind::Polygon.index_count(self.vertex_count())
    }

    /// Number of indices [`get_edge_index`](Self::get_edge_index) emits.
    #[inline]
    pub fn edge_index_count(&self) -> usize {
        PrimitiveKind::LineLoop.index_count(self.vertex_count())
    }

    pub fn get_vertices(&self, builder: &mut VertexListBuilder) {
        builder.extend_from_slice(&self.vertices);
    }

    /// Emits the filled polygon for this face. `base` is the position of the
    /// face's first vertex in the shared vertex array.
    pub fn get_face_index(&self, base: u32, builder: &mut TexturedIndexArrayBuilder) {
        builder.add(self.material, PrimitiveKind::Polygon, base, self.vertex_count());
    }

    /// Emits the outline loop for this face.
    pub fn get_edge_index(&self, base: u32, builder: &mut IndexArrayBuilder) {
        builder.add(PrimitiveKind::LineLoop, base, self.vertex_count());
    }
}

fn newell_normal(positions: &[Vec3]) -> Vec3 {
    let mut n = Vec3::zero();
    for (i, a) in positions.iter().enumerate() {
        let b = positions[(i + 1) % positions.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

fn paraxial_uv(p: Vec3, normal: Vec3) -> [f32; 2] {
    let (u, v) = match normal.dominant_axis() {
        0 => (p.y, -p.z),
        1 => (p.x, -p.z),
        _ => (p.x, -p.y),
    };
    [u / TEXTURE_SCALE, v / TEXTURE_SCALE]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(64.0, 0.0, 0.0),
            Vec3::new(64.0, 64.0, 0.0),
            Vec3::new(0.0, 64.0, 0.0),
        ]
    }

    #[test]
    fn normal_follows_winding() {
        let face = Face::from_polygon(MaterialId(1), quad()).unwrap();
        assert_eq!(face.normal(), Vec3::new(0.0, 0.0, 1.0));

        let mut reversed = quad();
        reversed.reverse();
        let face = Face::from_polygon(MaterialId(1), reversed).unwrap();
        assert_eq!(face.normal(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn rejects_degenerate_polygons() {
        assert!(Face::from_polygon(MaterialId(0), quad()[..2].to_vec()).is_none());

        let collinear = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        assert!(Face::from_polygon(MaterialId(0), collinear).is_none());
    }

    #[test]
    fn index_counts_match_primitive_kinds() {
        let face = Face::from_polygon(MaterialId(0), quad()).unwrap();
        assert_eq!(face.vertex_count(), 4);
        assert_eq!(face.face_index_count(), 6); // two triangles
        assert_eq!(face.edge_index_count(), 8); // four segments
    }

    #[test]
    fn uv_projects_onto_dominant_plane() {
        let face = Face::from_polygon(MaterialId(0), quad()).unwrap();
        let mut builder = VertexListBuilder::with_capacity(face.vertex_count());
        face.get_vertices(&mut builder);
        let vertices = builder.finish();
        assert_eq!(vertices.as_slice()[2].uv, [1.0, -1.0]);
    }

    #[test]
    fn detached_until_attached() {
        let face = Face::from_polygon(MaterialId(0), quad()).unwrap();
        assert_eq!(face.brush(), NodeId::DETACHED);
    }
}

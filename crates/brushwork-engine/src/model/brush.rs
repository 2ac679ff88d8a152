use std::collections::HashMap;

use crate::coords::Vec3;

use super::{Edge, Face, FaceRef, MaterialId, ModelError, NodeId};

/// Quantization applied to vertex positions when matching half-edges.
const WELD_SCALE: f32 = 1024.0;

type PointKey = [i64; 3];

/// Input polygon for [`Brush::from_polygons`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub material: MaterialId,
    pub vertices: Vec<Vec3>,
}

impl Polygon {
    #[inline]
    pub fn new(material: MaterialId, vertices: Vec<Vec3>) -> Self {
        Self { material, vertices }
    }
}

/// A convex solid bounded by planar faces.
///
/// Face order is the order the polygons were supplied in and never changes;
/// the renderer's count and collect passes rely on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    faces: Vec<Face>,
    edges: Vec<Edge>,
    selected: bool,
    transparent: bool,
    revision: u64,
}

impl Brush {
    /// Builds a brush from closed convex polygons and derives its edges.
    ///
    /// Every directed polygon edge must be matched by exactly one opposite
    /// directed edge of another polygon.
    pub fn from_polygons<I>(polygons: I) -> Result<Brush, ModelError>
    where
        I: IntoIterator<Item = Polygon>,
    {
        let mut faces = Vec::new();
        for (index, polygon) in polygons.into_iter().enumerate() {
            let face = Face::from_polygon(polygon.material, polygon.vertices)
                .ok_or(ModelError::DegenerateFace { face: index })?;
            faces.push(face);
        }

        if faces.is_empty() {
            return Err(ModelError::EmptyBrush);
        }

        let edges = derive_edges(&faces)?;

        Ok(Brush {
            faces,
            edges,
            selected: false,
            transparent: false,
            revision: 0,
        })
    }

    /// Axis-aligned box spanning `a` and `b`, all faces using `material`.
    pub fn cuboid(a: Vec3, b: Vec3, material: MaterialId) -> Result<Brush, ModelError> {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        let (z0, z1) = (a.z.min(b.z), a.z.max(b.z));
        let p = Vec3::new;

        let quads = [
            [p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)], // -X
            [p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)], // +X
            [p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)], // -Y
            [p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)], // +Y
            [p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)], // -Z
            [p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)], // +Z
        ];

        Brush::from_polygons(quads.into_iter().map(|q| Polygon::new(material, q.to_vec())))
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    #[inline]
    pub fn face_mut(&mut self, index: usize) -> Option<&mut Face> {
        self.faces.get_mut(index)
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// True when any face of this brush is selected.
    #[inline]
    pub fn descendant_selected(&self) -> bool {
        self.faces.iter().any(Face::selected)
    }

    /// Transparent brushes are sorted into the transparent face bucket by the
    /// filters that honour the flag.
    #[inline]
    pub fn transparent(&self) -> bool {
        self.transparent
    }

    #[inline]
    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Total vertex count over all faces.
    pub fn vertex_count(&self) -> usize {
        self.faces.iter().map(Face::vertex_count).sum()
    }

    /// Monotonic counter bumped by every mutation made through the owning model.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn attach(&mut self, id: NodeId) {
        for face in &mut self.faces {
            face.brush = id;
        }
        for edge in &mut self.edges {
            edge.attach(id);
        }
    }
}

fn point_key(p: Vec3) -> PointKey {
    [
        (p.x * WELD_SCALE).round() as i64,
        (p.y * WELD_SCALE).round() as i64,
        (p.z * WELD_SCALE).round() as i64,
    ]
}

fn derive_edges(faces: &[Face]) -> Result<Vec<Edge>, ModelError> {
    let mut half_edges: HashMap<(PointKey, PointKey), usize> = HashMap::new();

    for (face_index, face) in faces.iter().enumerate() {
        let points = face.positions();
        for vertex in 0..points.len() {
            let a = point_key(points[vertex]);
            let b = point_key(points[(vertex + 1) % points.len()]);
            if a == b {
                return Err(ModelError::DegenerateFace { face: face_index });
            }
            if half_edges.insert((a, b), face_index).is_some() {
                return Err(ModelError::NonManifoldEdge { face: face_index, vertex });
            }
        }
    }

    // Walk faces in order (not the map) so edge order is deterministic.
    let mut edges = Vec::with_capacity(half_edges.len() / 2);
    for (face_index, face) in faces.iter().enumerate() {
        let points = face.positions();
        for vertex in 0..points.len() {
            let start = points[vertex];
            let end = points[(vertex + 1) % points.len()];
            let (a, b) = (point_key(start), point_key(end));

            let Some(&opposite) = half_edges.get(&(b, a)) else {
                return Err(ModelError::OpenEdge { face: face_index, vertex });
            };

            if a < b {
                edges.push(Edge::new(
                    FaceRef::new(NodeId::DETACHED, face_index),
                    FaceRef::new(NodeId::DETACHED, opposite),
                    start,
                    end,
                ));
            }
        }
    }

    Ok(edges)
}

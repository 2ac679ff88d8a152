use std::collections::BTreeMap;
use std::ops::Range;

use crate::model::MaterialId;

/// How a run of face vertices is turned into indices.
///
/// Both kinds are emitted as list topologies so a single indexed draw per run
/// covers any number of faces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PrimitiveKind {
    /// Convex polygon, emitted as a triangle fan flattened into a triangle list.
    Polygon,
    /// Closed outline, emitted as a line list.
    LineLoop,
}

impl PrimitiveKind {
    /// Indices emitted for a primitive over `vertices` consecutive vertices.
    #[inline]
    pub fn index_count(self, vertices: usize) -> usize {
        match self {
            PrimitiveKind::Polygon => vertices.saturating_sub(2) * 3,
            PrimitiveKind::LineLoop if vertices < 2 => 0,
            PrimitiveKind::LineLoop => vertices * 2,
        }
    }
}

// ── sizes ─────────────────────────────────────────────────────────────────

/// Exact index counts per primitive kind, accumulated by a count pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexArraySize {
    sizes: BTreeMap<PrimitiveKind, usize>,
}

impl IndexArraySize {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for one primitive of `kind` spanning `vertices` vertices.
    pub fn inc(&mut self, kind: PrimitiveKind, vertices: usize) {
        let count = kind.index_count(vertices);
        if count > 0 {
            *self.sizes.entry(kind).or_default() += count;
        }
    }

    pub fn get(&self, kind: PrimitiveKind) -> usize {
        self.sizes.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.sizes.values().sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Exact index counts per material and primitive kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexturedIndexArraySize {
    sizes: BTreeMap<MaterialId, IndexArraySize>,
}

impl TexturedIndexArraySize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&mut self, material: MaterialId, kind: PrimitiveKind, vertices: usize) {
        if kind.index_count(vertices) > 0 {
            self.sizes.entry(material).or_default().inc(kind, vertices);
        }
    }

    pub fn get(&self, material: MaterialId) -> Option<&IndexArraySize> {
        self.sizes.get(&material)
    }

    pub fn total(&self) -> usize {
        self.sizes.values().map(IndexArraySize::total).sum()
    }

    pub fn material_count(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

// ── region writer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Region {
    start: usize,
    cursor: usize,
    end: usize,
}

/// Preallocated index storage split into one contiguous region per key.
#[derive(Debug)]
struct RegionWriter<K: Ord + Copy> {
    indices: Vec<u32>,
    regions: BTreeMap<K, Region>,
}

impl<K: Ord + Copy + std::fmt::Debug> RegionWriter<K> {
    fn new(sizes: impl IntoIterator<Item = (K, usize)>) -> Self {
        let mut regions = BTreeMap::new();
        let mut offset = 0;
        for (key, size) in sizes {
            if size == 0 {
                continue;
            }
            regions.insert(key, Region { start: offset, cursor: offset, end: offset + size });
            offset += size;
        }
        Self { indices: vec![0; offset], regions }
    }

    fn write(&mut self, key: K, kind: PrimitiveKind, base: u32, vertices: usize) {
        let count = kind.index_count(vertices);
        if count == 0 {
            return;
        }

        let Some(region) = self.regions.get_mut(&key) else {
            debug_assert!(false, "index write into unsized region {key:?}");
            log::warn!("index builder: no region reserved for {key:?}; primitive dropped");
            return;
        };
        if region.cursor + count > region.end {
            debug_assert!(false, "index region {key:?} overflow");
            log::warn!("index builder: region {key:?} overflow; primitive dropped");
            return;
        }

        let out = &mut self.indices[region.cursor..region.cursor + count];
        let n = vertices as u32;
        match kind {
            PrimitiveKind::Polygon => {
                for (i, tri) in out.chunks_exact_mut(3).enumerate() {
                    let i = i as u32;
                    tri.copy_from_slice(&[base, base + i + 1, base + i + 2]);
                }
            }
            PrimitiveKind::LineLoop => {
                for (i, seg) in out.chunks_exact_mut(2).enumerate() {
                    let i = i as u32;
                    seg.copy_from_slice(&[base + i, base + (i + 1) % n]);
                }
            }
        }
        region.cursor += count;
    }

    fn finish(self) -> (Vec<u32>, Vec<(K, Range<u32>)>) {
        let mut ranges = Vec::with_capacity(self.regions.len());
        for (key, region) in self.regions {
            debug_assert_eq!(region.cursor, region.end, "index count/collect mismatch in {key:?}");
            if region.cursor != region.end {
                log::warn!(
                    "index builder: region {key:?} filled {} of {}",
                    region.cursor - region.start,
                    region.end - region.start
                );
            }
            ranges.push((key, region.start as u32..region.end as u32));
        }
        (self.indices, ranges)
    }
}

// ── untextured ────────────────────────────────────────────────────────────

/// Collects indices into one contiguous range per primitive kind.
#[derive(Debug)]
pub struct IndexArrayBuilder {
    writer: RegionWriter<PrimitiveKind>,
}

impl IndexArrayBuilder {
    pub fn new(size: &IndexArraySize) -> Self {
        Self {
            writer: RegionWriter::new(size.sizes.iter().map(|(&k, &n)| (k, n))),
        }
    }

    /// Emits one primitive over the vertices `base..base + vertices`.
    pub fn add(&mut self, kind: PrimitiveKind, base: u32, vertices: usize) {
        self.writer.write(kind, kind, base, vertices);
    }

    pub fn finish(self) -> IndexArray {
        let (indices, ranges) = self.writer.finish();
        IndexArray { indices, ranges }
    }
}

/// Sealed index storage with its per-kind ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexArray {
    indices: Vec<u32>,
    ranges: Vec<(PrimitiveKind, Range<u32>)>,
}

impl IndexArray {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    #[inline]
    pub fn ranges(&self) -> &[(PrimitiveKind, Range<u32>)] {
        &self.ranges
    }
}

// ── textured ──────────────────────────────────────────────────────────────

/// One contiguous index range drawn with a single material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRun {
    pub material: MaterialId,
    pub primitive: PrimitiveKind,
    pub range: Range<u32>,
}

/// Collects indices into contiguous runs keyed by material, in material order.
#[derive(Debug)]
pub struct TexturedIndexArrayBuilder {
    writer: RegionWriter<(MaterialId, PrimitiveKind)>,
}

impl TexturedIndexArrayBuilder {
    pub fn new(size: &TexturedIndexArraySize) -> Self {
        let regions = size.sizes.iter().flat_map(|(&material, per_kind)| {
            per_kind.sizes.iter().map(move |(&kind, &n)| ((material, kind), n))
        });
        Self { writer: RegionWriter::new(regions) }
    }

    pub fn add(&mut self, material: MaterialId, kind: PrimitiveKind, base: u32, vertices: usize) {
        self.writer.write((material, kind), kind, base, vertices);
    }

    pub fn finish(self) -> TexturedIndexArray {
        let (indices, ranges) = self.writer.finish();
        let runs = ranges
            .into_iter()
            .map(|((material, primitive), range)| MaterialRun { material, primitive, range })
            .collect();
        TexturedIndexArray { indices, runs }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexturedIndexArray {
    indices: Vec<u32>,
    runs: Vec<MaterialRun>,
}

impl TexturedIndexArray {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Runs in ascending material order.
    #[inline]
    pub fn runs(&self) -> &[MaterialRun] {
        &self.runs
    }

    /// Total indices drawn with `material`.
    pub fn material_len(&self, material: MaterialId) -> usize {
        self.runs
            .iter()
            .filter(|r| r.material == material)
            .map(|r| r.range.len())
            .sum()
    }
}

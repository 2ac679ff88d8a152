use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::batch::{BatchItem, FaceBucket, RecordingBatch};
use super::buffers::{BrushVertex, IndexArray, TexturedIndexArray, VertexArray};

/// Depth format expected by [`GpuBrushRenderer`] in [`RenderTarget::depth_view`].
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform slots are addressed with dynamic offsets; 256 is the portable alignment.
const STYLE_STRIDE: u64 = 256;
const STYLE_BINDING_SIZE: Option<wgpu::BufferSize> =
    wgpu::BufferSize::new(std::mem::size_of::<StyleUniform>() as u64);

/// Submits recorded brush batches with wgpu.
///
/// Vertex and index data of every distinct array referenced by the batch are
/// packed into one vertex and one index buffer. Uploads are skipped while the
/// batch keeps referencing the same `Arc`s as the previous frame.
#[derive(Default)]
pub struct GpuBrushRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipelines: Option<Pipelines>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    style_ubo: Option<wgpu::Buffer>,
    style_capacity: usize,

    vertices: Staged<Arc<VertexArray>>,
    indices: Staged<IndexSource>,
}

struct Pipelines {
    opaque_faces: wgpu::RenderPipeline,
    transparent_faces: wgpu::RenderPipeline,
    edges: wgpu::RenderPipeline,
    occluded_edges: wgpu::RenderPipeline,
}

impl GpuBrushRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every item of `batch` in submission order into `target`.
    ///
    /// Color and depth are loaded, not cleared.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, batch: &RecordingBatch) {
        if batch.is_empty() {
            return;
        }

        self.ensure_pipelines(ctx);
        self.vertices.stage(
            ctx,
            batch.items().iter().map(|item| Arc::clone(vertices_of(item))).collect(),
        );
        self.indices
            .stage(ctx, batch.items().iter().map(IndexSource::of).collect());
        self.ensure_style_capacity(ctx, batch.len());
        self.write_styles(ctx, batch);

        let Some(pipelines) = self.pipelines.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vbo) = self.vertices.buffer.as_ref() else { return };
        let Some(ibo) = self.indices.buffer.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("brushwork brush pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        for (slot, item) in batch.items().iter().enumerate() {
            let Some(base_vertex) = self.vertices.offset_of(vertices_of(item)) else { continue };
            let Some(first_index) = self.indices.offset_of(&IndexSource::of(item)) else { continue };

            let pipeline = match item {
                BatchItem::Faces(faces) if faces.bucket == FaceBucket::Opaque => &pipelines.opaque_faces,
                BatchItem::Faces(_) => &pipelines.transparent_faces,
                BatchItem::Edges(edges) if edges.occluded => &pipelines.occluded_edges,
                BatchItem::Edges(_) => &pipelines.edges,
            };
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[(slot as u64 * STYLE_STRIDE) as u32]);

            let first_index = first_index as u32;
            for call in item.draw_calls() {
                rpass.draw_indexed(
                    first_index + call.range.start..first_index + call.range.end,
                    base_vertex as i32,
                    0..1,
                );
            }
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipelines.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("brushwork brush shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/brush.wgsl").into()),
        });

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("brushwork brush bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: STYLE_BINDING_SIZE,
                },
                count: None,
            }],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("brushwork brush pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let build = |desc: PipelineDesc| create_pipeline(ctx, &layout, &shader, desc);
        let pipelines = Pipelines {
            opaque_faces: build(PipelineDesc {
                label: "brushwork opaque faces",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
                blend: None,
            }),
            transparent_faces: build(PipelineDesc {
                label: "brushwork transparent faces",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            }),
            edges: build(PipelineDesc {
                label: "brushwork edges",
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            }),
            occluded_edges: build(PipelineDesc {
                label: "brushwork occluded edges",
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            }),
        };

        self.pipeline_format = Some(ctx.surface_format);
        self.pipelines = Some(pipelines);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.style_ubo = None;
        self.style_capacity = 0;
    }

    fn ensure_style_capacity(&mut self, ctx: &RenderCtx<'_>, slots: usize) {
        if slots <= self.style_capacity && self.style_ubo.is_some() && self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let capacity = slots.next_power_of_two().max(16);
        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("brushwork brush style ubo"),
            size: capacity as u64 * STYLE_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("brushwork brush bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: STYLE_BINDING_SIZE,
                }),
            }],
        });

        self.style_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.style_capacity = capacity;
    }

    fn write_styles(&self, ctx: &RenderCtx<'_>, batch: &RecordingBatch) {
        let Some(ubo) = self.style_ubo.as_ref() else { return };

        let mut bytes = vec![0u8; batch.len() * STYLE_STRIDE as usize];
        for (slot, item) in batch.items().iter().enumerate() {
            let uniform = StyleUniform::for_item(item, ctx.view_proj);
            let at = slot * STYLE_STRIDE as usize;
            bytes[at..at + std::mem::size_of::<StyleUniform>()].copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }
}

fn vertices_of(item: &BatchItem) -> &Arc<VertexArray> {
    match item {
        BatchItem::Faces(faces) => &faces.vertices,
        BatchItem::Edges(edges) => &edges.vertices,
    }
}

// ── pipelines ─────────────────────────────────────────────────────────────

struct PipelineDesc {
    label: &'static str,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
    blend: Option<wgpu::BlendState>,
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    desc: PipelineDesc,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[BrushVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

// ── style uniform ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct StyleUniform {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    tint: [f32; 4],
    /// alpha, grayscale, tint, shading
    params: [f32; 4],
}

impl StyleUniform {
    fn for_item(item: &BatchItem, view_proj: [[f32; 4]; 4]) -> Self {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match item {
            BatchItem::Faces(faces) => {
                let style = &faces.style;
                Self {
                    view_proj,
                    color: style.color.to_array(),
                    tint: style.tint.unwrap_or(Color::white()).to_array(),
                    params: [
                        style.alpha.unwrap_or(1.0),
                        flag(style.grayscale),
                        flag(style.tint.is_some()),
                        1.0,
                    ],
                }
            }
            BatchItem::Edges(edges) => Self {
                view_proj,
                color: edges.color.to_array(),
                tint: Color::white().to_array(),
                params: [1.0, 0.0, 0.0, 0.0],
            },
        }
    }
}

// ── staging ───────────────────────────────────────────────────────────────

/// CPU array that can be packed into a shared GPU buffer.
trait Source {
    fn same(&self, other: &Self) -> bool;
    fn bytes(&self) -> &[u8];
    fn len(&self) -> usize;
}

impl Source for Arc<VertexArray> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }

    fn bytes(&self) -> &[u8] {
        VertexArray::bytes(self)
    }

    fn len(&self) -> usize {
        VertexArray::len(self)
    }
}

enum IndexSource {
    Faces(Arc<TexturedIndexArray>),
    Edges(Arc<IndexArray>),
}

impl IndexSource {
    fn of(item: &BatchItem) -> Self {
        match item {
            BatchItem::Faces(faces) => IndexSource::Faces(Arc::clone(&faces.indices)),
            BatchItem::Edges(edges) => IndexSource::Edges(Arc::clone(&edges.indices)),
        }
    }
}

impl Source for IndexSource {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (IndexSource::Faces(a), IndexSource::Faces(b)) => Arc::ptr_eq(a, b),
            (IndexSource::Edges(a), IndexSource::Edges(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            IndexSource::Faces(a) => a.bytes(),
            IndexSource::Edges(a) => a.bytes(),
        }
    }

    fn len(&self) -> usize {
        match self {
            IndexSource::Faces(a) => a.len(),
            IndexSource::Edges(a) => a.len(),
        }
    }
}

/// Keeps the first occurrence of every distinct source.
fn dedup<S: Source>(sources: Vec<S>) -> Vec<S> {
    let mut out: Vec<S> = Vec::with_capacity(sources.len());
    for source in sources {
        if !out.iter().any(|s| s.same(&source)) {
            out.push(source);
        }
    }
    out
}

/// Element offsets of each source when packed back to back.
fn packed_offsets<S: Source>(sources: &[S]) -> Vec<u64> {
    sources
        .iter()
        .scan(0u64, |next, s| {
            let at = *next;
            *next += s.len() as u64;
            Some(at)
        })
        .collect()
}

struct Staged<S> {
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    sources: Vec<S>,
    offsets: Vec<u64>,
}

impl<S> Default for Staged<S> {
    fn default() -> Self {
        Self { buffer: None, capacity: 0, sources: Vec::new(), offsets: Vec::new() }
    }
}

impl<S: Source> Staged<S> {
    fn stage(&mut self, ctx: &RenderCtx<'_>, wanted: Vec<S>) {
        let wanted = dedup(wanted);
        let unchanged = self.buffer.is_some()
            && wanted.len() == self.sources.len()
            && wanted.iter().zip(&self.sources).all(|(a, b)| a.same(b));
        if unchanged {
            return;
        }

        let total: u64 = wanted.iter().map(|s| s.bytes().len() as u64).sum();
        self.ensure_capacity(ctx, total.max(wgpu::COPY_BUFFER_ALIGNMENT));

        if let Some(buffer) = self.buffer.as_ref() {
            let mut at = 0u64;
            for source in &wanted {
                let bytes = source.bytes();
                if !bytes.is_empty() {
                    ctx.queue.write_buffer(buffer, at, bytes);
                }
                at += bytes.len() as u64;
            }
        }

        log::trace!("brush gpu: staged {} sources, {} bytes", wanted.len(), total);
        self.offsets = packed_offsets(&wanted);
        self.sources = wanted;
    }

    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, bytes: u64) {
        if bytes <= self.capacity && self.buffer.is_some() {
            return;
        }

        let capacity = bytes.next_power_of_two().max(4096);
        self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("brushwork brush staging"),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = capacity;
    }

    fn offset_of(&self, source: &S) -> Option<u64> {
        self.sources
            .iter()
            .position(|s| s.same(source))
            .and_then(|i| self.offsets.get(i).copied())
    }
}

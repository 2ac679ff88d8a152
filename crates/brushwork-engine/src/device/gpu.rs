use anyhow::{Context, Result};

use crate::paint::Color;
use crate::render::brush::DEPTH_FORMAT;

use super::GpuInit;

/// Color and depth textures rendered into instead of a surface.
struct OffscreenTarget {
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl OffscreenTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = |label, format, usage| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let color = texture(
            "brushwork offscreen color",
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let depth = texture(
            "brushwork offscreen depth",
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        Self {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            _color: color,
            _depth: depth,
        }
    }
}

/// A single frame being recorded.
pub struct GpuFrame {
    pub encoder: wgpu::CommandEncoder,
}

/// Owns wgpu core objects and an offscreen render target.
///
/// This type is the low-level rendering context for headless use:
/// - creates and stores Instance/Adapter/Device/Queue
/// - owns color + depth targets sized by [`GpuInit`]
/// - provides cleared frames (encoder) and submits them
pub struct HeadlessGpu {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    target: OffscreenTarget,
    color_format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl HeadlessGpu {
    /// Creates a device without a surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        init.validate()?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("brushwork-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let info = adapter.get_info();
        log::info!("gpu: {} ({:?})", info.name, info.backend);

        let target = OffscreenTarget::new(&device, init.width, init.height, init.color_format);

        Ok(HeadlessGpu {
            _instance: instance,
            adapter,
            device,
            queue,
            target,
            color_format: init.color_format,
            size: (init.width, init.height),
        })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.target.color_view
    }

    #[inline]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.target.depth_view
    }

    /// Creates an encoder whose first pass clears color to `clear` and depth to 1.
    pub fn begin_frame(&self, clear: Color) -> GpuFrame {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("brushwork frame encoder"),
        });

        // The pass only clears; dropping it ends it.
        let [r, g, b, a] = clear.to_array();
        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("brushwork clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        drop(pass);

        GpuFrame { encoder }
    }

    /// Submits the recorded commands for the given frame.
    pub fn submit(&self, frame: GpuFrame) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(frame.encoder.finish()))
    }
}

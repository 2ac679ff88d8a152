//! Headless brushwork driver.
//!
//! Builds a demo map, drives three brush renderers (unselected, selected,
//! locked) through a sequence of edits and logs what each frame submits.
//! With `--gpu` the recorded batches are also drawn into an offscreen target.

mod demo;
mod options;

use anyhow::{Context, Result};
use brushwork_engine::device::{GpuInit, HeadlessGpu};
use brushwork_engine::logging::{init_logging, LoggingConfig};
use brushwork_engine::model::NodeId;
use brushwork_engine::paint::Color;
use brushwork_engine::render::brush::{
    BrushRenderer, BrushStyle, GpuBrushRenderer, LockedBrushFilter, RecordingBatch, RenderContext,
    SelectedBrushFilter, UnselectedBrushFilter,
};
use brushwork_engine::render::{RenderCtx, RenderTarget};

use demo::{top_down_view, DemoMap};
use options::StudioOptions;

fn main() {
    let options = match StudioOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(2);
        }
    };

    init_logging(LoggingConfig {
        env_filter: options.log.clone(),
        ..LoggingConfig::default()
    });

    if let Err(e) = run(&options) {
        log::error!("brushwork studio failed: {e:#}");
        std::process::exit(1);
    }
}

/// The three renderers an editor viewport keeps.
struct Renderers {
    unselected: BrushRenderer,
    selected: BrushRenderer,
    locked: BrushRenderer,
}

impl Renderers {
    fn new(options: &StudioOptions) -> Self {
        let mut unselected = BrushRenderer::new(Box::new(UnselectedBrushFilter));
        unselected.set_transparency_alpha(0.4);
        unselected.set_show_occluded_edges(options.occluded);

        let mut selected = BrushRenderer::new(Box::new(SelectedBrushFilter));
        selected.set_style(BrushStyle {
            edge_color: Color::rgb(1.0, 0.0, 0.0),
            occluded_edge_color: Color::new(1.0, 0.0, 0.0, 0.4),
            tint_color: Color::rgb(1.0, 0.6, 0.6),
            tint: true,
            show_occluded_edges: true,
            ..BrushStyle::default()
        });

        let mut locked = BrushRenderer::new(Box::new(LockedBrushFilter));
        locked.set_grayscale(true);
        locked.set_edge_color(Color::rgb(0.4, 0.4, 0.4));

        let mut renderers = Self { unselected, selected, locked };
        renderers.for_each(|r| r.set_show_hidden_brushes(options.show_hidden));
        renderers
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut BrushRenderer)) {
        f(&mut self.unselected);
        f(&mut self.selected);
        f(&mut self.locked);
    }
}

struct Gpu {
    gpu: HeadlessGpu,
    renderer: GpuBrushRenderer,
    view_proj: [[f32; 4]; 4],
}

impl Gpu {
    fn draw(&mut self, batch: &RecordingBatch) {
        let mut frame = self.gpu.begin_frame(Color::rgb(0.08, 0.08, 0.1));
        {
            let ctx = RenderCtx::new(
                self.gpu.device(),
                self.gpu.queue(),
                self.gpu.color_format(),
                self.view_proj,
            );
            let mut target = RenderTarget::new(&mut frame.encoder, self.gpu.color_view(), self.gpu.depth_view());
            self.renderer.render(&ctx, &mut target, batch);
        }
        self.gpu.submit(frame);
    }
}

fn run(options: &StudioOptions) -> Result<()> {
    let mut map = DemoMap::build()?;
    let mut renderers = Renderers::new(options);
    let brushes = map.model.brushes();
    renderers.for_each(|r| r.set_brushes(brushes.clone()));

    let mut gpu = if options.gpu {
        let gpu = pollster::block_on(HeadlessGpu::new(GpuInit::default()))
            .context("GPU initialization failed")?;
        let info = gpu.adapter_info();
        let (width, height) = gpu.size();
        log::info!("gpu: {} ({:?}), offscreen {width}x{height}", info.name, info.backend);
        let (min, max) = map.bounds();
        Some(Gpu { gpu, renderer: GpuBrushRenderer::new(), view_proj: top_down_view(min, max) })
    } else {
        None
    };

    let mut frame = |label: &str, map: &DemoMap, renderers: &mut Renderers| {
        let ctx = RenderContext::default();
        let mut batch = RecordingBatch::new();
        renderers.for_each(|r| r.render(&map.model, &map.editor, &ctx, &mut batch));
        report(label, renderers, &batch);
        if let Some(gpu) = gpu.as_mut() {
            gpu.draw(&batch);
        }
    };

    frame("initial", &map, &mut renderers);
    frame("idle", &map, &mut renderers);

    // Entity selection does not touch brush revisions; tell the renderers directly.
    map.model.set_selected(map.door, true);
    renderers.for_each(BrushRenderer::invalidate);
    frame("door selected", &map, &mut renderers);

    renderers.for_each(|r| {
        r.set_tint_color(Color::rgb(0.6, 1.0, 0.6));
        r.set_transparency_alpha(0.6);
    });
    frame("restyled", &map, &mut renderers);

    map.model.select_face(map.glass, 0, true);
    renderers.for_each(|r| {
        r.sync_revisions(&map.model);
    });
    frame("glass face selected", &map, &mut renderers);

    let removed: Vec<NodeId> = map.crates.drain(..1).collect();
    for &id in &removed {
        map.model.remove(id);
    }
    renderers.for_each(|r| r.remove_brushes(&removed));
    renderers.for_each(|r| r.set_show_hidden_brushes(!options.show_hidden));
    frame("crate removed, hidden toggled", &map, &mut renderers);

    renderers.for_each(BrushRenderer::clear);
    frame("cleared", &map, &mut renderers);

    Ok(())
}

fn report(label: &str, renderers: &Renderers, batch: &RecordingBatch) {
    log::info!(
        "[{label}] {} batch items, {} draw calls",
        batch.len(),
        batch.draw_call_count()
    );
    for (name, r) in [
        ("unselected", &renderers.unselected),
        ("selected", &renderers.selected),
        ("locked", &renderers.locked),
    ] {
        let stats = r.stats();
        log::info!(
            "  {name:<10} brushes={:<3} vertices={:<4} opaque={:<4} transparent={:<4} edges={:<4} passes={}/{}",
            r.brush_count(),
            r.vertex_array().len(),
            r.opaque_indices().len(),
            r.transparent_indices().len(),
            r.edge_indices().len(),
            stats.vertex_passes,
            stats.index_passes,
        );
    }
}

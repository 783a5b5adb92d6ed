//! `wgpu` implementation of the engine's rendering contracts.
//!
//! [`WindowSurface`] hands its GPU context to the single renderer it creates;
//! from then on the renderer owns the surface, its depth and multisample targets
//! and every GPU copy of scene resources.

mod ctx;
mod mesh;
mod uniforms;

use kitsune_engine::backend::{DrawingSurface, RenderDevice, RendererSettings};
use kitsune_engine::camera::PerspectiveCamera;
use kitsune_engine::error::BackendError;
use kitsune_engine::scene::Scene;
use kitsune_engine::size::MAX_PIXEL_RATIO;
use winit::dpi::PhysicalSize;

use crate::gpu::{Gpu, SurfaceErrorAction};

use ctx::{RenderCtx, RenderTarget};
use mesh::{clear_color, MeshRenderer, DEPTH_FORMAT};

const MSAA_SAMPLES: u32 = 4;

/// The window's drawable surface, before a renderer claims it.
pub struct WindowSurface {
    gpu: Option<Gpu>,
}

impl WindowSurface {
    pub fn new(gpu: Gpu) -> Self {
        Self { gpu: Some(gpu) }
    }
}

impl DrawingSurface for WindowSurface {
    fn create_renderer(
        &mut self,
        settings: &RendererSettings,
    ) -> kitsune_engine::Result<Box<dyn RenderDevice>> {
        let gpu = self
            .gpu
            .take()
            .ok_or_else(|| BackendError::new("the window surface is already bound to a renderer"))?;
        Ok(Box::new(WgpuRenderer::new(gpu, settings)))
    }
}

struct Targets {
    size: PhysicalSize<u32>,
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

/// Draws the scene into the window surface.
pub struct WgpuRenderer {
    gpu: Option<Gpu>,
    meshes: MeshRenderer,
    targets: Option<Targets>,

    sample_count: u32,
    clear: wgpu::Color,

    logical: (f64, f64),
    pixel_ratio: f64,
}

impl WgpuRenderer {
    fn new(gpu: Gpu, settings: &RendererSettings) -> Self {
        let sample_count = if settings.antialias { MSAA_SAMPLES } else { 1 };
        let meshes = {
            let ctx = RenderCtx {
                device: gpu.device(),
                queue: gpu.queue(),
                surface_format: gpu.surface_format(),
                sample_count,
            };
            MeshRenderer::new(&ctx, settings)
        };
        let size = gpu.size();
        log::info!(
            "renderer created: {:?}, {}x{} px, {}x msaa",
            gpu.surface_format(),
            size.width,
            size.height,
            sample_count
        );

        Self {
            gpu: Some(gpu),
            meshes,
            targets: None,
            sample_count,
            clear: clear_color(settings),
            logical: (f64::from(size.width), f64::from(size.height)),
            pixel_ratio: 1.0,
        }
    }

    fn apply_size(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (w, h) = self.logical;
        let ratio = self.pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO);
        gpu.resize(PhysicalSize::new(
            (w * ratio).round().max(0.0) as u32,
            (h * ratio).round().max(0.0) as u32,
        ));
    }

    fn ensure_targets(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        let size = gpu.size();
        if self.targets.as_ref().is_some_and(|t| t.size == size) {
            return;
        }

        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let attachment = |label, format| {
            gpu.device()
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: self.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let depth = attachment("kitsune depth", DEPTH_FORMAT);
        let msaa = (self.sample_count > 1).then(|| attachment("kitsune msaa color", gpu.surface_format()));
        self.targets = Some(Targets { size, depth, msaa });
    }
}

impl RenderDevice for WgpuRenderer {
    fn set_size(&mut self, width: f64, height: f64) {
        self.logical = (width, height);
        self.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        self.apply_size();
    }

    fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> kitsune_engine::Result<()> {
        // Skipped and minimized frames still free disposed resources.
        self.meshes.release_disposed(scene);
        self.ensure_targets();
        let (Some(gpu), Some(targets)) = (self.gpu.as_mut(), self.targets.as_ref()) else {
            return Ok(());
        };
        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        Err(BackendError::new("the GPU ran out of memory while acquiring a frame").into())
                    }
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };

        {
            let ctx = RenderCtx {
                device: gpu.device(),
                queue: gpu.queue(),
                surface_format: gpu.surface_format(),
                sample_count: self.sample_count,
            };
            let (color_view, resolve_target) = match targets.msaa.as_ref() {
                Some(msaa) => (msaa, Some(&frame.view)),
                None => (&frame.view, None),
            };
            let mut target = RenderTarget {
                encoder: &mut frame.encoder,
                color_view,
                resolve_target,
                depth_view: &targets.depth,
                clear: self.clear,
            };
            self.meshes.render(&ctx, &mut target, scene, camera);
        }

        gpu.submit(frame);
        Ok(())
    }

    fn dispose(&mut self) {
        self.meshes.clear();
        self.targets = None;
        if self.gpu.take().is_some() {
            log::debug!("renderer disposed");
        }
    }
}

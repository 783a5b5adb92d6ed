use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::{CompositeAlphaMode, PresentMode, SurfaceError, TextureFormat};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// How the viewer asks for its GPU context.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when the surface offers one.
    pub prefer_srgb: bool,

    /// Used when supported; otherwise `Fifo`, which every surface supports.
    pub present_mode: PresentMode,

    pub power_preference: wgpu::PowerPreference,

    /// Frames the presentation engine may queue ahead. A hint.
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: PresentMode::AutoVsync,
            power_preference: wgpu::PowerPreference::HighPerformance,
            frame_latency: 2,
        }
    }
}

/// Device, queue and the configured window surface.
///
/// The surface holds an `Arc<Window>`, so a `Gpu` can outlive the scope that
/// created the window and move into the renderer.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Last requested drawable size. May be 0x0 while minimized, unlike `config`.
    size: PhysicalSize<u32>,
}

/// One acquired swapchain image plus the encoder recording into it.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the caller should do after `begin_frame` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame should succeed.
    Reconfigured,
    SkipFrame,
    /// Out of memory. The session cannot continue.
    Fatal,
}

impl Gpu {
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kitsune device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("the surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: choose_present_mode(&caps.present_modes, init.present_mode),
            alpha_mode: choose_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: init.frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {:?}, {:?}, {}x{}",
            config.format,
            config.present_mode,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Records `size` and reconfigures the surface when it actually changed.
    /// A zero extent is recorded but never configured.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        let unchanged = self.config.width == size.width && self.config.height == size.height;
        if size.width == 0 || size.height == 0 || unchanged {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kitsune frame"),
        });
        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands, then presents.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit([encoder.finish()]);
        drop(view);
        surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                log::warn!("surface {err}; reconfiguring");
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => {
                log::error!("surface out of memory");
                SurfaceErrorAction::Fatal
            }
            SurfaceError::Timeout | SurfaceError::Other => {
                log::warn!("surface {err}; skipping the frame");
                SurfaceErrorAction::SkipFrame
            }
        }
    }
}

fn choose_surface_format(formats: &[TextureFormat], prefer_srgb: bool) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| prefer_srgb && f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn choose_present_mode(supported: &[PresentMode], wanted: PresentMode) -> PresentMode {
    match wanted {
        // The auto modes resolve inside wgpu.
        PresentMode::AutoVsync | PresentMode::AutoNoVsync => wanted,
        mode if supported.contains(&mode) => mode,
        _ => PresentMode::Fifo,
    }
}

fn choose_alpha_mode(supported: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    if supported.contains(&CompositeAlphaMode::Opaque) {
        CompositeAlphaMode::Opaque
    } else {
        supported.first().copied().unwrap_or(CompositeAlphaMode::Auto)
    }
}

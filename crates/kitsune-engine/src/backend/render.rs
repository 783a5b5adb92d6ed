use crate::camera::PerspectiveCamera;
use crate::config::RendererConfig;
use crate::error::Result;
use crate::scene::Scene;

/// Settings the renderer is created with.
pub type RendererSettings = RendererConfig;

/// Host-provided surface the renderer draws into.
///
/// The core only configures the surface through the renderer it creates; it never
/// creates or destroys the surface itself.
pub trait DrawingSurface {
    fn create_renderer(&mut self, settings: &RendererSettings) -> Result<Box<dyn RenderDevice>>;
}

/// Renderer bound to a drawing surface.
pub trait RenderDevice {
    /// Sets the drawing buffer size in logical pixels.
    fn set_size(&mut self, width: f64, height: f64);

    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Draws `scene` from `camera`.
    ///
    /// Implementations drain `scene.resources.take_released()` to free their copies
    /// of disposed resources.
    fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> Result<()>;

    /// Frees every backend object held by the renderer.
    fn dispose(&mut self);
}

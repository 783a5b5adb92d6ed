use crate::backend::{DrawingSurface, RenderDevice, RendererSettings};
use crate::core::{Destroyable, Resizable, Shared, Updatable};
use crate::error::Result;
use crate::scene::SharedScene;
use crate::size::ViewportSize;
use crate::time::FrameTime;

use super::camera::CameraHolder;

/// Owns the renderer created from the host surface and draws one frame per update.
pub struct RendererHolder {
    device: Option<Box<dyn RenderDevice>>,
    scene: SharedScene,
    camera: Shared<CameraHolder>,
}

impl RendererHolder {
    pub fn new(
        scene: SharedScene,
        camera: Shared<CameraHolder>,
        surface: &mut dyn DrawingSurface,
        size: ViewportSize,
        settings: &RendererSettings,
    ) -> Result<Self> {
        let mut device = surface.create_renderer(settings)?;
        device.set_size(size.width, size.height);
        device.set_pixel_ratio(size.pixel_ratio);
        Ok(Self {
            device: Some(device),
            scene,
            camera,
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.device.is_none()
    }
}

impl Resizable for RendererHolder {
    fn resize(&mut self, size: &ViewportSize) {
        if let Some(device) = self.device.as_mut() {
            device.set_size(size.width, size.height);
            device.set_pixel_ratio(size.pixel_ratio);
        }
    }
}

impl Updatable for RendererHolder {
    fn update(&mut self, _time: &FrameTime) -> Result<()> {
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };
        let camera = self.camera.borrow();
        let mut scene = self.scene.borrow_mut();
        device.render(&mut scene, camera.camera())
    }
}

impl Destroyable for RendererHolder {
    fn destroy(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::backend::headless::HeadlessSurface;
    use crate::config::CameraConfig;
    use crate::scene::Scene;

    fn holder(surface: &mut HeadlessSurface) -> RendererHolder {
        let size = ViewportSize::new(800.0, 600.0, 3.0);
        let camera = Rc::new(RefCell::new(CameraHolder::new(&CameraConfig::default(), size)));
        RendererHolder::new(Scene::shared(), camera, surface, size, &RendererSettings::default()).unwrap()
    }

    #[test]
    fn construction_applies_current_size() {
        let mut surface = HeadlessSurface::new();
        let _holder = holder(&mut surface);
        let stats = surface.stats();
        assert_eq!(stats.borrow().size, (800.0, 600.0));
        assert_eq!(stats.borrow().pixel_ratio, 2.0);
    }

    #[test]
    fn destroy_disposes_once_and_stops_rendering() {
        let mut surface = HeadlessSurface::new();
        let mut holder = holder(&mut surface);
        holder.update(&FrameTime::default()).unwrap();

        holder.destroy();
        holder.destroy();
        holder.update(&FrameTime::default()).unwrap();

        let stats = surface.stats();
        assert_eq!(stats.borrow().disposals, 1);
        assert_eq!(stats.borrow().renders, 1);
        assert!(holder.is_disposed());
    }
}

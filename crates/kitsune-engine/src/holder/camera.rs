use crate::camera::PerspectiveCamera;
use crate::config::CameraConfig;
use crate::core::Resizable;
use crate::size::ViewportSize;

/// Owns the perspective camera and keeps its projection in step with the viewport.
#[derive(Debug)]
pub struct CameraHolder {
    camera: PerspectiveCamera,
    size: ViewportSize,
}

impl CameraHolder {
    pub fn new(config: &CameraConfig, size: ViewportSize) -> Self {
        Self {
            camera: PerspectiveCamera::from_config(config, size.aspect() as f32),
            size,
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// Viewport the projection was last computed for.
    pub fn size(&self) -> ViewportSize {
        self.size
    }
}

impl Resizable for CameraHolder {
    fn resize(&mut self, size: &ViewportSize) {
        self.size = *size;
        self.camera.aspect = size.aspect() as f32;
        self.camera.update_projection_matrix();
    }
}

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Right-handed perspective camera looking at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov, aspect, config.near, config.far);
        camera.position = Vec3::from_array(config.position);
        camera.target = Vec3::from_array(config.target);
        camera
    }

    /// Recomputes the projection after `fov`, `aspect`, `near` or `far` changed.
    pub fn update_projection_matrix(&mut self) {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far);
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_config_places_the_camera() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        assert_eq!(camera.position, Vec3::new(6.0, 4.0, 8.0));
        assert_eq!(camera.fov, 35.0);
    }

    #[test]
    fn projection_follows_aspect_after_update() {
        let mut camera = PerspectiveCamera::new(35.0, 1.0, 0.1, 100.0);
        let before = camera.projection();
        camera.aspect = 2.0;
        assert_eq!(camera.projection(), before);
        camera.update_projection_matrix();
        assert_relative_eq!(camera.projection().x_axis.x * 2.0, before.x_axis.x, epsilon = 1e-5);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1.5);
        let clip = camera.view_projection().project_point3(camera.target);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-5);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn degenerate_aspect_stays_finite() {
        let mut camera = PerspectiveCamera::new(35.0, 0.0, 0.1, 100.0);
        camera.update_projection_matrix();
        assert!(camera.projection().is_finite());
    }
}

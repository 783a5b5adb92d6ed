use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::config::ControlsConfig;
use crate::input::{MouseButton, MouseWheelDelta, PointerEvent, PointerState};

use super::perspective::PerspectiveCamera;

const POLAR_EPSILON: f32 = 1e-6;
const ZOOM_STEP: f32 = 0.95;

/// Orbits a camera around a target on a sphere.
///
/// Dragging with the primary button rotates, the wheel dollies. With damping on,
/// each `update` applies a fraction of the pending motion so the camera eases out
/// after the pointer stops.
#[derive(Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pointer: PointerState,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, config: &ControlsConfig) -> Self {
        Self {
            target,
            enabled: true,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pointer: PointerState::default(),
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    /// Feeds pointer input. `viewport_height` scales drags so a full-height drag
    /// is one full turn.
    pub fn handle_pointer(&mut self, event: &PointerEvent, viewport_height: f32) {
        if !self.enabled {
            return;
        }

        let displacement = self.pointer.apply(event);
        match event {
            PointerEvent::Moved(_) if self.pointer.is_down(MouseButton::Left) => {
                if let Some((dx, dy)) = displacement {
                    let height = viewport_height.max(1.0);
                    self.delta_theta -= TAU * dx / height * self.rotate_speed;
                    self.delta_phi -= TAU * dy / height * self.rotate_speed;
                }
            }
            PointerEvent::Wheel { delta, .. } => {
                let dy = match delta {
                    MouseWheelDelta::Line { y, .. } => *y,
                    MouseWheelDelta::Pixel { y, .. } => *y,
                };
                if dy > 0.0 {
                    self.scale *= ZOOM_STEP;
                } else if dy < 0.0 {
                    self.scale /= ZOOM_STEP;
                }
            }
            _ => {}
        }
    }

    /// Applies pending motion to `camera`. Returns true when the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.delta_theta * factor;
        phi += self.delta_phi * factor;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        let position = self.target
            + Vec3::new(
                radius * sin_phi * sin_theta,
                radius * cos_phi,
                radius * sin_phi * cos_theta,
            );

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        let moved = position.distance_squared(camera.position) > 1e-12;
        camera.position = position;
        camera.target = self.target;
        moved
    }

    /// True while rotation is still easing out.
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > 1e-6 || self.delta_phi.abs() > 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PerspectiveCamera {
        let mut c = PerspectiveCamera::new(35.0, 1.0, 0.1, 100.0);
        c.position = Vec3::new(0.0, 0.0, 10.0);
        c.target = Vec3::ZERO;
        c
    }

    fn drag(controls: &mut OrbitControls, dx: f32, height: f32) {
        controls.handle_pointer(&PointerEvent::pressed(MouseButton::Left, 0.0, 0.0), height);
        controls.handle_pointer(&PointerEvent::moved(0.0, 0.0), height);
        controls.handle_pointer(&PointerEvent::moved(dx, 0.0), height);
        controls.handle_pointer(&PointerEvent::released(MouseButton::Left, dx, 0.0), height);
    }

    #[test]
    fn undamped_drag_rotates_at_once() {
        let config = ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        };
        let mut controls = OrbitControls::new(Vec3::ZERO, &config);
        let mut cam = camera();

        // A quarter-height drag is a quarter turn.
        drag(&mut controls, 25.0, 100.0);
        assert!(controls.update(&mut cam));
        assert_relative_eq!(cam.position.x, -10.0, epsilon = 1e-4);
        assert_relative_eq!(cam.position.z, 0.0, epsilon = 1e-4);
        assert!(!controls.is_settling());
    }

    #[test]
    fn damping_eases_out_over_frames() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &ControlsConfig::default());
        let mut cam = camera();
        drag(&mut controls, 10.0, 100.0);

        controls.update(&mut cam);
        let first = cam.position;
        assert!(controls.is_settling());
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(!controls.is_settling());
        assert!(first.distance(cam.position) > 0.0);
        assert_relative_eq!(cam.position.length(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn moves_without_button_do_nothing() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &ControlsConfig::default());
        let mut cam = camera();
        controls.handle_pointer(&PointerEvent::moved(0.0, 0.0), 100.0);
        controls.handle_pointer(&PointerEvent::moved(50.0, 50.0), 100.0);
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &ControlsConfig::default());
        controls.enabled = false;
        drag(&mut controls, 50.0, 100.0);
        assert!(!controls.is_settling());
    }

    #[test]
    fn wheel_dollies_towards_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &ControlsConfig::default());
        let mut cam = camera();
        controls.handle_pointer(
            &PointerEvent::Wheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
                modifiers: Default::default(),
            },
            100.0,
        );
        controls.update(&mut cam);
        assert_relative_eq!(cam.position.length(), 9.5, epsilon = 1e-4);
    }
}

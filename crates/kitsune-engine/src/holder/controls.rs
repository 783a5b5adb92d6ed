use crate::camera::OrbitControls;
use crate::config::ControlsConfig;
use crate::core::{Destroyable, PointerSensible, Shared, Updatable};
use crate::error::Result;
use crate::input::PointerEvent;
use crate::time::FrameTime;

use super::camera::CameraHolder;

/// Binds orbit controls to the camera.
pub struct ControlsHolder {
    controls: Option<OrbitControls>,
    camera: Shared<CameraHolder>,
}

impl ControlsHolder {
    pub fn new(camera: Shared<CameraHolder>, config: &ControlsConfig) -> Self {
        let target = camera.borrow().camera().target;
        Self {
            controls: Some(OrbitControls::new(target, config)),
            camera,
        }
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.as_ref()
    }
}

impl Updatable for ControlsHolder {
    /// Advances damping by one step.
    fn update(&mut self, _time: &FrameTime) -> Result<()> {
        if let Some(controls) = self.controls.as_mut() {
            controls.update(self.camera.borrow_mut().camera_mut());
        }
        Ok(())
    }
}

impl PointerSensible for ControlsHolder {
    fn react_to_pointer(&mut self, event: &PointerEvent) {
        if let Some(controls) = self.controls.as_mut() {
            let height = self.camera.borrow().size().height as f32;
            controls.handle_pointer(event, height);
        }
    }
}

impl Destroyable for ControlsHolder {
    fn destroy(&mut self) {
        self.controls = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::CameraConfig;
    use crate::input::MouseButton;
    use crate::size::ViewportSize;

    fn setup() -> (Shared<CameraHolder>, ControlsHolder) {
        let camera = Rc::new(RefCell::new(CameraHolder::new(
            &CameraConfig::default(),
            ViewportSize::new(800.0, 600.0, 1.0),
        )));
        let controls = ControlsHolder::new(camera.clone(), &ControlsConfig::default());
        (camera, controls)
    }

    fn drag(holder: &mut ControlsHolder) {
        holder.react_to_pointer(&PointerEvent::pressed(MouseButton::Left, 100.0, 100.0));
        holder.react_to_pointer(&PointerEvent::moved(100.0, 100.0));
        holder.react_to_pointer(&PointerEvent::moved(160.0, 100.0));
    }

    #[test]
    fn drag_then_update_moves_the_camera() {
        let (camera, mut holder) = setup();
        let before = camera.borrow().camera().position;
        drag(&mut holder);
        holder.update(&FrameTime::default()).unwrap();
        assert_ne!(camera.borrow().camera().position, before);
    }

    #[test]
    fn destroyed_controls_ignore_everything() {
        let (camera, mut holder) = setup();
        let before = camera.borrow().camera().position;
        holder.destroy();
        holder.destroy();
        drag(&mut holder);
        holder.update(&FrameTime::default()).unwrap();
        assert_eq!(camera.borrow().camera().position, before);
        assert!(holder.controls().is_none());
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use crate::input::PointerEvent;
use crate::size::ViewportSize;
use crate::time::FrameTime;
use crate::Result;

use super::capability::{Destroyable, PointerSensible, Resizable, Updatable};

/// Shared, single-threaded handle to a participant.
///
/// Every participant lives on the cooperative timeline, so plain `Rc<RefCell<_>>`
/// is enough; a borrow never outlives one dispatched callback.
pub type Shared<T> = Rc<RefCell<T>>;

/// Ordered capability lists populated once at engine construction.
///
/// Update dispatch always runs the registered render pass after every updatable of
/// the same frame, so the draw call reflects the latest control and world state
/// regardless of registration order.
#[derive(Default)]
pub struct Registry {
    updatables: Vec<Shared<dyn Updatable>>,
    render_pass: Option<Shared<dyn Updatable>>,
    resizables: Vec<Shared<dyn Resizable>>,
    destroyables: Vec<Shared<dyn Destroyable>>,
    pointer_sensibles: Vec<Shared<dyn PointerSensible>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_updatable(&mut self, participant: Shared<dyn Updatable>) -> &mut Self {
        self.updatables.push(participant);
        self
    }

    /// Sets the participant that draws the frame. It runs last within every update.
    pub fn set_render_pass(&mut self, participant: Shared<dyn Updatable>) -> &mut Self {
        self.render_pass = Some(participant);
        self
    }

    pub fn add_resizable(&mut self, participant: Shared<dyn Resizable>) -> &mut Self {
        self.resizables.push(participant);
        self
    }

    pub fn add_destroyable(&mut self, participant: Shared<dyn Destroyable>) -> &mut Self {
        self.destroyables.push(participant);
        self
    }

    pub fn add_pointer_sensible(&mut self, participant: Shared<dyn PointerSensible>) -> &mut Self {
        self.pointer_sensibles.push(participant);
        self
    }

    /// Forwards `size` unchanged to every resizable.
    pub fn resize(&self, size: &ViewportSize) {
        for resizable in &self.resizables {
            resizable.borrow_mut().resize(size);
        }
    }

    /// Updates every updatable in registration order, then runs the render pass.
    pub fn update(&self, time: &FrameTime) -> Result<()> {
        for updatable in &self.updatables {
            updatable.borrow_mut().update(time)?;
        }
        if let Some(render_pass) = &self.render_pass {
            render_pass.borrow_mut().update(time)?;
        }
        Ok(())
    }

    pub fn react_to_pointer(&self, event: &PointerEvent) {
        for sensible in &self.pointer_sensibles {
            sensible.borrow_mut().react_to_pointer(event);
        }
    }

    /// Destroys every destroyable in registration order.
    pub fn destroy(&self) {
        for destroyable in &self.destroyables {
            destroyable.borrow_mut().destroy();
        }
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.updatables.clear();
        self.render_pass = None;
        self.resizables.clear();
        self.destroyables.clear();
        self.pointer_sensibles.clear();
    }

    pub fn updatable_count(&self) -> usize {
        self.updatables.len() + usize::from(self.render_pass.is_some())
    }

    pub fn resizable_count(&self) -> usize {
        self.resizables.len()
    }

    pub fn destroyable_count(&self) -> usize {
        self.destroyables.len()
    }
}

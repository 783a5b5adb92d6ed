use crate::event::Subscription;
use crate::input::PointerEvent;
use crate::size::ViewportSize;
use crate::time::FrameTime;
use crate::Result;

/// Participant that reacts to viewport changes.
pub trait Resizable {
    /// Recomputes derived state (aspect ratio, drawing buffer size, ...) for `size`.
    fn resize(&mut self, size: &ViewportSize);
}

/// Participant advanced once per frame.
pub trait Updatable {
    /// Moves the participant to the state of the frame described by `time`.
    ///
    /// Errors are fatal for scene construction and surface to the host.
    fn update(&mut self, time: &FrameTime) -> Result<()>;
}

/// Participant owning resources that must be released explicitly.
pub trait Destroyable {
    /// Releases the resources. Calling it again must be a no-op.
    fn destroy(&mut self);
}

/// Producer exposing a push-based event stream.
pub trait Listenable<T> {
    fn listen(&mut self) -> Subscription<T>;
}

/// Participant that reacts to pointer input.
pub trait PointerSensible {
    fn react_to_pointer(&mut self, event: &PointerEvent);
}

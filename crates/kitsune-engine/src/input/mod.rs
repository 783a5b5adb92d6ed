//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The host translates platform events into `PointerEvent`s and `Key`s.

mod state;
mod types;

pub use state::PointerState;
pub use types::{
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerEvent,
    PointerMoveEvent,
};

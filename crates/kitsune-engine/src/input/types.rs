use std::fmt;

/// Keyboard key identifier.
///
/// Only the keys the viewer binds are represented; everything else maps to
/// `Key::Unknown(code)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

impl Key {
    /// Numeric value of a digit key.
    pub fn digit(&self) -> Option<u8> {
        let d = match self {
            Key::Digit0 => 0,
            Key::Digit1 => 1,
            Key::Digit2 => 2,
            Key::Digit3 => 3,
            Key::Digit4 => 4,
            Key::Digit5 => 5,
            Key::Digit6 => 6,
            Key::Digit7 => 7,
            Key::Digit8 => 8,
            Key::Digit9 => 9,
            _ => return None,
        };
        Some(d)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Pointer move event in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer button event.
///
/// Coordinates are included so consumers never need a separate "current pointer
/// position" query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Pointer input forwarded to pointer-sensible participants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Moved(PointerMoveEvent),
    Button(PointerButtonEvent),
    Wheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },
    /// Pointer left the drawable surface.
    Left,
}

impl PointerEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        PointerEvent::Moved(PointerMoveEvent { x, y })
    }

    pub fn pressed(button: MouseButton, x: f32, y: f32) -> Self {
        PointerEvent::Button(PointerButtonEvent {
            button,
            state: MouseButtonState::Pressed,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    pub fn released(button: MouseButton, x: f32, y: f32) -> Self {
        PointerEvent::Button(PointerButtonEvent {
            button,
            state: MouseButtonState::Released,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    /// Logical position carried by the event, if any.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            PointerEvent::Moved(m) => Some((m.x, m.y)),
            PointerEvent::Button(b) => Some((b.x, b.y)),
            PointerEvent::Wheel { .. } | PointerEvent::Left => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_map_to_values() {
        assert_eq!(Key::Digit0.digit(), Some(0));
        assert_eq!(Key::Digit7.digit(), Some(7));
        assert_eq!(Key::Tab.digit(), None);
    }

    #[test]
    fn position_is_absent_for_wheel_and_leave() {
        assert_eq!(PointerEvent::moved(3.0, 4.0).position(), Some((3.0, 4.0)));
        assert_eq!(
            PointerEvent::pressed(MouseButton::Left, 1.0, 2.0).position(),
            Some((1.0, 2.0))
        );
        assert_eq!(PointerEvent::Left.position(), None);
    }
}

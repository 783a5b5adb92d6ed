use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use kitsune_engine::input::{
    Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
    PointerEvent, PointerMoveEvent,
};

/// Input the viewer hands to the engine or the debug panel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HostInput {
    Pointer(PointerEvent),
    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        repeat: bool,
    },
}

/// Window-level input state needed to complete winit events.
///
/// winit reports button presses without a position and modifiers separately from
/// the keys they modify; both are tracked here.
#[derive(Debug, Default)]
pub struct InputTracker {
    modifiers: Modifiers,
    pointer: Option<(f32, f32)>,
}

impl InputTracker {
    /// Translates a winit `WindowEvent`. `scale_factor` converts physical pixels to
    /// the logical pixels the engine works in.
    ///
    /// Returns `None` for events the engine has no use for.
    pub fn translate(&mut self, event: &WindowEvent, scale_factor: f64) -> Option<HostInput> {
        match event {
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
                None
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                Some(HostInput::Pointer(PointerEvent::Left))
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical_f32(*position, scale_factor);
                self.pointer = Some((x, y));
                Some(HostInput::Pointer(PointerEvent::Moved(PointerMoveEvent { x, y })))
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let state = match state {
                    ElementState::Pressed => MouseButtonState::Pressed,
                    ElementState::Released => MouseButtonState::Released,
                };
                let (x, y) = self.pointer.unwrap_or((0.0, 0.0));
                Some(HostInput::Pointer(PointerEvent::Button(PointerButtonEvent {
                    button: map_mouse_button(*button),
                    state,
                    x,
                    y,
                    modifiers: self.modifiers,
                })))
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                    MouseScrollDelta::PixelDelta(p) => {
                        let (x, y) = to_logical_f32(*p, scale_factor);
                        MouseWheelDelta::Pixel { x, y }
                    }
                };
                Some(HostInput::Pointer(PointerEvent::Wheel {
                    delta,
                    modifiers: self.modifiers,
                }))
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let state = match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };
                Some(HostInput::Key {
                    key: map_key(event.physical_key),
                    state,
                    modifiers: self.modifiers,
                    repeat: event.repeat,
                })
            }

            _ => None,
        }
    }
}

fn to_logical_f32(pos: PhysicalPosition<f64>, scale_factor: f64) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale_factor);
    (logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit9,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_from_both_rows_map_to_the_same_key() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit3)), Key::Digit3);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Numpad3)), Key::Digit3);
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Unknown(_)));
    }

    #[test]
    fn side_buttons_become_other() {
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
    }

    #[test]
    fn positions_are_converted_to_logical_pixels() {
        assert_eq!(to_logical_f32(PhysicalPosition::new(200.0, 100.0), 2.0), (100.0, 50.0));
    }
}

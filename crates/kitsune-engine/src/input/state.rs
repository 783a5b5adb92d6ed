use std::collections::HashSet;

use super::types::{Modifiers, MouseButton, MouseButtonState, PointerButtonEvent, PointerEvent};

/// Tracked pointer state for a single surface.
///
/// Holds "is down" information and the last known position, so drag gestures can
/// be computed from a plain event stream.
#[derive(Debug, Default)]
pub struct PointerState {
    pub modifiers: Modifiers,

    /// Pointer position in logical pixels.
    pub position: Option<(f32, f32)>,

    pub buttons_down: HashSet<MouseButton>,
}

impl PointerState {
    /// Applies `event` and returns the pointer displacement it caused, if any.
    pub fn apply(&mut self, event: &PointerEvent) -> Option<(f32, f32)> {
        match event {
            PointerEvent::Moved(m) => {
                let delta = self.position.map(|(px, py)| (m.x - px, m.y - py));
                self.position = Some((m.x, m.y));
                delta
            }

            PointerEvent::Button(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers,
            }) => {
                self.position = Some((*x, *y));
                self.modifiers = *modifiers;
                match state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
                None
            }

            PointerEvent::Wheel { modifiers, .. } => {
                self.modifiers = *modifiers;
                None
            }

            PointerEvent::Left => {
                // Avoids stuck drags when the pointer is released outside the surface.
                self.position = None;
                self.buttons_down.clear();
                None
            }
        }
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_reports_displacement_from_last_position() {
        let mut state = PointerState::default();
        assert_eq!(state.apply(&PointerEvent::moved(10.0, 10.0)), None);
        assert_eq!(state.apply(&PointerEvent::moved(15.0, 7.0)), Some((5.0, -3.0)));
    }

    #[test]
    fn buttons_are_tracked_until_release() {
        let mut state = PointerState::default();
        state.apply(&PointerEvent::pressed(MouseButton::Left, 0.0, 0.0));
        assert!(state.is_down(MouseButton::Left));
        state.apply(&PointerEvent::released(MouseButton::Left, 0.0, 0.0));
        assert!(!state.is_down(MouseButton::Left));
    }

    #[test]
    fn leaving_clears_buttons_and_position() {
        let mut state = PointerState::default();
        state.apply(&PointerEvent::pressed(MouseButton::Left, 4.0, 4.0));
        state.apply(&PointerEvent::Left);
        assert!(!state.is_down(MouseButton::Left));
        assert_eq!(state.position, None);
    }
}

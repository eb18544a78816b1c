use std::collections::HashSet;

use super::types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Current input state for the window.
///
/// Holds "is down" information and the current pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in physical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear held keys so they don't stick.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        self.keys_down.insert(*key);
                    }
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent { x, y, modifiers, .. }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
            }

            InputEvent::MouseWheel { modifiers, .. } => {
                self.modifiers = *modifiers;
            }

            InputEvent::Text(_) => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, MouseButtonState};

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn press_and_release_track_keys() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::A, KeyState::Pressed));
        assert!(s.key_down(Key::A));
        s.apply_event(&key(Key::A, KeyState::Released));
        assert!(!s.key_down(Key::A));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Space, KeyState::Pressed));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.key_down(Key::Space));
    }

    #[test]
    fn button_event_moves_pointer() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x: 4.0,
            y: 6.0,
            modifiers: Modifiers::default(),
        }));
        assert_eq!(s.pointer_pos, Some((4.0, 6.0)));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }
}

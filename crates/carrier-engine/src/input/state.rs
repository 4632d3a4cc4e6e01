use std::collections::{HashMap, HashSet};

use super::thunk::NativeInput;
use super::types::{ButtonAction, Key, KeyAction, Modifiers, MouseButton};

/// Current input state for the window.
///
/// Holds the last action seen per key, held mouse buttons, the cursor
/// position and the modifier state. Updated by every native callback before
/// the event is dispatched, so sinks observe state that already includes the
/// event they are handling.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Cursor position in logical pixels.
    pub cursor: (f64, f64),

    keys: HashMap<Key, KeyAction>,
    buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Records the effect of one native callback.
    pub fn apply(&mut self, native: &NativeInput) {
        match native {
            NativeInput::Key { key, action, modifiers, .. } => {
                self.modifiers = *modifiers;
                match action {
                    KeyAction::Released => {
                        self.keys.remove(key);
                    }
                    other => {
                        self.keys.insert(*key, *other);
                    }
                }
            }

            NativeInput::MouseButton { button, action, modifiers } => {
                self.modifiers = *modifiers;
                match action {
                    ButtonAction::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    ButtonAction::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }

            NativeInput::CursorPos { x, y } => {
                self.cursor = (*x, *y);
            }

            NativeInput::Scroll { .. } | NativeInput::FramebufferResize { .. } => {}
        }
    }

    /// Updates the modifier state outside of a key event.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Last action seen for `key`; `Released` if the key is not held.
    pub fn key_state(&self, key: Key) -> KeyAction {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys.contains_key(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// Forgets held keys and buttons, e.g. on focus loss.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons_down.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, action: KeyAction) -> NativeInput {
        NativeInput::Key { key, scancode: 0, action, modifiers: Modifiers::default() }
    }

    #[test]
    fn key_state_follows_last_action() {
        let mut state = InputState::default();
        assert_eq!(state.key_state(Key::W), KeyAction::Released);

        state.apply(&key(Key::W, KeyAction::Pressed));
        assert_eq!(state.key_state(Key::W), KeyAction::Pressed);

        state.apply(&key(Key::W, KeyAction::Repeated));
        assert_eq!(state.key_state(Key::W), KeyAction::Repeated);
        assert!(state.key_down(Key::W));

        state.apply(&key(Key::W, KeyAction::Released));
        assert_eq!(state.key_state(Key::W), KeyAction::Released);
        assert!(!state.key_down(Key::W));
    }

    #[test]
    fn cursor_and_buttons() {
        let mut state = InputState::default();
        state.apply(&NativeInput::CursorPos { x: 10.0, y: 20.0 });
        assert_eq!(state.cursor, (10.0, 20.0));

        let press = NativeInput::MouseButton {
            button: MouseButton::Middle,
            action: ButtonAction::Pressed,
            modifiers: Modifiers::default(),
        };
        state.apply(&press);
        assert!(state.button_down(MouseButton::Middle));

        state.release_all();
        assert!(!state.button_down(MouseButton::Middle));
    }

    #[test]
    fn key_event_updates_modifiers() {
        let mut state = InputState::default();
        let shifted = NativeInput::Key {
            key: Key::A,
            scancode: 0,
            action: KeyAction::Pressed,
            modifiers: Modifiers { shift: true, ..Modifiers::default() },
        };
        state.apply(&shifted);
        assert!(state.modifiers.shift);
    }
}

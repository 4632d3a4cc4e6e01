use super::types::{
    ButtonAction, InputEvent, Key, KeyAction, KeyEvent, Modifiers, MouseButton, MouseButtonEvent,
};

/// Parameters of one native input callback, before translation.
///
/// Each variant corresponds to one platform callback: key, mouse button,
/// cursor position, scroll and framebuffer resize.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NativeInput {
    Key {
        key: Key,
        scancode: u32,
        action: KeyAction,
        modifiers: Modifiers,
    },
    MouseButton {
        button: MouseButton,
        action: ButtonAction,
        modifiers: Modifiers,
    },
    CursorPos {
        x: f64,
        y: f64,
    },
    Scroll {
        x: f64,
        y: f64,
    },
    FramebufferResize {
        width: u32,
        height: u32,
    },
}

/// Builds the application event for one native callback.
///
/// `cursor` is the last known cursor position; mouse-button callbacks do not
/// carry one, so the event reports it.
pub fn translate(native: NativeInput, cursor: (f64, f64)) -> InputEvent {
    match native {
        NativeInput::Key { key, scancode, action, modifiers } => {
            let ev = KeyEvent { key, scancode, action, modifiers };
            match action {
                KeyAction::Pressed => InputEvent::KeyDown(ev),
                KeyAction::Released => InputEvent::KeyUp(ev),
                KeyAction::Repeated => InputEvent::KeyRepeat(ev),
            }
        }

        NativeInput::MouseButton { button, action, modifiers } => {
            let ev = MouseButtonEvent {
                button,
                action,
                modifiers,
                x: cursor.0,
                y: cursor.1,
            };
            match action {
                ButtonAction::Pressed => InputEvent::MouseDown(ev),
                ButtonAction::Released => InputEvent::MouseUp(ev),
            }
        }

        NativeInput::CursorPos { x, y } => InputEvent::MouseMove { x, y },
        NativeInput::Scroll { x, y } => InputEvent::MouseScroll { x, y },
        NativeInput::FramebufferResize { width, height } => InputEvent::Resize { width, height },
    }
}

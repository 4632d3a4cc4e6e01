use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, NativeKeyCode, PhysicalKey};

use crate::input::{ButtonAction, Key, KeyAction, Modifiers, MouseButton, NativeInput};

/// Pixel scroll deltas are reported in lines of this height.
const PIXELS_PER_LINE: f64 = 20.0;

/// What a winit `WindowEvent` means to the window manager.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum PlatformEvent {
    /// An input callback that produces an application event.
    Native(NativeInput),
    /// Modifier state changed; updates state only.
    Modifiers(Modifiers),
    /// Window lost focus; held keys are forgotten.
    FocusLost,
    /// User asked the window to close.
    CloseRequested,
}

/// Classifies a winit `WindowEvent`.
///
/// `scale` is the window scale factor, used to report cursor positions in
/// logical pixels. `modifiers` is the tracked modifier state, attached to key
/// and button callbacks because winit delivers it separately.
///
/// Returns `None` for events the shell does not represent.
pub(crate) fn classify(event: &WindowEvent, scale: f64, modifiers: Modifiers) -> Option<PlatformEvent> {
    match event {
        WindowEvent::CloseRequested => Some(PlatformEvent::CloseRequested),

        WindowEvent::ModifiersChanged(m) => {
            let ms: ModifiersState = m.state();
            Some(PlatformEvent::Modifiers(map_modifiers(ms)))
        }

        WindowEvent::Focused(false) => Some(PlatformEvent::FocusLost),

        WindowEvent::KeyboardInput { event, .. } => {
            let (key, scancode) = map_key(event.physical_key);
            Some(PlatformEvent::Native(NativeInput::Key {
                key,
                scancode,
                action: key_action(event.state, event.repeat),
                modifiers,
            }))
        }

        WindowEvent::MouseInput { state, button, .. } => {
            Some(PlatformEvent::Native(NativeInput::MouseButton {
                button: map_mouse_button(*button),
                action: button_action(*state),
                modifiers,
            }))
        }

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(scale, *position);
            Some(PlatformEvent::Native(NativeInput::CursorPos { x, y }))
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = to_logical(scale, *p);
                    (x / PIXELS_PER_LINE, y / PIXELS_PER_LINE)
                }
            };
            Some(PlatformEvent::Native(NativeInput::Scroll { x, y }))
        }

        WindowEvent::Resized(size) => Some(PlatformEvent::Native(NativeInput::FramebufferResize {
            width: size.width,
            height: size.height,
        })),

        _ => None,
    }
}

pub(crate) fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Pressed, false) => KeyAction::Pressed,
        (ElementState::Pressed, true) => KeyAction::Repeated,
        (ElementState::Released, _) => KeyAction::Released,
    }
}

fn button_action(state: ElementState) -> ButtonAction {
    match state {
        ElementState::Pressed => ButtonAction::Pressed,
        ElementState::Released => ButtonAction::Released,
    }
}

fn to_logical(scale: f64, pos: PhysicalPosition<f64>) -> (f64, f64) {
    let logical = pos.to_logical::<f64>(scale);
    (logical.x, logical.y)
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
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Maps a physical key to `(Key, scancode)`.
///
/// Keys without a named counterpart become `Key::Unknown(scancode)`.
pub(crate) fn map_key(pk: PhysicalKey) -> (Key, u32) {
    let scancode = platform_scancode(pk).unwrap_or_else(|| match pk {
        PhysicalKey::Code(_) => 0,
        PhysicalKey::Unidentified(native) => native_scancode(native),
    });
    match pk {
        PhysicalKey::Code(code) => (map_key_code(code, scancode), scancode),
        PhysicalKey::Unidentified(_) => (Key::Unknown(scancode), scancode),
    }
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
))]
fn platform_scancode(pk: PhysicalKey) -> Option<u32> {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    pk.to_scancode()
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
fn platform_scancode(_pk: PhysicalKey) -> Option<u32> {
    None
}

/// Raw platform code of a key winit could not identify, 0 if none.
fn native_scancode(native: NativeKeyCode) -> u32 {
    match native {
        NativeKeyCode::Android(c) | NativeKeyCode::Xkb(c) => c,
        NativeKeyCode::MacOS(c) | NativeKeyCode::Windows(c) => c as u32,
        NativeKeyCode::Unidentified => 0,
    }
}

fn map_key_code(code: KeyCode, scancode: u32) -> Key {
    match code {
        KeyCode::Space => Key::Space,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Minus => Key::Minus,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Equal => Key::Equal,
        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::BracketRight => Key::RightBracket,
        KeyCode::Backquote => Key::GraveAccent,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::ScrollLock => Key::ScrollLock,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Pause => Key::Pause,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,
        KeyCode::F13 => Key::F13,
        KeyCode::F14 => Key::F14,
        KeyCode::F15 => Key::F15,
        KeyCode::F16 => Key::F16,
        KeyCode::F17 => Key::F17,
        KeyCode::F18 => Key::F18,
        KeyCode::F19 => Key::F19,
        KeyCode::F20 => Key::F20,
        KeyCode::F21 => Key::F21,
        KeyCode::F22 => Key::F22,
        KeyCode::F23 => Key::F23,
        KeyCode::F24 => Key::F24,
        KeyCode::F25 => Key::F25,

        KeyCode::Numpad0 => Key::Numpad0,
        KeyCode::Numpad1 => Key::Numpad1,
        KeyCode::Numpad2 => Key::Numpad2,
        KeyCode::Numpad3 => Key::Numpad3,
        KeyCode::Numpad4 => Key::Numpad4,
        KeyCode::Numpad5 => Key::Numpad5,
        KeyCode::Numpad6 => Key::Numpad6,
        KeyCode::Numpad7 => Key::Numpad7,
        KeyCode::Numpad8 => Key::Numpad8,
        KeyCode::Numpad9 => Key::Numpad9,
        KeyCode::NumpadDecimal => Key::NumpadDecimal,
        KeyCode::NumpadDivide => Key::NumpadDivide,
        KeyCode::NumpadMultiply => Key::NumpadMultiply,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadEnter => Key::NumpadEnter,
        KeyCode::NumpadEqual => Key::NumpadEqual,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperRight => Key::RightSuper,
        KeyCode::ContextMenu => Key::Menu,

        _ => Key::Unknown(scancode),
    }
}

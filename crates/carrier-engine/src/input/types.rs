use std::fmt;

/// Keyboard key identifier, by physical position on a US layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Semicolon,
    Equal,
    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24, F25,

    // Keypad
    Numpad0, Numpad1, Numpad2, Numpad3, Numpad4,
    Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    NumpadDecimal,
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadAdd,
    NumpadEnter,
    NumpadEqual,

    LeftShift,
    LeftControl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightControl,
    RightAlt,
    RightSuper,
    Menu,

    /// Platform key not represented above, with its platform code.
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Raw key action reported by the platform, also the answer of a key-state query.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum KeyAction {
    Pressed,
    #[default]
    Released,
    /// Held long enough for the platform to emit auto-repeat.
    Repeated,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonAction {
    Pressed,
    Released,
}

/// Modifier keys state.
///
/// Stored as booleans; [`Modifiers::mask`] packs them into the conventional
/// bit mask (shift = 1, control = 2, alt = 4, super = 8).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: u32 = 0x1;
    pub const CONTROL: u32 = 0x2;
    pub const ALT: u32 = 0x4;
    pub const SUPER: u32 = 0x8;

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    pub fn mask(&self) -> u32 {
        let mut bits = 0;
        if self.shift {
            bits |= Self::SHIFT;
        }
        if self.ctrl {
            bits |= Self::CONTROL;
        }
        if self.alt {
            bits |= Self::ALT;
        }
        if self.meta {
            bits |= Self::SUPER;
        }
        bits
    }
}

/// Payload of the key events.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    /// Platform scancode, stable per physical key.
    pub scancode: u32,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

/// Payload of the mouse-button events.
///
/// `x`/`y` are the cursor position at the time of the click, in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub action: ButtonAction,
    pub modifiers: Modifiers,
    pub x: f64,
    pub y: f64,
}

/// Application event taxonomy.
///
/// One value is built per native callback and handed by reference to the
/// event sink; it does not outlive that call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    KeyRepeat(KeyEvent),

    MouseDown(MouseButtonEvent),
    MouseUp(MouseButtonEvent),

    /// Cursor moved, logical pixels relative to the window's top-left corner.
    MouseMove { x: f64, y: f64 },

    /// Wheel or trackpad scroll, in lines.
    MouseScroll { x: f64, y: f64 },

    /// Framebuffer resized, physical pixels.
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    /// Key payload, for the three key variants.
    pub fn key(&self) -> Option<&KeyEvent> {
        match self {
            InputEvent::KeyDown(k) | InputEvent::KeyUp(k) | InputEvent::KeyRepeat(k) => Some(k),
            _ => None,
        }
    }

    /// Mouse-button payload, for the two button variants.
    pub fn mouse_button(&self) -> Option<&MouseButtonEvent> {
        match self {
            InputEvent::MouseDown(m) | InputEvent::MouseUp(m) => Some(m),
            _ => None,
        }
    }
}

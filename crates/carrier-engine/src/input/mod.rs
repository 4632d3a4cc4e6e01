//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The flow for every native callback is:
//!
//! 1. `platform::winit` turns a `WindowEvent` into a [`NativeInput`] (the raw
//!    callback parameters),
//! 2. [`InputState::apply`] records held keys, cursor and modifiers,
//! 3. [`translate`] builds exactly one [`InputEvent`] for the event sink.

mod state;
mod thunk;
mod types;

pub(crate) mod platform;

pub use state::InputState;
pub use thunk::{translate, NativeInput};
pub use types::{
    ButtonAction,
    InputEvent,
    Key,
    KeyAction,
    KeyEvent,
    Modifiers,
    MouseButton,
    MouseButtonEvent,
};

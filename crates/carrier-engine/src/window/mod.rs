//! Window and frame loop.
//!
//! Owns the `winit` event loop and the native window, and wires them to the
//! GPU context and the application.

mod config;
mod manager;
mod record;
mod runtime;

pub use config::WindowConfig;
pub use manager::WindowManager;
pub use record::WindowRecord;
pub use runtime::Runtime;

//! Carrier engine crate.
//!
//! A small application and graphics shell over `winit` and `wgpu`: one
//! window, an input event taxonomy, and a retained-handle registry of shader
//! programs, geometry and pipelines.

pub mod core;
pub mod device;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod time;
pub mod window;

pub use crate::core::{run_app, App, ApplicationConfig, Context, EventSink};

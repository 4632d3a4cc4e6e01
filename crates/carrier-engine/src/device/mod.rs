//! GPU context bound to the window.
//!
//! Creates the wgpu device and swapchain, owns the depth-stencil target and
//! the viewport, and hands out frames for the graphics registry to record into.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, Viewport};
pub use init::GpuInit;
pub use surface::DEPTH_FORMAT;

//! Time subsystem.
//!
//! - `SessionClock`: seconds elapsed since the window was set up (`Context::time`)
//! - `FrameClock`: clamped per-frame delta, ticked once per loop iteration

mod frame_clock;
mod session;

pub use frame_clock::{FrameClock, FrameTime};
pub use session::SessionClock;

//! Application driver.
//!
//! The lifecycle contract between the shell and user code: the [`App`]
//! callbacks, the [`Context`] they receive, and [`run_app`].

mod app;
mod config;
mod ctx;
mod driver;

pub use app::{App, EventSink};
pub use config::ApplicationConfig;
pub use ctx::Context;
pub use driver::run_app;

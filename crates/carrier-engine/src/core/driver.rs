use std::process::ExitCode;

use super::ApplicationConfig;
use crate::logging::{init_logging, LoggingConfig};
use crate::window::Runtime;

/// Sets up the window, runs the frame loop to completion and tears
/// everything down.
///
/// Fatal errors (event loop, window or GPU creation, a failing `on_init`)
/// are logged and reported as a failure exit code; no further callbacks run.
pub fn run_app(config: ApplicationConfig) -> ExitCode {
    init_logging(LoggingConfig::default());

    let ApplicationConfig { window, mut app } = config;

    let runtime = match Runtime::setup(&window, app.as_mut()) {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.run(app.as_mut()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

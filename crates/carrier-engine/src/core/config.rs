use super::App;
use crate::window::WindowConfig;

/// Everything `run_app` needs: window parameters and the application.
pub struct ApplicationConfig {
    pub window: WindowConfig,
    pub app: Box<dyn App>,
}

impl ApplicationConfig {
    pub fn new(window: WindowConfig, app: impl App + 'static) -> Self {
        Self { window, app: Box::new(app) }
    }
}

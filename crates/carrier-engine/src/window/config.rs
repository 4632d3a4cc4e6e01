use crate::device::GpuInit;

/// Window parameters applied before the native window is created.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Framebuffer width in physical pixels. Ignored in fullscreen.
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
    /// Borderless fullscreen on the primary monitor, at the monitor's size.
    pub fullscreen: bool,
    /// Requested GPU API.
    pub gpu: GpuInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "carrier".to_string(),
            resizable: true,
            fullscreen: false,
            gpu: GpuInit::default(),
        }
    }
}

impl WindowConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn with_gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = WindowConfig::default();
        assert_eq!((c.width, c.height), (800, 600));
        assert_eq!(c.title, "carrier");
        assert!(c.resizable);
        assert!(!c.fullscreen);
    }

    #[test]
    fn builder_setters() {
        let c = WindowConfig::default()
            .with_size(1280, 720)
            .with_title("demo")
            .with_resizable(false)
            .with_fullscreen(true);
        assert_eq!((c.width, c.height), (1280, 720));
        assert_eq!(c.title, "demo");
        assert!(!c.resizable);
        assert!(c.fullscreen);
    }
}

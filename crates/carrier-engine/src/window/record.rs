use super::WindowConfig;

/// What the shell knows about its window.
///
/// `width` and `height` start at the created size and follow every
/// framebuffer resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
}

impl WindowRecord {
    /// Record for a window created from `config`. In fullscreen the size is
    /// the monitor's, when one was found.
    pub fn from_config(config: &WindowConfig, monitor_size: Option<(u32, u32)>) -> Self {
        let (width, height) = match monitor_size {
            Some(size) if config.fullscreen => size,
            _ => (config.width, config.height),
        };
        Self {
            width,
            height,
            title: config.title.clone(),
            fullscreen: config.fullscreen,
        }
    }

    pub fn apply_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_uses_requested_size() {
        let record = WindowRecord::from_config(&WindowConfig::default(), Some((1920, 1080)));
        assert_eq!((record.width, record.height), (800, 600));
        assert!(!record.fullscreen);
    }

    #[test]
    fn fullscreen_uses_monitor_size() {
        let config = WindowConfig::default().with_fullscreen(true);
        let record = WindowRecord::from_config(&config, Some((1920, 1080)));
        assert_eq!((record.width, record.height), (1920, 1080));

        let no_monitor = WindowRecord::from_config(&config, None);
        assert_eq!((no_monitor.width, no_monitor.height), (800, 600));
    }

    #[test]
    fn resize_updates_size() {
        let mut record = WindowRecord::from_config(&WindowConfig::default(), None);
        record.apply_resize(1024, 768);
        assert_eq!((record.width, record.height), (1024, 768));
    }
}

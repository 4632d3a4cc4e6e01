use std::time::{Duration, Instant};

/// Monotonic clock anchored at window setup.
#[derive(Debug, Copy, Clone)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    /// Time since the clock was started.
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Seconds since the clock was started.
    pub fn seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}

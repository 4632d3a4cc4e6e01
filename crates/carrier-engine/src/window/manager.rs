use std::sync::Arc;

use winit::window::Window;

use super::WindowRecord;
use crate::input::InputState;
use crate::time::{FrameClock, FrameTime, SessionClock};

/// Per-window state owned by the context: the native handle, its record,
/// the close flag, clocks and input state.
pub struct WindowManager {
    window: Option<Arc<Window>>,
    pub(crate) record: WindowRecord,
    close: bool,
    pub(crate) input: InputState,
    session: SessionClock,
    frame_clock: FrameClock,
    last_frame: Option<FrameTime>,
}

impl WindowManager {
    pub(crate) fn new(window: Option<Arc<Window>>, record: WindowRecord) -> Self {
        Self {
            window,
            record,
            close: false,
            input: InputState::default(),
            session: SessionClock::start(),
            frame_clock: FrameClock::new(),
            last_frame: None,
        }
    }

    pub fn native(&self) -> Option<&Window> {
        self.window.as_deref()
    }

    pub fn record(&self) -> &WindowRecord {
        &self.record
    }

    pub fn set_title(&mut self, title: &str) {
        let Some(window) = &self.window else {
            log::error!("cannot set title: no window attached");
            return;
        };
        window.set_title(title);
        self.record.title = title.to_owned();
    }

    pub fn request_close(&mut self, close: bool) {
        if self.window.is_none() {
            log::error!("cannot request close: no window attached");
            return;
        }
        self.close = close;
    }

    /// Set by `request_close` or the window's close button.
    pub fn should_close(&self) -> bool {
        self.close
    }

    pub(crate) fn close_requested(&mut self) {
        self.close = true;
    }

    /// Seconds since setup.
    pub fn time(&self) -> f64 {
        self.session.seconds()
    }

    pub(crate) fn tick(&mut self) -> FrameTime {
        let ft = self.frame_clock.tick();
        self.last_frame = Some(ft);
        ft
    }

    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame
    }

    pub(crate) fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    /// Destroys the native window.
    pub(crate) fn destroy(&mut self) {
        if self.window.take().is_some() {
            log::info!("successfully destroyed window");
        }
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use super::EventSink;
use crate::device::{Gpu, Viewport};
use crate::gfx::{GfxError, Graphics, GraphicsConfig, WgpuBackend};
use crate::input::platform::winit::{classify, PlatformEvent};
use crate::input::{translate, InputState, Key, KeyAction, NativeInput};
use crate::time::FrameTime;
use crate::window::{WindowManager, WindowRecord};

/// The shell's state: window, GPU context and graphics registry.
///
/// Created by the runtime and handed to every application callback. Not
/// `Send`; it lives on the thread that owns the event loop.
pub struct Context {
    window: WindowManager,
    gpu: Option<Rc<RefCell<Gpu>>>,
    gfx: Option<Graphics>,
}

impl Context {
    pub(crate) fn new(window: WindowManager, gpu: Option<Rc<RefCell<Gpu>>>) -> Self {
        Self { window, gpu, gfx: None }
    }

    // ── graphics ───────────────────────────────────────────────────────────

    /// Creates the graphics registry against the window's GPU context.
    pub fn setup_graphics(&mut self, config: &GraphicsConfig) -> Result<&mut Graphics, GfxError> {
        if self.gfx.is_some() {
            log::error!("{}", GfxError::AlreadyInitialized);
            return Err(GfxError::AlreadyInitialized);
        }
        let Some(gpu) = &self.gpu else {
            log::error!("failed to initialize graphics module: no GPU context");
            return Err(GfxError::NotInitialized);
        };

        let backend = WgpuBackend::new(gpu.clone());
        Ok(self.gfx.insert(Graphics::new(backend, config)))
    }

    /// The graphics registry, once `setup_graphics` has succeeded.
    pub fn gfx(&mut self) -> Result<&mut Graphics, GfxError> {
        self.gfx.as_mut().ok_or(GfxError::NotInitialized)
    }

    /// Releases every graphics resource. Later `gfx()` calls fail until
    /// `setup_graphics` runs again.
    pub fn shutdown_graphics(&mut self) {
        if let Some(gfx) = self.gfx.take() {
            gfx.shutdown();
        }
    }

    /// Sets the viewport in physical pixels; reset to the full window on every resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if let Some(gpu) = &self.gpu {
            gpu.borrow_mut().set_viewport(viewport);
        }
    }

    pub(crate) fn reset_viewport(&mut self) {
        let (width, height) = (self.width(), self.height());
        self.set_viewport(Viewport { x: 0, y: 0, width, height });
    }

    // ── window ─────────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Sets or clears the close flag; the loop ends after the current iteration.
    pub fn request_close(&mut self, close: bool) {
        self.window.request_close(close);
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Seconds since setup.
    pub fn time(&self) -> f64 {
        self.window.time()
    }

    /// Framebuffer width, following resizes.
    pub fn width(&self) -> u32 {
        self.window.record().width
    }

    pub fn height(&self) -> u32 {
        self.window.record().height
    }

    pub fn window(&self) -> &WindowRecord {
        self.window.record()
    }

    pub fn native_window(&self) -> Option<&Window> {
        self.window.native()
    }

    /// Timing of the current frame; `None` before the first frame.
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.window.last_frame()
    }

    // ── input ──────────────────────────────────────────────────────────────

    /// Last action seen for `key`; `Released` when it is not held.
    pub fn key_state(&self, key: Key) -> KeyAction {
        self.window.input.key_state(key)
    }

    pub fn input(&self) -> &InputState {
        &self.window.input
    }

    // ── loop plumbing ──────────────────────────────────────────────────────

    pub(crate) fn tick(&mut self) -> FrameTime {
        self.window.tick()
    }

    /// Handles one pumped window event.
    pub(crate) fn handle_window_event<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        event: &WindowEvent,
    ) {
        let scale = self.window.scale_factor();
        match classify(event, scale, self.window.input.modifiers) {
            Some(PlatformEvent::CloseRequested) => self.window.close_requested(),
            Some(PlatformEvent::Modifiers(m)) => self.window.input.set_modifiers(m),
            Some(PlatformEvent::FocusLost) => self.window.input.release_all(),
            Some(PlatformEvent::Native(native)) => self.handle_native(sink, native),
            None => {}
        }
    }

    /// Runs one input thunk: updates input state, applies a framebuffer
    /// resize, then hands exactly one event to the sink.
    pub(crate) fn handle_native<S: EventSink + ?Sized>(&mut self, sink: &mut S, native: NativeInput) {
        self.window.input.apply(&native);

        if let NativeInput::FramebufferResize { width, height } = native {
            self.window.record.apply_resize(width, height);
            if let Some(gpu) = &self.gpu {
                gpu.borrow_mut().resize(PhysicalSize::new(width, height));
            }
        }

        let event = translate(native, self.window.input.cursor);
        sink.on_event(self, &event);
    }

    /// Releases graphics, the GPU context and the window, in that order.
    pub(crate) fn teardown(&mut self) {
        self.shutdown_graphics();
        self.gpu = None;
        self.window.destroy();
    }

    #[cfg(test)]
    pub(crate) fn headless(record: WindowRecord) -> Self {
        Self::new(WindowManager::new(None, record), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, Modifiers};
    use crate::window::WindowConfig;

    #[derive(Default)]
    struct Collect(Vec<InputEvent>);

    impl EventSink for Collect {
        fn on_event(&mut self, _: &mut Context, event: &InputEvent) {
            self.0.push(*event);
        }
    }

    fn ctx() -> Context {
        Context::headless(WindowRecord::from_config(&WindowConfig::default(), None))
    }

    #[test]
    fn resize_thunk_updates_size_and_emits_event() {
        let mut ctx = ctx();
        let mut sink = Collect::default();
        assert_eq!((ctx.width(), ctx.height()), (800, 600));

        ctx.handle_native(&mut sink, NativeInput::FramebufferResize { width: 1024, height: 768 });

        assert_eq!((ctx.width(), ctx.height()), (1024, 768));
        assert_eq!(sink.0, vec![InputEvent::Resize { width: 1024, height: 768 }]);
    }

    #[test]
    fn key_thunk_updates_state_before_dispatch() {
        struct Check(Option<KeyAction>);
        impl EventSink for Check {
            fn on_event(&mut self, ctx: &mut Context, _: &InputEvent) {
                self.0 = Some(ctx.key_state(Key::Space));
            }
        }

        let mut ctx = ctx();
        let mut sink = Check(None);
        ctx.handle_native(
            &mut sink,
            NativeInput::Key {
                key: Key::Space,
                scancode: 57,
                action: KeyAction::Pressed,
                modifiers: Modifiers::default(),
            },
        );
        assert_eq!(sink.0, Some(KeyAction::Pressed));
        assert_eq!(ctx.key_state(Key::Escape), KeyAction::Released);
    }

    #[test]
    fn close_request_from_window_event() {
        let mut ctx = ctx();
        let mut sink = Collect::default();
        ctx.handle_window_event(&mut sink, &WindowEvent::CloseRequested);
        assert!(ctx.should_close());
        assert!(sink.0.is_empty());
    }

    #[test]
    fn graphics_needs_a_gpu_context() {
        let mut ctx = ctx();
        assert!(matches!(ctx.gfx(), Err(GfxError::NotInitialized)));
        assert!(matches!(
            ctx.setup_graphics(&GraphicsConfig::default()),
            Err(GfxError::NotInitialized)
        ));
    }
}

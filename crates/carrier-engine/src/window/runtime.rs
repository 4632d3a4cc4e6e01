use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use super::{WindowConfig, WindowManager, WindowRecord};
use crate::core::{App, Context, EventSink};
use crate::device::Gpu;

/// Pumps allowed for the platform to deliver `resumed` at startup.
const BOOTSTRAP_PUMPS: usize = 64;

static RUNTIME_ALIVE: AtomicBool = AtomicBool::new(false);

/// Held by the live runtime; a second one cannot be set up while it exists.
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Result<Self> {
        if RUNTIME_ALIVE.swap(true, Ordering::SeqCst) {
            bail!("a carrier runtime is already running in this process");
        }
        Ok(Self)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        RUNTIME_ALIVE.store(false, Ordering::SeqCst);
    }
}

/// Owns the event loop and the context, and drives the frame loop.
///
/// The loop is explicit: each iteration runs the frame callback, then pumps
/// pending native events with a zero timeout. Events are delivered to the
/// application synchronously while pumping.
pub struct Runtime {
    // Dropped first: the window goes before the event loop.
    ctx: Context,
    event_loop: EventLoop<()>,
    _guard: InstanceGuard,
}

impl Runtime {
    /// Creates the window and its GPU context, then runs `app.on_init`.
    ///
    /// Every failure here is fatal.
    pub fn setup(config: &WindowConfig, app: &mut dyn App) -> Result<Self> {
        let guard = InstanceGuard::acquire()?;

        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let (window, monitor_size) = bootstrap_window(&mut event_loop, config)?;

        let record = WindowRecord::from_config(config, monitor_size);
        log::info!(
            "successfully created window \"{}\" ({}x{})",
            record.title,
            record.width,
            record.height
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), &config.gpu))
            .context("failed to initialize GPU context")?;

        let mut ctx = Context::new(
            WindowManager::new(Some(window), record),
            Some(Rc::new(RefCell::new(gpu))),
        );
        ctx.reset_viewport();

        app.on_init(&mut ctx).context("application init failed")?;

        Ok(Self { ctx, event_loop, _guard: guard })
    }

    /// Runs frames until the close flag is set, then cleans up.
    ///
    /// A failing frame callback closes the window; its error is returned
    /// after cleanup.
    pub fn run(mut self, app: &mut dyn App) -> Result<()> {
        let mut failure = None;

        while !self.ctx.should_close() {
            self.ctx.tick();

            if let Err(e) = app.on_frame(&mut self.ctx) {
                log::error!("frame callback failed: {e:#}");
                failure = Some(e);
                break;
            }

            let mut dispatch = Dispatch { ctx: &mut self.ctx, sink: &mut *app };
            if let PumpStatus::Exit(code) =
                self.event_loop.pump_app_events(Some(Duration::ZERO), &mut dispatch)
            {
                log::info!("event loop exited with code {code}");
                break;
            }
        }

        app.on_cleanup(&mut self.ctx);
        self.ctx.teardown();

        match failure {
            Some(e) => Err(e.context("frame callback failed")),
            None => Ok(()),
        }
    }
}

fn bootstrap_window(
    event_loop: &mut EventLoop<()>,
    config: &WindowConfig,
) -> Result<(Arc<Window>, Option<(u32, u32)>)> {
    let mut boot = Bootstrap { config, created: None };

    for _ in 0..BOOTSTRAP_PUMPS {
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut boot) {
            bail!("event loop exited with code {code} before the window was created");
        }
        if let Some(created) = boot.created.take() {
            return created;
        }
    }

    bail!("platform never resumed the event loop; no window was created")
}

/// Creates the window on the first `resumed`.
struct Bootstrap<'a> {
    config: &'a WindowConfig,
    created: Option<Result<(Arc<Window>, Option<(u32, u32)>)>>,
}

impl ApplicationHandler for Bootstrap<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.created.is_none() {
            self.created = Some(create_window(event_loop, self.config));
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

fn create_window(
    event_loop: &ActiveEventLoop,
    config: &WindowConfig,
) -> Result<(Arc<Window>, Option<(u32, u32)>)> {
    let mut attrs = Window::default_attributes()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable);

    let mut monitor_size = None;
    if config.fullscreen {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        monitor_size = monitor.as_ref().map(|m| {
            let size = m.size();
            (size.width, size.height)
        });
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
    }

    let window = event_loop
        .create_window(attrs)
        .context("failed to create window")?;

    Ok((Arc::new(window), monitor_size))
}

/// Routes pumped window events into the context and the application.
struct Dispatch<'a, S: EventSink + ?Sized> {
    ctx: &'a mut Context,
    sink: &'a mut S,
}

impl<S: EventSink + ?Sized> ApplicationHandler for Dispatch<'_, S> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        self.ctx.handle_window_event(self.sink, &event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_instance_at_a_time() {
        let first = InstanceGuard::acquire().unwrap();
        assert!(InstanceGuard::acquire().is_err());
        drop(first);
        let again = InstanceGuard::acquire();
        assert!(again.is_ok());
    }
}

use anyhow::Result;

use super::Context;
use crate::input::InputEvent;

/// Application lifecycle callbacks. Every method has a no-op default.
pub trait App {
    /// Called once after the window and GPU context exist. Build resources
    /// here. An error aborts the run.
    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per loop iteration, before pending events are pumped.
    /// Responsible for `begin_pass`, draws, `end_pass` and `commit`.
    fn on_frame(&mut self, ctx: &mut Context) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once after the loop ends, before graphics and the window are released.
    fn on_cleanup(&mut self, ctx: &mut Context) {
        let _ = ctx;
    }

    /// Called for every input event, synchronously while events are pumped.
    fn on_event(&mut self, ctx: &mut Context, event: &InputEvent) {
        let _ = (ctx, event);
    }
}

/// Receives translated input events.
pub trait EventSink {
    fn on_event(&mut self, ctx: &mut Context, event: &InputEvent);
}

impl<A: App + ?Sized> EventSink for A {
    fn on_event(&mut self, ctx: &mut Context, event: &InputEvent) {
        App::on_event(self, ctx, event);
    }
}

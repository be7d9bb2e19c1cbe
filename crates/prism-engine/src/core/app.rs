use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// View delegate contract implemented by applications.
///
/// The runtime builds the delegate once the window and device exist, then
/// calls it on the event-loop thread.
pub trait App {
    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per display refresh to produce a frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}

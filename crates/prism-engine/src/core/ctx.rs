use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:      &'a Window,
    pub gpu:         &'a mut Gpu<'w>,
    pub clear_color: Color,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Runs one frame: acquires the drawable, calls `draw` with a ready
    /// [`RenderCtx`] and a [`RenderTarget`] that clears to `clear_color`,
    /// then commits and presents.
    ///
    /// Everything acquired here is released before returning. Surface errors
    /// skip the frame unless they are fatal.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = self.gpu.render_ctx();

        // RenderTarget borrows frame.encoder; dropped before present() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, self.clear_color);
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.present(frame);

        AppControl::Continue
    }
}

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowButtons, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::paint::Color;
use crate::render::RenderCtx;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// `None` lets the platform place the window.
    pub initial_position: Option<LogicalPosition<f64>>,
    pub resizable: bool,
    pub enabled_buttons: WindowButtons,
    /// Color the drawable is cleared to at the start of every frame.
    pub clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(512.0, 512.0),
            initial_position: None,
            resizable: true,
            enabled_buttons: WindowButtons::all(),
            clear_color: Color::BLACK,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives frames until it closes.
    ///
    /// `build` runs exactly once, after the window and device exist, and
    /// returns the view delegate. Any launch failure ends the loop and is
    /// returned here.
    pub fn run<A, F>(config: RuntimeConfig, gpu_init: GpuInit, build: F) -> Result<()>
    where
        A: CoreApp + 'static,
        F: FnOnce(&RenderCtx<'_>) -> Result<A> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, build);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Event-loop state.
///
/// `app` is declared before `window` so the delegate (and its renderer) is
/// released before the device and window it was built from.
struct AppState<A, F> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    build: Option<F>,

    app: Option<A>,
    window: Option<WindowEntry>,

    failure: Option<anyhow::Error>,
}

impl<A, F> AppState<A, F>
where
    A: CoreApp + 'static,
    F: FnOnce(&RenderCtx<'_>) -> Result<A>,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, build: F) -> Self {
        Self {
            config,
            gpu_init,
            build: Some(build),
            app: None,
            window: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    /// Window → device + surface → delegate.
    fn launch(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable)
            .with_enabled_buttons(self.config.enabled_buttons);
        if let Some(position) = self.config.initial_position {
            attrs = attrs.with_position(position);
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let build = self
            .build
            .take()
            .context("view delegate was already built")?;
        let app = entry
            .with_gpu(|gpu| build(&gpu.render_ctx()))
            .context("failed to build view delegate")?;

        entry.with_window(|w| {
            w.focus_window();
            w.request_redraw();
        });

        log::info!("window \"{}\" ready", self.config.title);

        self.app = Some(app);
        self.window = Some(entry);
        Ok(())
    }

    fn redraw(&mut self) -> AppControl {
        let (Some(app), Some(entry)) = (self.app.as_mut(), self.window.as_mut()) else {
            return AppControl::Continue;
        };
        let clear_color = self.config.clear_color;

        entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                clear_color,
            };
            app.on_frame(&mut ctx)
        })
    }

    /// Tears down in dependency order: delegate, then view/device, then window.
    fn release(&mut self) {
        release_in_order(&mut self.app, &mut self.window);
    }
}

/// Drops the delegate before the window entry that owns its device.
fn release_in_order<A, W>(app: &mut Option<A>, window: &mut Option<W>) {
    if app.take().is_some() {
        log::debug!("view delegate released");
    }
    if window.take().is_some() {
        log::debug!("window and device released");
    }
}

impl<A, F> ApplicationHandler for AppState<A, F>
where
    A: CoreApp + 'static,
    F: FnOnce(&RenderCtx<'_>) -> Result<A>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.launch(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; FIFO presentation paces it to the display.
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        if app.on_window_event(window_id, &event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
        log::info!("event loop exiting");
    }
}

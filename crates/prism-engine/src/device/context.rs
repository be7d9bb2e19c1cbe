use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::RenderCtx;

use super::{GpuFrame, GpuInit, SurfaceErrorAction};
use super::surface;

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain) bound to the window
/// - acquires frames and presents them once per display refresh
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the window must outlive the `Gpu`.
    surface: wgpu::Surface<'w>,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Selected adapter.
    _adapter: wgpu::Adapter,

    /// wgpu instance used to create the adapter and surface.
    _instance: wgpu::Instance,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter \"{}\" ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps.formats, prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps.alpha_modes, alpha_mode);
        let extent = surface::initial_extent(size);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: extent.width,
            height: extent.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {:?} {}x{} {:?}",
            format,
            extent.width,
            extent.height,
            present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            _adapter: adapter,
            _instance: instance,
            config,
            size,
        })
    }

    /// Returns the handles renderers need to build their resources.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, self.config.format)
    }

    /// Reconfigures the surface after a resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    /// Acquires the next drawable and creates an encoder for it.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Commits the recorded commands and presents the drawable.
    ///
    /// Completion of the submitted work is never awaited.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = surface::classify_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                log::debug!("surface reconfigured after {err}");
            }
            SurfaceErrorAction::SkipFrame => log::debug!("skipping frame: {err}"),
            SurfaceErrorAction::Fatal => log::error!("fatal surface error: {err}"),
        }
        action
    }
}

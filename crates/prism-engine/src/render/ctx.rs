use crate::paint::Color;

/// Renderer-facing context (device/queue + surface format).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }
}

/// The view's current render target: frame encoder, drawable view and the
/// clear color applied when a pass begins.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub clear: Color,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        clear: Color,
    ) -> Self {
        Self {
            encoder,
            color_view,
            clear,
        }
    }

    /// Color attachment that clears the drawable and stores the result.
    ///
    /// Borrows only the drawable view, so the encoder stays free for the pass.
    pub fn color_attachment(&self) -> wgpu::RenderPassColorAttachment<'a> {
        wgpu::RenderPassColorAttachment {
            view: self.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear.to_wgpu()),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        }
    }
}

use anyhow::Result;

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::render::RenderCtx;
use prism_engine::render::triangle::TriangleRenderer;

/// View delegate: owns the renderer and forwards every frame to it.
pub struct TriangleView {
    renderer: TriangleRenderer,
}

impl TriangleView {
    pub fn new(ctx: &RenderCtx<'_>) -> Result<Self> {
        let renderer = TriangleRenderer::new(ctx)?;
        Ok(Self { renderer })
    }
}

impl App for TriangleView {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render(|_rctx, target| self.renderer.draw(target))
    }
}

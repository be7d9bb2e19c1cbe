//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and encode into the
//! frame's [`RenderTarget`].

mod ctx;
pub mod shader;
pub mod triangle;

pub use ctx::{RenderCtx, RenderTarget};

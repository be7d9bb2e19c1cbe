//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer and
//! the application's view delegate.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
pub use winit::window::WindowButtons;

//! Prism engine crate.
//!
//! This crate owns the platform + GPU runtime pieces: window and event loop,
//! device and surface, and the triangle renderer driven once per frame.

pub mod device;
pub mod window;
pub mod core;

pub mod logging;
pub mod render;
pub mod paint;

#[cfg(test)]
mod testing;

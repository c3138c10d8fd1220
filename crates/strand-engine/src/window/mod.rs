//! Window and event loop.
//!
//! Owns the `winit` event loop and the single application window, wires the
//! window to the GPU layer and drives the frame clock.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};

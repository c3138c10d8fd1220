//! Strand engine crate.
//!
//! GPU mesh buffer management behind a backend-neutral binding, a wgpu
//! implementation of that binding, and drift-correcting timing utilities,
//! plus the window/runtime loop that ties them together.

pub mod gpu;
pub mod mesh;
pub mod time;

pub mod device;
pub mod render;
pub mod window;
pub mod core;

pub mod logging;

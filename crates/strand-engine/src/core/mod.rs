//! Contracts between the runtime loop and application code.
//!
//! The runtime owns the window, GPU and clocks; applications see them only
//! through [`App`] callbacks and the per-frame [`FrameCtx`]. [`Voice`] and
//! [`VoicePool`] give applications a uniform way to run many independent
//! animated meshes.

mod app;
mod ctx;
mod voice;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
pub use voice::{Voice, VoicePool};

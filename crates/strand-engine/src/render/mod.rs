//! wgpu backend for the mesh manager.
//!
//! `WgpuBinding` implements `gpu::GpuBinding` on top of a wgpu device/queue.
//! Buffer uploads are immediate; draws are queued and recorded into a single
//! render pass when the frame is flushed.
//!
//! Convention:
//! - positions are clip-space (`x`, `y` in [-1, 1]), no view transform.
//! - colors are straight RGBA, alpha-blended over the target.

mod mesh_binding;
mod sizing;
mod slab;
mod target;

pub use mesh_binding::{WgpuBinding, WGPU_TOPOLOGIES};
pub use target::RenderTarget;

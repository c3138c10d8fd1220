//! wgpu device and surface bootstrap.
//!
//! Creates the instance/adapter/device/queue for a window, configures the
//! surface, owns the `WgpuBinding` that mesh managers upload through, and
//! marks the shared `GpuContext` ready once all of that succeeded.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::{GpuFrame, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;

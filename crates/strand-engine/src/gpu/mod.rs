//! GPU mesh buffers.
//!
//! `VaoMesh` mirrors a CPU `Mesh` into device buffers through a `GpuBinding`
//! and issues its draw calls. The binding is a capability supplied by the
//! caller (the wgpu implementation lives in `render`); readiness of the
//! underlying context is tracked explicitly by `GpuContext`.
//!
//! All calls must happen on the thread that owns the device.

mod binding;
mod context;
mod error;
mod topology;
mod vao_mesh;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{BufferId, BufferTarget, GpuBinding, VertexArrayId};
pub use context::{ContextInfo, GpuContext};
pub use error::MeshError;
pub use topology::{TopologyTable, GL_TOPOLOGIES};
pub use vao_mesh::{attrib, VaoMesh};

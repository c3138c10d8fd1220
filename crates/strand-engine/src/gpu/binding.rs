use std::fmt::Debug;

use super::{GpuContext, TopologyTable};

/// Opaque device buffer name issued by a [`GpuBinding`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub u32);

/// Opaque vertex-array name issued by a [`GpuBinding`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexArrayId(pub u32);

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// `u32` element indices.
    ElementArray,
}

/// GPU capability consumed by `VaoMesh`.
///
/// The shape follows a bind-then-operate model: attribute calls apply to the
/// currently bound vertex array and `buffer_data` applies to the buffer bound
/// at `target`. All calls happen on the thread that owns the device; there is
/// no internal locking.
pub trait GpuBinding {
    /// Native topology value passed to draw calls.
    type Topology: Copy + Debug + 'static;

    /// Backend name used in diagnostics.
    const NAME: &'static str;

    /// Static primitive-to-topology mapping for this backend.
    const TOPOLOGIES: &'static TopologyTable<Self::Topology>;

    /// Readiness of the context this binding talks to.
    fn context(&self) -> &GpuContext;

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId);
    fn unbind_buffer(&mut self, target: BufferTarget);

    /// Replaces the whole contents of the buffer bound at `target`.
    fn buffer_data(&mut self, target: BufferTarget, bytes: &[u8]);

    fn delete_buffer(&mut self, buffer: BufferId);

    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn bind_vertex_array(&mut self, vao: VertexArrayId);
    fn unbind_vertex_array(&mut self);
    fn delete_vertex_array(&mut self, vao: VertexArrayId);

    fn enable_attrib(&mut self, index: u32);
    fn disable_attrib(&mut self, index: u32);

    /// Points attribute slot `index` at `buffer`, read as `components` floats per vertex.
    fn attrib_pointer(&mut self, index: u32, buffer: BufferId, components: u32);

    fn draw_arrays(&mut self, topology: Self::Topology, first: u32, count: u32);

    /// Indexed draw over `count` `u32` indices from the bound element buffer.
    fn draw_elements(&mut self, topology: Self::Topology, count: u32);
}

use bytemuck::Pod;

use crate::mesh::Mesh;

use super::{BufferId, BufferTarget, GpuBinding, MeshError, VertexArrayId};

/// Attribute slot numbers shared by every backend and shader.
pub mod attrib {
    pub const POSITION: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const TEX_COORD: u32 = 2;
    pub const NORMAL: u32 = 3;

    pub const COUNT: usize = 4;
}

/// One device buffer, created lazily on first upload.
#[derive(Debug, Copy, Clone)]
struct BufferHandle {
    id: Option<BufferId>,
    target: BufferTarget,
}

impl BufferHandle {
    const fn new(target: BufferTarget) -> Self {
        Self { id: None, target }
    }
}

#[derive(Debug, Copy, Clone)]
struct MeshAttrib {
    index: u32,
    components: u32,
    buffer: BufferHandle,
}

impl MeshAttrib {
    const fn new(index: u32, components: u32) -> Self {
        Self {
            index,
            components,
            buffer: BufferHandle::new(BufferTarget::Array),
        }
    }
}

/// Vertex array plus the buffers hanging off it.
///
/// `vertex_count`/`index_count` describe what was last uploaded, not what the
/// CPU mesh currently holds.
#[derive(Debug)]
struct VertexArray {
    id: Option<VertexArrayId>,
    position: MeshAttrib,
    color: MeshAttrib,
    tex_coord: MeshAttrib,
    normal: MeshAttrib,
    index_buffer: BufferHandle,
    vertex_count: u32,
    index_count: u32,
}

impl Default for VertexArray {
    fn default() -> Self {
        Self {
            id: None,
            position: MeshAttrib::new(attrib::POSITION, 3),
            color: MeshAttrib::new(attrib::COLOR, 4),
            tex_coord: MeshAttrib::new(attrib::TEX_COORD, 2),
            normal: MeshAttrib::new(attrib::NORMAL, 3),
            index_buffer: BufferHandle::new(BufferTarget::ElementArray),
            vertex_count: 0,
            index_count: 0,
        }
    }
}

impl VertexArray {
    fn attribs(&self) -> [&MeshAttrib; attrib::COUNT] {
        [&self.position, &self.color, &self.tex_coord, &self.normal]
    }
}

/// A [`Mesh`] mirrored into GPU buffers.
///
/// The manager exclusively owns one vertex array and its buffers. `update`
/// re-uploads every stream in full; `draw` replays what was last uploaded.
///
/// Ownership:
/// - moving a `VaoMesh` moves its vertex array; no GPU work happens
/// - `Clone` copies the mesh into a fresh, never-uploaded vertex array
/// - [`copy_from`](Self::copy_from) additionally uploads when the context is ready
///
/// GPU resources are not freed on drop (drop has no access to the binding).
/// Call [`release`](Self::release) to delete them early.
#[derive(Debug, Default)]
pub struct VaoMesh {
    mesh: Mesh,
    vao: VertexArray,
}

impl Clone for VaoMesh {
    fn clone(&self) -> Self {
        Self::new(self.mesh.clone())
    }
}

impl From<Mesh> for VaoMesh {
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh)
    }
}

impl VaoMesh {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            vao: VertexArray::default(),
        }
    }

    /// Copies `other`'s mesh into a new manager with its own vertex array.
    ///
    /// The copy is uploaded immediately if `gpu`'s context is ready; otherwise
    /// it stays unsynchronized until the caller runs [`update`](Self::update).
    pub fn copy_from<B: GpuBinding>(other: &Self, gpu: &mut B) -> Result<Self, MeshError> {
        let mut copy = other.clone();
        if gpu.context().is_ready() {
            copy.update(gpu)?;
        }
        Ok(copy)
    }

    /// Copy assignment: releases this manager's GPU resources, then takes a
    /// copy of `other` with the same upload rule as [`copy_from`](Self::copy_from).
    pub fn assign_copy<B: GpuBinding>(
        &mut self,
        other: &Self,
        gpu: &mut B,
    ) -> Result<&mut Self, MeshError> {
        self.release(gpu);
        self.mesh.copy_from(&other.mesh);
        if gpu.context().is_ready() {
            self.update(gpu)?;
        }
        Ok(self)
    }

    /// Moves the manager out of `self`, leaving an empty, unsynchronized one.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Edits are not visible on the GPU until the next `update`.
    #[inline]
    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    /// `true` once the vertex array exists on the device.
    #[inline]
    pub fn is_synchronized(&self) -> bool {
        self.vao.id.is_some()
    }

    /// Vertices covered by the last upload.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vao.vertex_count
    }

    /// Indices covered by the last upload.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.vao.index_count
    }

    pub fn bind<B: GpuBinding>(&self, gpu: &mut B) -> Result<(), MeshError> {
        let id = self.vao.id.ok_or(MeshError::NotSynchronized)?;
        gpu.bind_vertex_array(id);
        Ok(())
    }

    pub fn unbind<B: GpuBinding>(&self, gpu: &mut B) {
        gpu.unbind_vertex_array();
    }

    /// Uploads every non-empty stream of the current mesh.
    ///
    /// Empty attribute streams are disabled rather than uploaded. Buffers are
    /// created on first use and fully rewritten on every call.
    pub fn update<B: GpuBinding>(&mut self, gpu: &mut B) -> Result<(), MeshError> {
        resolve_topology::<B>(&self.mesh)?;

        if !gpu.context().is_ready() {
            return Err(MeshError::ContextNotReady);
        }

        let vao = &mut self.vao;
        let id = match vao.id {
            Some(id) => id,
            None => {
                let id = gpu.create_vertex_array();
                log::trace!("created vertex array {id:?}");
                vao.id = Some(id);
                id
            }
        };

        gpu.bind_vertex_array(id);
        upload_attrib(gpu, self.mesh.positions(), &mut vao.position);
        upload_attrib(gpu, self.mesh.colors(), &mut vao.color);
        upload_attrib(gpu, self.mesh.tex_coords(), &mut vao.tex_coord);
        upload_attrib(gpu, self.mesh.normals(), &mut vao.normal);
        gpu.unbind_vertex_array();

        let indices = self.mesh.indices();
        if !indices.is_empty() {
            let target = vao.index_buffer.target;
            let buffer = match vao.index_buffer.id {
                Some(b) => b,
                None => {
                    let b = gpu.create_buffer(target);
                    vao.index_buffer.id = Some(b);
                    b
                }
            };
            gpu.bind_buffer(target, buffer);
            gpu.buffer_data(target, bytemuck::cast_slice(indices));
            gpu.unbind_buffer(target);
        }

        vao.vertex_count = self.mesh.positions().len() as u32;
        vao.index_count = indices.len() as u32;
        Ok(())
    }

    /// Draws the last upload: indexed when indices were uploaded, otherwise
    /// over all uploaded vertices. An empty upload draws nothing.
    pub fn draw<B: GpuBinding>(&self, gpu: &mut B) -> Result<(), MeshError> {
        let topology = resolve_topology::<B>(&self.mesh)?;
        let id = self.vao.id.ok_or(MeshError::NotSynchronized)?;

        gpu.bind_vertex_array(id);
        match self.vao.index_buffer.id {
            Some(buffer) if self.vao.index_count > 0 => {
                gpu.bind_buffer(BufferTarget::ElementArray, buffer);
                gpu.draw_elements(topology, self.vao.index_count);
                gpu.unbind_buffer(BufferTarget::ElementArray);
            }
            _ => gpu.draw_arrays(topology, 0, self.vao.vertex_count),
        }
        gpu.unbind_vertex_array();
        Ok(())
    }

    /// Deletes the vertex array and its buffers. The mesh is kept, so a later
    /// `update` rebuilds everything from scratch.
    pub fn release<B: GpuBinding>(&mut self, gpu: &mut B) {
        let vao = std::mem::take(&mut self.vao);

        for att in vao.attribs() {
            if let Some(b) = att.buffer.id {
                gpu.delete_buffer(b);
            }
        }
        if let Some(b) = vao.index_buffer.id {
            gpu.delete_buffer(b);
        }
        if let Some(id) = vao.id {
            gpu.delete_vertex_array(id);
            log::trace!("released vertex array {id:?}");
        }
    }
}

fn resolve_topology<B: GpuBinding>(mesh: &Mesh) -> Result<B::Topology, MeshError> {
    B::TOPOLOGIES
        .resolve(mesh.primitive())
        .ok_or(MeshError::UnmappedTopology {
            primitive: mesh.primitive(),
            backend: B::NAME,
        })
}

fn upload_attrib<B: GpuBinding, T: Pod>(gpu: &mut B, data: &[T], att: &mut MeshAttrib) {
    if data.is_empty() {
        gpu.disable_attrib(att.index);
        return;
    }
    gpu.enable_attrib(att.index);

    let buffer = match att.buffer.id {
        Some(b) => b,
        None => {
            let b = gpu.create_buffer(att.buffer.target);
            att.buffer.id = Some(b);
            gpu.attrib_pointer(att.index, b, att.components);
            b
        }
    };

    gpu.bind_buffer(att.buffer.target, buffer);
    gpu.buffer_data(att.buffer.target, bytemuck::cast_slice(data));
    gpu.unbind_buffer(att.buffer.target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::testing::{Call, RecordingBinding};
    use crate::mesh::Primitive;

    fn triangle() -> Mesh {
        let mut m = Mesh::new(Primitive::Triangles);
        m.vertex2(0.0, 0.0).vertex2(1.0, 0.0).vertex2(0.0, 1.0);
        m
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn upload_size_matches_stream_length() {
        let mut gpu = RecordingBinding::ready();
        let mut m = triangle();
        m.color(1.0, 0.0, 0.0, 1.0).color(0.0, 1.0, 0.0, 1.0).color(0.0, 0.0, 1.0, 1.0);
        let mut vm = VaoMesh::new(m);
        vm.update(&mut gpu).unwrap();

        let pos = gpu.attrib_buffer(attrib::POSITION).unwrap();
        let col = gpu.attrib_buffer(attrib::COLOR).unwrap();
        assert_eq!(gpu.buffer_len(pos), Some(3 * 12));
        assert_eq!(gpu.buffer_len(col), Some(3 * 16));
        assert_eq!(vm.vertex_count(), 3);
    }

    #[test]
    fn second_update_replaces_contents() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();
        let pos = gpu.attrib_buffer(attrib::POSITION).unwrap();

        vm.mesh_mut().vertex2(1.0, 1.0).vertex2(2.0, 2.0);
        vm.update(&mut gpu).unwrap();
        assert_eq!(gpu.buffer_len(pos), Some(5 * 12));

        vm.mesh_mut().reset();
        vm.mesh_mut().vertex2(7.0, 7.0);
        vm.update(&mut gpu).unwrap();
        assert_eq!(gpu.buffer_len(pos), Some(12));
        assert_eq!(gpu.buffer_f32(pos), vec![7.0, 7.0, 0.0]);
    }

    #[test]
    fn buffers_are_created_once() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();
        vm.update(&mut gpu).unwrap();
        vm.update(&mut gpu).unwrap();

        let creates = gpu
            .calls
            .iter()
            .filter(|c| matches!(c, Call::CreateBuffer(..)))
            .count();
        let vaos = gpu
            .calls
            .iter()
            .filter(|c| matches!(c, Call::CreateVertexArray(_)))
            .count();
        assert_eq!(creates, 1);
        assert_eq!(vaos, 1);
    }

    #[test]
    fn empty_streams_are_disabled_not_uploaded() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();

        assert!(gpu.calls.contains(&Call::DisableAttrib(attrib::COLOR)));
        assert!(gpu.calls.contains(&Call::DisableAttrib(attrib::NORMAL)));
        assert!(gpu.attrib_buffer(attrib::COLOR).is_none());
    }

    #[test]
    fn indices_upload_as_u32() {
        let mut gpu = RecordingBinding::ready();
        let mut m = triangle();
        m.indices_from([0, 1, 2, 2, 1, 0]);
        let mut vm = VaoMesh::new(m);
        vm.update(&mut gpu).unwrap();

        let ib = gpu.element_buffer().unwrap();
        assert_eq!(gpu.buffer_len(ib), Some(6 * 4));
        assert_eq!(vm.index_count(), 6);
    }

    #[test]
    fn not_ready_context_makes_no_gpu_calls() {
        let mut gpu = RecordingBinding::not_ready();
        let mut vm = VaoMesh::new(triangle());
        assert_eq!(vm.update(&mut gpu), Err(MeshError::ContextNotReady));
        assert!(gpu.calls.is_empty());
        assert!(!vm.is_synchronized());
    }

    #[test]
    fn unmapped_topology_fails_fast() {
        let mut gpu = RecordingBinding::points_only();
        let mut vm = VaoMesh::new(triangle());
        let err = vm.update(&mut gpu).unwrap_err();
        assert_eq!(
            err,
            MeshError::UnmappedTopology {
                primitive: Primitive::Triangles,
                backend: "points-only",
            }
        );
        assert!(gpu.calls.is_empty());
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_without_indices_covers_all_vertices() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();
        gpu.calls.clear();

        vm.draw(&mut gpu).unwrap();
        let draws = gpu.draws();
        assert_eq!(draws.len(), 1);
        assert!(matches!(
            draws[0],
            Call::DrawArrays { topology: 0x0004, first: 0, count: 3, .. }
        ));
        assert_eq!(gpu.calls.last(), Some(&Call::UnbindVertexArray));
    }

    #[test]
    fn draw_with_indices_is_indexed() {
        let mut gpu = RecordingBinding::ready();
        let mut m = triangle();
        m.set_primitive(Primitive::LineLoop).indices_from([0, 1, 2]);
        let mut vm = VaoMesh::new(m);
        vm.update(&mut gpu).unwrap();
        vm.draw(&mut gpu).unwrap();

        let draws = gpu.draws();
        assert!(matches!(draws[0], Call::DrawElements { topology: 0x0002, count: 3, .. }));
    }

    #[test]
    fn emptied_attribute_is_not_referenced_by_draw() {
        let mut gpu = RecordingBinding::ready();
        let mut m = triangle();
        m.color(1.0, 1.0, 1.0, 1.0).color(1.0, 1.0, 1.0, 1.0).color(1.0, 1.0, 1.0, 1.0);
        let mut vm = VaoMesh::new(m);
        vm.update(&mut gpu).unwrap();
        vm.draw(&mut gpu).unwrap();
        assert!(gpu.draws()[0].attribs().contains(&attrib::COLOR));

        vm.mesh_mut().colors_mut().clear();
        vm.update(&mut gpu).unwrap();
        gpu.calls.clear();
        vm.draw(&mut gpu).unwrap();
        assert_eq!(gpu.draws()[0].attribs(), &[attrib::POSITION]);
    }

    #[test]
    fn empty_mesh_draws_nothing() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(Mesh::new(Primitive::Points));
        vm.update(&mut gpu).unwrap();
        vm.draw(&mut gpu).unwrap();
        assert!(matches!(gpu.draws()[0], Call::DrawArrays { count: 0, .. }));
    }

    #[test]
    fn draw_before_update_is_rejected() {
        let mut gpu = RecordingBinding::ready();
        let vm = VaoMesh::new(triangle());
        assert_eq!(vm.draw(&mut gpu), Err(MeshError::NotSynchronized));
        assert_eq!(vm.bind(&mut gpu), Err(MeshError::NotSynchronized));
    }

    #[test]
    fn draw_uses_uploaded_counts_not_pending_edits() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();
        vm.mesh_mut().vertex2(5.0, 5.0);
        vm.draw(&mut gpu).unwrap();
        assert!(matches!(gpu.draws()[0], Call::DrawArrays { count: 3, .. }));
    }

    // ── copy / move ───────────────────────────────────────────────────────

    #[test]
    fn copy_without_ready_context_stays_unsynchronized() {
        let mut gpu = RecordingBinding::not_ready();
        let original = VaoMesh::new(triangle());
        let copy = VaoMesh::copy_from(&original, &mut gpu).unwrap();
        assert!(!copy.is_synchronized());
        assert!(gpu.calls.is_empty());
        assert_eq!(copy.mesh(), original.mesh());
    }

    #[test]
    fn copy_with_ready_context_is_drawable_and_independent() {
        let mut gpu = RecordingBinding::ready();
        let mut original = VaoMesh::new(triangle());
        original.update(&mut gpu).unwrap();

        let copy = VaoMesh::copy_from(&original, &mut gpu).unwrap();
        assert!(copy.is_synchronized());

        gpu.calls.clear();
        original.draw(&mut gpu).unwrap();
        copy.draw(&mut gpu).unwrap();
        let draws = gpu.draws();
        assert_eq!(draws[0].without_vao(), draws[1].without_vao());
        assert_ne!(draws[0].vao(), draws[1].vao());
    }

    #[test]
    fn clone_never_touches_the_gpu() {
        let mut gpu = RecordingBinding::ready();
        let mut original = VaoMesh::new(triangle());
        original.update(&mut gpu).unwrap();
        let copy = original.clone();
        assert!(!copy.is_synchronized());
        assert!(original.is_synchronized());
    }

    #[test]
    fn assign_copy_releases_previous_resources() {
        let mut gpu = RecordingBinding::ready();
        let mut a = VaoMesh::new(triangle());
        a.update(&mut gpu).unwrap();
        let mut b = VaoMesh::new(Mesh::new(Primitive::Points));
        b.update(&mut gpu).unwrap();
        let live_before = gpu.live_vertex_arrays();

        b.assign_copy(&a, &mut gpu).unwrap().draw(&mut gpu).unwrap();
        assert_eq!(gpu.live_vertex_arrays(), live_before);
        assert_eq!(b.mesh(), a.mesh());
        assert_eq!(b.vertex_count(), 3);
    }

    #[test]
    fn move_transfers_vertex_array_without_gpu_work() {
        let mut gpu = RecordingBinding::ready();
        let mut a = VaoMesh::new(triangle());
        a.update(&mut gpu).unwrap();
        gpu.calls.clear();

        let b = a.take();
        assert!(gpu.calls.is_empty());
        assert!(b.is_synchronized());
        assert!(!a.is_synchronized());
        assert!(a.mesh().is_empty());
    }

    #[test]
    fn release_then_update_rebuilds() {
        let mut gpu = RecordingBinding::ready();
        let mut vm = VaoMesh::new(triangle());
        vm.update(&mut gpu).unwrap();
        vm.release(&mut gpu);
        assert!(!vm.is_synchronized());
        assert_eq!(gpu.live_buffers(), 0);
        assert_eq!(gpu.live_vertex_arrays(), 0);

        vm.update(&mut gpu).unwrap();
        assert!(vm.is_synchronized());
        assert_eq!(gpu.live_buffers(), 1);
    }
}

//! In-memory `GpuBinding` that records every call, for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    BufferId, BufferTarget, ContextInfo, GpuBinding, GpuContext, TopologyTable, VertexArrayId,
    GL_TOPOLOGIES,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateBuffer(BufferId, BufferTarget),
    BindBuffer(BufferTarget, BufferId),
    UnbindBuffer(BufferTarget),
    BufferData { buffer: BufferId, len: usize },
    DeleteBuffer(BufferId),
    CreateVertexArray(VertexArrayId),
    BindVertexArray(VertexArrayId),
    UnbindVertexArray,
    DeleteVertexArray(VertexArrayId),
    EnableAttrib(u32),
    DisableAttrib(u32),
    AttribPointer { index: u32, buffer: BufferId, components: u32 },
    DrawArrays { vao: u32, topology: u32, first: u32, count: u32, attribs: Vec<u32> },
    DrawElements { vao: u32, topology: u32, count: u32, index_buffer: BufferId, attribs: Vec<u32> },
}

impl Call {
    /// Attribute slots a draw call read from.
    pub(crate) fn attribs(&self) -> &[u32] {
        match self {
            Call::DrawArrays { attribs, .. } | Call::DrawElements { attribs, .. } => attribs,
            _ => &[],
        }
    }

    pub(crate) fn vao(&self) -> Option<u32> {
        match self {
            Call::DrawArrays { vao, .. } | Call::DrawElements { vao, .. } => Some(*vao),
            _ => None,
        }
    }

    /// The call with its vertex-array name erased, for comparing output across meshes.
    pub(crate) fn without_vao(&self) -> Call {
        let mut c = self.clone();
        if let Call::DrawArrays { vao, .. } | Call::DrawElements { vao, .. } = &mut c {
            *vao = 0;
        }
        c
    }
}

#[derive(Debug, Default)]
struct VaoRecord {
    enabled: BTreeSet<u32>,
    pointers: BTreeMap<u32, (BufferId, u32)>,
}

const POINTS_ONLY: TopologyTable<u32> = TopologyTable::new([
    Some(0x0000), None, None, None, None, None, None, None, None, None, None,
]);

const FULL_TABLE: &TopologyTable<u32> = &GL_TOPOLOGIES;
const POINTS_TABLE: &TopologyTable<u32> = &POINTS_ONLY;

/// Records calls and mirrors buffer contents.
///
/// `FULL = false` swaps in a table that can only draw points.
#[derive(Debug)]
pub(crate) struct RecordingBinding<const FULL: bool = true> {
    context: GpuContext,
    pub(crate) calls: Vec<Call>,
    next_name: u32,
    buffers: BTreeMap<u32, (BufferTarget, Vec<u8>)>,
    vaos: BTreeMap<u32, VaoRecord>,
    bound_vao: Option<VertexArrayId>,
    bound: HashMap<BufferTarget, BufferId>,
}

impl RecordingBinding {
    pub(crate) fn ready() -> Self {
        Self::with_context(true)
    }

    pub(crate) fn not_ready() -> Self {
        Self::with_context(false)
    }
}

impl RecordingBinding<false> {
    pub(crate) fn points_only() -> Self {
        Self::with_context(true)
    }
}

impl<const FULL: bool> RecordingBinding<FULL> {
    fn with_context(ready: bool) -> Self {
        let context = GpuContext::new();
        if ready {
            context.mark_ready(ContextInfo {
                backend: "recording".into(),
                adapter: "memory".into(),
            });
        }
        Self {
            context,
            calls: Vec::new(),
            next_name: 1,
            buffers: BTreeMap::new(),
            vaos: BTreeMap::new(),
            bound_vao: None,
            bound: HashMap::new(),
        }
    }

    fn next(&mut self) -> u32 {
        let n = self.next_name;
        self.next_name += 1;
        n
    }

    fn current_vao(&mut self) -> &mut VaoRecord {
        let id = self.bound_vao.expect("attribute call without a bound vertex array");
        self.vaos.get_mut(&id.0).expect("bound vertex array was deleted")
    }

    fn enabled_pointers(&self) -> Vec<u32> {
        let Some(id) = self.bound_vao else { return Vec::new() };
        let rec = &self.vaos[&id.0];
        rec.enabled
            .iter()
            .copied()
            .filter(|i| rec.pointers.contains_key(i))
            .collect()
    }

    pub(crate) fn draws(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawArrays { .. } | Call::DrawElements { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn buffer_len(&self, id: BufferId) -> Option<usize> {
        self.buffers.get(&id.0).map(|(_, bytes)| bytes.len())
    }

    pub(crate) fn buffer_f32(&self, id: BufferId) -> Vec<f32> {
        self.buffers
            .get(&id.0)
            .map(|(_, bytes)| {
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Buffer attached to attribute `index` on the first vertex array that has one.
    pub(crate) fn attrib_buffer(&self, index: u32) -> Option<BufferId> {
        self.vaos
            .values()
            .find_map(|rec| rec.pointers.get(&index).map(|(b, _)| *b))
    }

    pub(crate) fn element_buffer(&self) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|(_, (t, _))| *t == BufferTarget::ElementArray)
            .map(|(id, _)| BufferId(*id))
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub(crate) fn live_vertex_arrays(&self) -> usize {
        self.vaos.len()
    }
}

impl<const FULL: bool> GpuBinding for RecordingBinding<FULL> {
    type Topology = u32;

    const NAME: &'static str = if FULL { "recording" } else { "points-only" };

    const TOPOLOGIES: &'static TopologyTable<u32> =
        if FULL { FULL_TABLE } else { POINTS_TABLE };

    fn context(&self) -> &GpuContext {
        &self.context
    }

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        let id = BufferId(self.next());
        self.buffers.insert(id.0, (target, Vec::new()));
        self.calls.push(Call::CreateBuffer(id, target));
        id
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId) {
        assert!(self.buffers.contains_key(&buffer.0), "binding unknown buffer");
        self.bound.insert(target, buffer);
        self.calls.push(Call::BindBuffer(target, buffer));
    }

    fn unbind_buffer(&mut self, target: BufferTarget) {
        self.bound.remove(&target);
        self.calls.push(Call::UnbindBuffer(target));
    }

    fn buffer_data(&mut self, target: BufferTarget, bytes: &[u8]) {
        let buffer = *self.bound.get(&target).expect("buffer_data without a bound buffer");
        if let Some((_, data)) = self.buffers.get_mut(&buffer.0) {
            data.clear();
            data.extend_from_slice(bytes);
        }
        self.calls.push(Call::BufferData {
            buffer,
            len: bytes.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer.0);
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next());
        self.vaos.insert(id.0, VaoRecord::default());
        self.calls.push(Call::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        assert!(self.bound_vao.is_none(), "nested vertex array bind");
        assert!(self.vaos.contains_key(&vao.0), "binding unknown vertex array");
        self.bound_vao = Some(vao);
        self.calls.push(Call::BindVertexArray(vao));
    }

    fn unbind_vertex_array(&mut self) {
        self.bound_vao = None;
        self.calls.push(Call::UnbindVertexArray);
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.vaos.remove(&vao.0);
        self.calls.push(Call::DeleteVertexArray(vao));
    }

    fn enable_attrib(&mut self, index: u32) {
        self.current_vao().enabled.insert(index);
        self.calls.push(Call::EnableAttrib(index));
    }

    fn disable_attrib(&mut self, index: u32) {
        self.current_vao().enabled.remove(&index);
        self.calls.push(Call::DisableAttrib(index));
    }

    fn attrib_pointer(&mut self, index: u32, buffer: BufferId, components: u32) {
        self.current_vao().pointers.insert(index, (buffer, components));
        self.calls.push(Call::AttribPointer {
            index,
            buffer,
            components,
        });
    }

    fn draw_arrays(&mut self, topology: u32, first: u32, count: u32) {
        let vao = self.bound_vao.expect("draw without a bound vertex array").0;
        let attribs = self.enabled_pointers();
        self.calls.push(Call::DrawArrays {
            vao,
            topology,
            first,
            count,
            attribs,
        });
    }

    fn draw_elements(&mut self, topology: u32, count: u32) {
        let vao = self.bound_vao.expect("draw without a bound vertex array").0;
        let index_buffer = *self
            .bound
            .get(&BufferTarget::ElementArray)
            .expect("indexed draw without an element buffer");
        let attribs = self.enabled_pointers();
        self.calls.push(Call::DrawElements {
            vao,
            topology,
            count,
            index_buffer,
            attribs,
        });
    }
}

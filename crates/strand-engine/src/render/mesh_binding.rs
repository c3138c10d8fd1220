use std::collections::HashMap;

use crate::gpu::{
    attrib, BufferId, BufferTarget, GpuBinding, GpuContext, TopologyTable, VertexArrayId,
};

use super::sizing::{elements, padded_len, range_fits, reallocation};
use super::slab::Slab;
use super::RenderTarget;

/// Primitive kinds wgpu can draw natively. Loops, fans and adjacency
/// topologies have no wgpu equivalent.
pub const WGPU_TOPOLOGIES: TopologyTable<wgpu::PrimitiveTopology> = TopologyTable::new([
    Some(wgpu::PrimitiveTopology::PointList),
    Some(wgpu::PrimitiveTopology::LineList),
    Some(wgpu::PrimitiveTopology::LineStrip),
    None,
    Some(wgpu::PrimitiveTopology::TriangleList),
    Some(wgpu::PrimitiveTopology::TriangleStrip),
    None,
    None,
    None,
    None,
    None,
]);

const WGPU_TABLE: &TopologyTable<wgpu::PrimitiveTopology> = &WGPU_TOPOLOGIES;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

const POSITION_COMPONENTS: u32 = 3;
const COLOR_COMPONENTS: u32 = 4;

/// Device buffer backing one `BufferId`. Grows, never shrinks.
struct GpuBuffer {
    target: BufferTarget,
    raw: Option<wgpu::Buffer>,
    capacity: u64,
    len: u64,
    /// A queued draw holds `raw`; the next upload must not write into it.
    referenced: bool,
}

/// The allocation and byte length a buffer had when a draw was queued.
#[derive(Debug, Clone)]
struct BufferSnapshot {
    raw: wgpu::Buffer,
    len: u64,
}

impl BufferSnapshot {
    fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.raw.slice(0..self.len)
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct AttribSlot {
    buffer: Option<BufferId>,
    components: u32,
    enabled: bool,
}

impl AttribSlot {
    fn active(&self) -> Option<BufferId> {
        if self.enabled { self.buffer } else { None }
    }
}

#[derive(Debug, Default)]
struct VertexArrayState {
    slots: [AttribSlot; attrib::COUNT],
}

/// A draw recorded between `draw_*` and `flush`, with the buffers it reads
/// captured at the time of the call.
#[derive(Debug)]
struct DrawCall {
    topology: wgpu::PrimitiveTopology,
    position: BufferSnapshot,
    color: Option<BufferSnapshot>,
    indices: Option<BufferSnapshot>,
    first: u32,
    count: u32,
}

impl DrawCall {
    fn key(&self) -> PipelineKey {
        PipelineKey {
            topology: self.topology,
            colored: self.color.is_some(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    topology: wgpu::PrimitiveTopology,
    colored: bool,
}

/// `GpuBinding` over a wgpu device.
///
/// Buffer uploads go straight to the queue. Draw calls are queued and replayed
/// into a render pass by [`flush`](Self::flush), since wgpu records draws
/// inside passes rather than immediately. An upload into a buffer that a
/// queued draw still reads goes to a fresh allocation, so each queued draw
/// renders the data it was issued with. The flushed frame must be submitted
/// before the next upload.
///
/// Supported layouts: position as 3 floats at slot 0, optional color as 4
/// floats at slot 1. Texture coordinates and normals are accepted and
/// uploaded but not consumed by the built-in shader.
pub struct WgpuBinding {
    device: wgpu::Device,
    queue: wgpu::Queue,
    context: GpuContext,

    buffers: Slab<GpuBuffer>,
    vertex_arrays: Slab<VertexArrayState>,

    bound_vao: Option<VertexArrayId>,
    bound_array: Option<BufferId>,
    bound_element: Option<BufferId>,

    pending: Vec<DrawCall>,

    pipeline_format: Option<wgpu::TextureFormat>,
    shader: Option<wgpu::ShaderModule>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    warned_layout: bool,
}

impl WgpuBinding {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, context: GpuContext) -> Self {
        Self {
            device,
            queue,
            context,
            buffers: Slab::default(),
            vertex_arrays: Slab::default(),
            bound_vao: None,
            bound_array: None,
            bound_element: None,
            pending: Vec::new(),
            pipeline_format: None,
            shader: None,
            pipeline_layout: None,
            pipelines: HashMap::new(),
            warned_layout: false,
        }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Number of draws waiting for the next `flush`.
    #[inline]
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Drops queued draws without recording them.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
        self.release_references();
    }

    /// Live buffers and vertex arrays.
    pub fn live_resources(&self) -> (usize, usize) {
        (self.buffers.len(), self.vertex_arrays.len())
    }

    /// Records all queued draws into one render pass over `target`.
    ///
    /// `load` decides whether the pass clears the target first. A pass is
    /// always recorded so a clear happens even with nothing to draw.
    pub fn flush(
        &mut self,
        target: &mut RenderTarget<'_>,
        format: wgpu::TextureFormat,
        load: wgpu::LoadOp<wgpu::Color>,
    ) {
        self.ensure_shader(format);

        let keys: Vec<PipelineKey> = self.pending.iter().map(DrawCall::key).collect();
        for key in keys {
            self.ensure_pipeline(key, format);
        }

        let pending = std::mem::take(&mut self.pending);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("strand mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for call in &pending {
            let Some(pipeline) = self.pipelines.get(&call.key()) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_vertex_buffer(0, call.position.slice());
            if let Some(color) = &call.color {
                rpass.set_vertex_buffer(1, color.slice());
            }

            match &call.indices {
                Some(indices) => {
                    rpass.set_index_buffer(indices.slice(), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..call.count, 0, 0..1);
                }
                None => rpass.draw(call.first..call.first + call.count, 0..1),
            }
        }
        drop(rpass);

        self.release_references();
    }

    fn release_references(&mut self) {
        for buf in self.buffers.values_mut() {
            buf.referenced = false;
        }
    }

    /// Captures `id`'s current allocation for a queued draw. Empty buffers
    /// yield `None`.
    fn snapshot(&mut self, id: BufferId) -> Option<BufferSnapshot> {
        let buf = self.buffers.get_mut(id.0)?;
        if buf.len == 0 {
            return None;
        }
        let raw = buf.raw.clone()?;
        buf.referenced = true;
        Some(BufferSnapshot { raw, len: buf.len })
    }

    fn buffer_len(&self, id: BufferId) -> u64 {
        self.buffers.get(id.0).map_or(0, |b| b.len)
    }

    fn bound_state(&mut self) -> Option<&mut VertexArrayState> {
        let id = self.bound_vao?;
        self.vertex_arrays.get_mut(id.0)
    }

    fn with_slot(&mut self, index: u32, f: impl FnOnce(&mut AttribSlot)) {
        match self.bound_state() {
            Some(state) => match state.slots.get_mut(index as usize) {
                Some(slot) => f(slot),
                None => log::warn!("attribute slot {index} out of range"),
            },
            None => log::warn!("attribute call on slot {index} without a bound vertex array"),
        }
    }

    /// Snapshots the bound vertex array's enabled position/color buffers and
    /// returns them with the number of vertices the positions hold.
    fn draw_sources(&mut self) -> Option<(BufferSnapshot, Option<BufferSnapshot>, u64)> {
        let state = self.bound_state()?;
        let pos = state.slots[attrib::POSITION as usize];
        let col = state.slots[attrib::COLOR as usize];

        let layout_ok = pos.components == POSITION_COMPONENTS
            && (col.active().is_none() || col.components == COLOR_COMPONENTS);
        let Some(position) = pos.active().filter(|_| layout_ok) else {
            if !self.warned_layout {
                log::warn!(
                    "draw skipped: wgpu backend needs a 3-float position stream (and 4-float colors)"
                );
                self.warned_layout = true;
            }
            return None;
        };

        let position = self.snapshot(position)?;
        let vertices = elements(position.len, POSITION_COMPONENTS);

        // A color stream shorter than the positions would overrun on the GPU.
        let color = match col.active() {
            Some(c) if elements(self.buffer_len(c), COLOR_COMPONENTS) >= vertices => {
                self.snapshot(c)
            }
            _ => None,
        };
        Some((position, color, vertices))
    }

    fn ensure_shader(&mut self, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.shader.is_some() {
            return;
        }

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("strand mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("strand mesh pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        self.pipeline_format = Some(format);
        self.shader = Some(shader);
        self.pipeline_layout = Some(layout);
        self.pipelines.clear();
    }

    fn ensure_pipeline(&mut self, key: PipelineKey, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (Some(shader), Some(layout)) = (self.shader.as_ref(), self.pipeline_layout.as_ref())
        else {
            return;
        };

        let position_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        };
        let color_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 4]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        };
        let plain = [position_layout.clone()];
        let colored = [position_layout, color_layout];

        let (entry_point, buffers): (&str, &[wgpu::VertexBufferLayout<'_>]) = if key.colored {
            ("vs_colored", &colored)
        } else {
            ("vs_plain", &plain)
        };

        let strip_index_format = match key.topology {
            wgpu::PrimitiveTopology::LineStrip | wgpu::PrimitiveTopology::TriangleStrip => {
                Some(wgpu::IndexFormat::Uint32)
            }
            _ => None,
        };

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("strand mesh pipeline"),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: key.topology,
                strip_index_format,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built mesh pipeline {key:?} for {format:?}");
        self.pipelines.insert(key, pipeline);
    }
}

impl GpuBinding for WgpuBinding {
    type Topology = wgpu::PrimitiveTopology;

    const NAME: &'static str = "wgpu";

    const TOPOLOGIES: &'static TopologyTable<wgpu::PrimitiveTopology> = WGPU_TABLE;

    fn context(&self) -> &GpuContext {
        &self.context
    }

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        BufferId(self.buffers.insert(GpuBuffer {
            target,
            raw: None,
            capacity: 0,
            len: 0,
            referenced: false,
        }))
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId) {
        match target {
            BufferTarget::Array => self.bound_array = Some(buffer),
            BufferTarget::ElementArray => self.bound_element = Some(buffer),
        }
    }

    fn unbind_buffer(&mut self, target: BufferTarget) {
        match target {
            BufferTarget::Array => self.bound_array = None,
            BufferTarget::ElementArray => self.bound_element = None,
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, bytes: &[u8]) {
        let bound = match target {
            BufferTarget::Array => self.bound_array,
            BufferTarget::ElementArray => self.bound_element,
        };
        let Some(id) = bound else {
            log::warn!("buffer_data on {target:?} with no buffer bound");
            return;
        };
        let Some(buf) = self.buffers.get_mut(id.0) else {
            log::warn!("buffer_data on deleted buffer {id:?}");
            return;
        };

        buf.len = bytes.len() as u64;
        if bytes.is_empty() {
            return;
        }

        // Queue writes must be a multiple of COPY_BUFFER_ALIGNMENT.
        let padded = padded_len(buf.len);
        let current = buf.raw.as_ref().map(|_| buf.capacity);

        if let Some(capacity) = reallocation(current, padded, buf.referenced) {
            let usage = match buf.target {
                BufferTarget::Array => wgpu::BufferUsages::VERTEX,
                BufferTarget::ElementArray => wgpu::BufferUsages::INDEX,
            } | wgpu::BufferUsages::COPY_DST;

            buf.raw = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("strand mesh buffer"),
                size: capacity,
                usage,
                mapped_at_creation: false,
            }));
            buf.capacity = capacity;
            buf.referenced = false;
        }

        let Some(raw) = buf.raw.as_ref() else { return };
        if padded == buf.len {
            self.queue.write_buffer(raw, 0, bytes);
        } else {
            let mut staged = bytes.to_vec();
            staged.resize(padded as usize, 0);
            self.queue.write_buffer(raw, 0, &staged);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(buffer.0);
        if self.bound_array == Some(buffer) {
            self.bound_array = None;
        }
        if self.bound_element == Some(buffer) {
            self.bound_element = None;
        }
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        VertexArrayId(self.vertex_arrays.insert(VertexArrayState::default()))
    }

    fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        debug_assert!(self.bound_vao.is_none(), "nested vertex array bind");
        self.bound_vao = Some(vao);
    }

    fn unbind_vertex_array(&mut self) {
        self.bound_vao = None;
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.vertex_arrays.remove(vao.0);
        if self.bound_vao == Some(vao) {
            self.bound_vao = None;
        }
    }

    fn enable_attrib(&mut self, index: u32) {
        self.with_slot(index, |s| s.enabled = true);
    }

    fn disable_attrib(&mut self, index: u32) {
        self.with_slot(index, |s| s.enabled = false);
    }

    fn attrib_pointer(&mut self, index: u32, buffer: BufferId, components: u32) {
        self.with_slot(index, |s| {
            s.buffer = Some(buffer);
            s.components = components;
        });
    }

    fn draw_arrays(&mut self, topology: wgpu::PrimitiveTopology, first: u32, count: u32) {
        if count == 0 {
            return;
        }
        let Some((position, color, vertices)) = self.draw_sources() else { return };
        if !range_fits(first, count, vertices) {
            log::warn!("draw skipped: vertices {first}..+{count} exceed the {vertices} uploaded");
            return;
        }
        self.pending.push(DrawCall {
            topology,
            position,
            color,
            indices: None,
            first,
            count,
        });
    }

    fn draw_elements(&mut self, topology: wgpu::PrimitiveTopology, count: u32) {
        if count == 0 {
            return;
        }
        let Some(element) = self.bound_element else {
            log::warn!("indexed draw without an element buffer bound");
            return;
        };
        let Some(indices) = self.snapshot(element) else { return };
        let available = elements(indices.len, 1);
        if !range_fits(0, count, available) {
            log::warn!("draw skipped: {count} indices exceed the {available} uploaded");
            return;
        }
        let Some((position, color, _)) = self.draw_sources() else { return };
        self.pending.push(DrawCall {
            topology,
            position,
            color,
            indices: Some(indices),
            first: 0,
            count,
        });
    }
}

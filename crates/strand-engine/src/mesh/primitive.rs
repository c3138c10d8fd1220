/// Semantic primitive topology of a mesh.
///
/// Backends map these onto their native enumeration through a
/// [`TopologyTable`](crate::gpu::TopologyTable); not every backend supports
/// every kind.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points = 0,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    LinesAdjacency,
    LineStripAdjacency,
    TrianglesAdjacency,
    TriangleStripAdjacency,
}

impl Primitive {
    pub const COUNT: usize = 11;

    pub const ALL: [Primitive; Self::COUNT] = [
        Primitive::Points,
        Primitive::Lines,
        Primitive::LineStrip,
        Primitive::LineLoop,
        Primitive::Triangles,
        Primitive::TriangleStrip,
        Primitive::TriangleFan,
        Primitive::LinesAdjacency,
        Primitive::LineStripAdjacency,
        Primitive::TrianglesAdjacency,
        Primitive::TriangleStripAdjacency,
    ];

    /// Dense index in `0..COUNT`, used as a table slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

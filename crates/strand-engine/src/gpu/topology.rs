use crate::mesh::Primitive;

/// Fixed lookup from [`Primitive`] to a backend's native topology value.
///
/// Tables are `const`-constructed, so lookups never allocate and never change
/// after compile time. Missing entries mean the backend cannot draw that kind.
#[derive(Debug)]
pub struct TopologyTable<T: Copy + 'static> {
    entries: [Option<T>; Primitive::COUNT],
}

impl<T: Copy + 'static> TopologyTable<T> {
    /// Builds a table from entries laid out in [`Primitive::ALL`] order.
    pub const fn new(entries: [Option<T>; Primitive::COUNT]) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn resolve(&self, primitive: Primitive) -> Option<T> {
        self.entries[primitive.index()]
    }

    /// Iterates the primitives this table can express.
    pub fn supported(&self) -> impl Iterator<Item = Primitive> + '_ {
        Primitive::ALL
            .into_iter()
            .filter(|p| self.entries[p.index()].is_some())
    }
}

/// OpenGL `GLenum` values for every primitive kind.
pub const GL_TOPOLOGIES: TopologyTable<u32> = TopologyTable::new([
    Some(0x0000), // GL_POINTS
    Some(0x0001), // GL_LINES
    Some(0x0003), // GL_LINE_STRIP
    Some(0x0002), // GL_LINE_LOOP
    Some(0x0004), // GL_TRIANGLES
    Some(0x0005), // GL_TRIANGLE_STRIP
    Some(0x0006), // GL_TRIANGLE_FAN
    Some(0x000A), // GL_LINES_ADJACENCY
    Some(0x000B), // GL_LINE_STRIP_ADJACENCY
    Some(0x000C), // GL_TRIANGLES_ADJACENCY
    Some(0x000D), // GL_TRIANGLE_STRIP_ADJACENCY
]);

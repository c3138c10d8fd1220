use super::Primitive;

/// Ordered per-vertex streams plus an optional index list.
///
/// Streams are independent: a mesh may carry positions only, or positions
/// with colors, and so on. Empty streams are legal and simply not uploaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    primitive: Primitive,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            ..Self::default()
        }
    }

    #[inline]
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    #[inline]
    pub fn set_primitive(&mut self, primitive: Primitive) -> &mut Self {
        self.primitive = primitive;
        self
    }

    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.positions.push([x, y, z]);
        self
    }

    /// Pushes a vertex on the `z = 0` plane.
    pub fn vertex2(&mut self, x: f32, y: f32) -> &mut Self {
        self.vertex(x, y, 0.0)
    }

    pub fn color(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        self.colors.push([r, g, b, a]);
        self
    }

    pub fn tex_coord(&mut self, u: f32, v: f32) -> &mut Self {
        self.tex_coords.push([u, v]);
        self
    }

    pub fn normal(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.normals.push([x, y, z]);
        self
    }

    pub fn index(&mut self, i: u32) -> &mut Self {
        self.indices.push(i);
        self
    }

    pub fn indices_from(&mut self, indices: impl IntoIterator<Item = u32>) -> &mut Self {
        self.indices.extend(indices);
        self
    }

    /// Clears every stream. The primitive is kept.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.tex_coords.clear();
        self.normals.clear();
        self.indices.clear();
    }

    /// Replaces this mesh's contents with `other`'s, reusing allocations.
    pub fn copy_from(&mut self, other: &Mesh) {
        self.clone_from(other);
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    #[inline]
    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    #[inline]
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Mutable access to the color stream, e.g. for per-frame recoloring.
    #[inline]
    pub fn colors_mut(&mut self) -> &mut Vec<[f32; 4]> {
        &mut self.colors
    }

    /// Mutable access to the position stream.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut Vec<[f32; 3]> {
        &mut self.positions
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.indices.is_empty()
    }
}

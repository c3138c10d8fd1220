//! CPU-side geometry.
//!
//! A `Mesh` is plain data owned by the application. GPU mirroring lives in
//! `gpu::VaoMesh`, which reads a mesh but never edits it on its own.

mod geometry;
mod primitive;

pub use geometry::Mesh;
pub use primitive::Primitive;

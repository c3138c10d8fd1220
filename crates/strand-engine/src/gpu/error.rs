use thiserror::Error;

use crate::mesh::Primitive;

/// Failures surfaced by `VaoMesh` operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    /// The backend's topology table has no entry for this primitive.
    #[error("primitive {primitive:?} has no native topology on the {backend} backend")]
    UnmappedTopology {
        primitive: Primitive,
        backend: &'static str,
    },

    /// GPU work was requested before the context was marked ready.
    #[error("gpu context is not ready")]
    ContextNotReady,

    /// The mesh was bound or drawn before its first successful `update`.
    #[error("mesh has not been uploaded to the gpu; call update() first")]
    NotSynchronized,
}

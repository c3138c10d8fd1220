use std::sync::Arc;

use state::InitCell;

/// Facts recorded when a GPU context comes up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    pub backend: String,
    pub adapter: String,
}

/// Readiness of the GPU context shared by the device layer and mesh managers.
///
/// The handle is cheap to clone; all clones observe the same state. It starts
/// not-ready and becomes ready exactly once when the device layer calls
/// [`mark_ready`](Self::mark_ready). There is no teardown transition.
#[derive(Debug, Clone, Default)]
pub struct GpuContext {
    info: Arc<InitCell<ContextInfo>>,
}

impl GpuContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a device has been created for this context.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.info.try_get().is_some()
    }

    /// Adapter/backend details, once ready.
    pub fn info(&self) -> Option<&ContextInfo> {
        self.info.try_get()
    }

    /// Marks the context as ready.
    ///
    /// Returns `false` (and leaves the first `info` in place) if the context was
    /// already initialized.
    pub fn mark_ready(&self, info: ContextInfo) -> bool {
        let backend = info.backend.clone();
        let adapter = info.adapter.clone();

        if self.info.set(info) {
            log::info!("gpu context ready: {adapter} ({backend})");
            true
        } else {
            log::warn!("gpu context already initialized; ignoring {adapter} ({backend})");
            false
        }
    }
}

use crate::gpu::{GpuBinding, MeshError};
use crate::time::Sec;

/// A self-animating drawable living in a [`VoicePool`].
///
/// `init` runs once when the voice joins a pool, `update` advances its state
/// every frame, and `on_process` uploads and draws. A voice that reports
/// `!is_active()` is released and dropped on the next [`VoicePool::reap`].
pub trait Voice<B: GpuBinding> {
    fn init(&mut self, gpu: &mut B) -> Result<(), MeshError>;

    fn update(&mut self, dt: Sec);

    fn on_process(&mut self, gpu: &mut B) -> Result<(), MeshError>;

    fn is_active(&self) -> bool {
        true
    }

    /// Frees GPU resources before the voice is dropped.
    fn release(&mut self, gpu: &mut B) {
        let _ = gpu;
    }
}

/// Owns a heterogeneous set of voices behind `dyn Voice`.
pub struct VoicePool<B: GpuBinding> {
    voices: Vec<Box<dyn Voice<B>>>,
}

impl<B: GpuBinding> Default for VoicePool<B> {
    fn default() -> Self {
        Self { voices: Vec::new() }
    }
}

impl<B: GpuBinding> VoicePool<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Initializes `voice` and adds it to the pool. A voice whose `init` fails
    /// is released and not added.
    pub fn spawn<V>(&mut self, mut voice: V, gpu: &mut B) -> Result<(), MeshError>
    where
        V: Voice<B> + 'static,
    {
        if let Err(e) = voice.init(gpu) {
            voice.release(gpu);
            return Err(e);
        }
        self.voices.push(Box::new(voice));
        Ok(())
    }

    /// Advances every active voice by `dt`.
    pub fn update(&mut self, dt: Sec) {
        for v in self.voices.iter_mut().filter(|v| v.is_active()) {
            v.update(dt);
        }
    }

    /// Runs `on_process` on every active voice, stopping at the first error.
    pub fn process(&mut self, gpu: &mut B) -> Result<(), MeshError> {
        for v in self.voices.iter_mut().filter(|v| v.is_active()) {
            v.on_process(gpu)?;
        }
        Ok(())
    }

    /// Releases and drops inactive voices. Returns how many were removed.
    pub fn reap(&mut self, gpu: &mut B) -> usize {
        let before = self.voices.len();
        self.voices.retain_mut(|v| {
            if v.is_active() {
                true
            } else {
                v.release(gpu);
                false
            }
        });
        before - self.voices.len()
    }

    /// Releases and drops every voice.
    pub fn clear(&mut self, gpu: &mut B) {
        for mut v in self.voices.drain(..) {
            v.release(gpu);
        }
    }
}

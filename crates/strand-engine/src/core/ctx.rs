use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::gpu::MeshError;
use crate::render::WgpuBinding;
use crate::time::{Clock, DelayLockedLoop, Sec};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the callback's borrow; `'w` is the window lifetime carried by
/// `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    /// Logical time, already advanced for this frame.
    pub clock: &'a Clock,
    /// Frame-rate DLL fed with the steady time of each frame start.
    pub pacing: &'a DelayLockedLoop,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Seconds since the previous frame.
    #[inline]
    pub fn dt(&self) -> Sec {
        self.clock.dt()
    }

    /// Runs `draw` against the mesh binding, then clears to `clear`, replays
    /// the queued draws and presents.
    ///
    /// A draw error is logged and the frame is presented with nothing but the
    /// clear color. A fatal surface error requests exit.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut WgpuBinding) -> Result<(), MeshError>,
    {
        let binding = self.gpu.binding_mut();
        if let Err(e) = draw(binding) {
            log::error!("frame {} draw failed: {e}", self.clock.frame());
            binding.discard_pending();
        }

        match self.gpu.render_frame(clear) {
            Ok(()) | Err(SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame) => {
                AppControl::Continue
            }
            Err(SurfaceErrorAction::Fatal) => AppControl::Exit,
        }
    }
}

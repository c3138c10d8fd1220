use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::gpu::{ContextInfo, GpuContext};
use crate::render::{RenderTarget, WgpuBinding};

use super::surface::{
    choose_alpha_mode, choose_surface_format, classify_surface_error, surface_extent,
};
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// A window's surface plus the device-backed mesh binding.
///
/// The surface borrows the window for `'w`; the owner must keep the window
/// alive at least as long as this value.
pub struct Gpu<'w> {
    window: &'w Window,
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels. May be zero while minimized.
    size: PhysicalSize<u32>,

    binding: WgpuBinding,
}

impl<'w> Gpu<'w> {
    /// Brings up wgpu for `window` and marks `context` ready.
    ///
    /// Adapter and device requests are asynchronous; callers on the event loop
    /// thread block on this with `pollster`.
    pub async fn new(window: &'w Window, init: GpuInit, context: &GpuContext) -> Result<Self> {
        let size = window.inner_size();

        let GpuInit {
            backends,
            power_preference,
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("strand-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, prefer_srgb)
            .context("surface reports no supported formats")?;

        let (width, height) = surface_extent(size);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let adapter_info = adapter.get_info();
        log::debug!(
            "surface configured: {}x{} {:?} {:?}",
            width,
            height,
            format,
            present_mode
        );

        context.mark_ready(ContextInfo {
            backend: format!("{:?}", adapter_info.backend),
            adapter: adapter_info.name,
        });

        Ok(Self {
            window,
            surface,
            config,
            size,
            binding: WgpuBinding::new(device, queue, context.clone()),
        })
    }

    /// The binding mesh managers upload and draw through.
    #[inline]
    pub fn binding_mut(&mut self) -> &mut WgpuBinding {
        &mut self.binding
    }

    #[inline]
    pub fn binding(&self) -> &WgpuBinding {
        &self.binding
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        self.binding.device()
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface for a new drawable size.
    ///
    /// A zero-sized surface cannot be configured; the size is recorded and
    /// configuration waits for the next non-zero resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.binding.device(), &self.config);
    }

    /// Acquires the next surface texture and opens an encoder for it.
    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("strand frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Records the mesh draws queued on the binding into `frame`, clearing to
    /// `clear` first.
    pub fn encode_meshes(&mut self, frame: &mut GpuFrame, clear: wgpu::Color) {
        let format = self.config.format;
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        self.binding
            .flush(&mut target, format, wgpu::LoadOp::Clear(clear));
    }

    /// Submits the frame's commands and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.binding.queue().submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Acquires, clears, draws the queued meshes and presents.
    ///
    /// On acquisition failure the queued draws are discarded and the error is
    /// resolved into an action (reconfiguring the surface if needed).
    pub fn render_frame(&mut self, clear: wgpu::Color) -> Result<(), SurfaceErrorAction> {
        let mut frame = match self.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                self.binding.discard_pending();
                return Err(self.handle_surface_error(err));
            }
        };

        self.encode_meshes(&mut frame, clear);
        self.window.pre_present_notify();
        self.submit(frame);
        Ok(())
    }

    /// Resolves a surface error, reconfiguring lost or outdated surfaces.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(self.binding.device(), &self.config);
                }
                log::debug!("surface {err}; reconfigured");
            }
            SurfaceErrorAction::SkipFrame => log::debug!("surface {err}; skipping frame"),
            SurfaceErrorAction::Fatal => log::error!("surface {err}"),
        }
        action
    }
}

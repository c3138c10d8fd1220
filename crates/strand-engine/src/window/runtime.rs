use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::gpu::GpuContext;
use crate::time::{steady_time, Clock, ClockMode, DelayLockedLoop, Sec};

/// Window and loop configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// How the frame clock advances.
    pub clock: ClockMode,
    /// Expected frame period for the pacing DLL.
    pub frame_period: Sec,
    /// Bandwidth (Hz) of the pacing DLL.
    pub pacing_bandwidth: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "strand".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clock: ClockMode::Realtime,
            frame_period: 1.0 / 60.0,
            pacing_bandwidth: DelayLockedLoop::DEFAULT_BANDWIDTH,
        }
    }
}

/// Requests an app can make during a frame. Applied after the callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    exit: bool,
    reset_pacing: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }

    /// Re-anchors the pacing DLL on the next frame, e.g. after a long stall.
    pub fn reset_pacing(&mut self) {
        self.reset_pacing = true;
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: Clock,
    pacing: DelayLockedLoop,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    context: GpuContext,
    app: A,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            context: GpuContext::new(),
            app,
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let id = window.id();

        let gpu_init = self.gpu_init.clone();
        let context = self.context.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: Clock::from_mode(self.config.clock),
            pacing: DelayLockedLoop::with_bandwidth(
                self.config.frame_period,
                self.config.pacing_bandwidth,
            ),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init, &context)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        entry
            .with_gpu_mut(|gpu| self.app.on_create(gpu))
            .context("application on_create failed")?;

        self.entry = Some(entry);
        Ok(id)
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else { return };

        let mut runtime_ctx = RuntimeCtx::default();
        let app = &mut self.app;

        let control = entry.with_mut(|fields| {
            fields.clock.update();
            fields.pacing.step(steady_time());

            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                clock: fields.clock,
                pacing: fields.pacing,
                runtime: &mut runtime_ctx,
            };
            let control = app.on_frame(&mut ctx);

            if runtime_ctx.reset_pacing {
                fields.pacing.reset();
            }
            control
        });

        if control == AppControl::Exit || runtime_ctx.exit {
            self.exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(id) => {
                log::debug!("window {id:?} ready");
                if let Some(entry) = &self.entry {
                    entry.with_window(|w| w.request_redraw());
                }
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; FIFO presentation paces the loop.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }
}

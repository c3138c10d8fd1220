use std::f32::consts::TAU;

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use strand_engine::core::{App, AppControl, FrameCtx, Voice, VoicePool};
use strand_engine::device::{Gpu, GpuInit};
use strand_engine::gpu::{GpuBinding, MeshError, VaoMesh};
use strand_engine::logging::{init_logging, LoggingConfig};
use strand_engine::mesh::{Mesh, Primitive};
use strand_engine::render::WgpuBinding;
use strand_engine::time::{Sec, Timer};
use strand_engine::window::{Runtime, RuntimeConfig};

const WAVE_POINTS: usize = 128;
const SPAWN_INTERVAL: Sec = 0.2;
const STATS_INTERVAL: Sec = 2.0;

/// A square that shrinks toward its center while cycling hue, then dies.
struct Spark {
    mesh: VaoMesh,
    center: [f32; 2],
    half: f32,
    age: f32,
}

impl Spark {
    const SHRINK: f32 = 0.35;
    const MIN_HALF: f32 = 0.01;

    fn new(center: [f32; 2], half: f32) -> Self {
        let mut mesh = Mesh::new(Primitive::TriangleStrip);
        for _ in 0..4 {
            mesh.vertex2(0.0, 0.0).color(1.0, 1.0, 1.0, 1.0);
        }
        let mut spark = Self {
            mesh: VaoMesh::new(mesh),
            center,
            half,
            age: 0.0,
        };
        spark.reshape();
        spark
    }

    fn reshape(&mut self) {
        let [cx, cy] = self.center;
        let h = self.half;
        let corners = [[-h, -h], [h, -h], [-h, h], [h, h]];

        let mesh = self.mesh.mesh_mut();
        for (p, [dx, dy]) in mesh.positions_mut().iter_mut().zip(corners) {
            *p = [cx + dx, cy + dy, 0.0];
        }

        let alpha = (self.half / 0.15).clamp(0.0, 1.0);
        let hue = self.age * 0.5;
        let rgb = [
            0.5 + 0.5 * (TAU * hue).cos(),
            0.5 + 0.5 * (TAU * (hue + 1.0 / 3.0)).cos(),
            0.5 + 0.5 * (TAU * (hue + 2.0 / 3.0)).cos(),
        ];
        for c in mesh.colors_mut().iter_mut() {
            *c = [rgb[0], rgb[1], rgb[2], alpha];
        }
    }
}

impl<B: GpuBinding> Voice<B> for Spark {
    fn init(&mut self, gpu: &mut B) -> Result<(), MeshError> {
        self.mesh.update(gpu)
    }

    fn update(&mut self, dt: Sec) {
        self.age += dt as f32;
        self.half -= Self::SHRINK * self.half * dt as f32 + 0.02 * dt as f32;
        self.reshape();
    }

    fn on_process(&mut self, gpu: &mut B) -> Result<(), MeshError> {
        self.mesh.update(gpu)?;
        self.mesh.draw(gpu)
    }

    fn is_active(&self) -> bool {
        self.half > Self::MIN_HALF
    }

    fn release(&mut self, gpu: &mut B) {
        self.mesh.release(gpu);
    }
}

struct Studio {
    wave: VaoMesh,
    sparks: VoicePool<WgpuBinding>,
    since_spawn: Sec,
    since_stats: Sec,
    rng: u32,
}

impl Studio {
    fn new() -> Self {
        let mut mesh = Mesh::new(Primitive::LineStrip);
        for i in 0..WAVE_POINTS {
            let f = i as f32 / (WAVE_POINTS - 1) as f32;
            mesh.vertex2(2.0 * f - 1.0, 0.5 * (f * TAU).sin())
                .color(f, 0.6, 1.0 - f, 1.0);
        }

        Self {
            wave: VaoMesh::new(mesh),
            sparks: VoicePool::new(),
            since_spawn: 0.0,
            since_stats: 0.0,
            rng: 0x9E37_79B9,
        }
    }

    /// xorshift32 mapped to [-1, 1).
    fn noise(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    fn animate_wave(&mut self, t: Sec) {
        let phase = t as f32;
        for (i, p) in self.wave.mesh_mut().positions_mut().iter_mut().enumerate() {
            let f = i as f32 / (WAVE_POINTS - 1) as f32;
            p[1] = 0.5 * (f * TAU + phase).sin();
        }
    }

    fn spawn_spark(&mut self, binding: &mut WgpuBinding) {
        let center = [self.noise() * 0.8, self.noise() * 0.8];
        let half = 0.08 + 0.07 * self.noise().abs();
        if let Err(e) = self.sparks.spawn(Spark::new(center, half), binding) {
            log::warn!("spark not spawned: {e}");
        }
    }
}

impl App for Studio {
    fn on_create(&mut self, gpu: &mut Gpu<'_>) -> Result<()> {
        let mut t = Timer::new(true);
        self.wave.update(gpu.binding_mut())?;
        t.stop();
        t.log("wave upload");
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let dt = ctx.dt();

        self.since_spawn += dt;
        while self.since_spawn >= SPAWN_INTERVAL {
            self.since_spawn -= SPAWN_INTERVAL;
            self.spawn_spark(ctx.gpu.binding_mut());
        }

        self.since_stats += dt;
        if self.since_stats >= STATS_INTERVAL {
            self.since_stats = 0.0;
            let (buffers, arrays) = ctx.gpu.binding().live_resources();
            log::debug!(
                "frame {} fps {:.1} dll period {:.3} ms (ideal {:.3} ms) sparks {} buffers {} vaos {}",
                ctx.clock.frame(),
                ctx.clock.fps(),
                ctx.pacing.period_smoothed() * 1e3,
                ctx.pacing.period_ideal() * 1e3,
                self.sparks.len(),
                buffers,
                arrays
            );
        }

        self.animate_wave(ctx.clock.now());
        self.sparks.update(dt);

        let wave = &mut self.wave;
        let sparks = &mut self.sparks;
        let control = ctx.render(wgpu::Color::BLACK, |binding| {
            wave.update(binding)?;
            wave.draw(binding)?;
            sparks.process(binding)
        });

        self.sparks.reap(ctx.gpu.binding_mut());
        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "strand studio".to_string(),
        ..Default::default()
    };

    Runtime::run(config, GpuInit::default(), Studio::new())
}

use super::system::{system_time, Sec};

/// Source of wall-clock seconds for a [`Clock`].
pub trait TimeSource {
    fn now(&self) -> Sec;
}

/// The system wall clock.
#[derive(Debug, Copy, Clone, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    #[inline]
    fn now(&self) -> Sec {
        system_time()
    }
}

/// How a [`Clock`] advances on `update`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum ClockMode {
    /// Follows the time source.
    #[default]
    Realtime,
    /// Advances by a fixed step per update, independent of the time source.
    Fixed { dt: Sec },
}

/// Step used when a realtime clock is created without one.
const DEFAULT_DT: Sec = 1.0 / 30.0;

/// Smoothing applied to the realtime fps estimate.
const FPS_SMOOTHING: f64 = 0.1;

/// Logical time that is either locked to realtime or driven in fixed steps.
///
/// Switching modes keeps `now` continuous: [`use_rt`](Self::use_rt) re-anchors
/// the reference so the next realtime reading continues from the current
/// logical time.
#[derive(Debug, Clone)]
pub struct Clock<S: TimeSource = WallClock> {
    source: S,
    now: Sec,
    reference: Sec,
    dt: Sec,
    fps: f64,
    frame: u64,
    realtime: bool,
}

impl Clock<WallClock> {
    /// Creates a clock in realtime (`true`) or fixed-step (`false`) mode.
    pub fn new(realtime: bool) -> Self {
        Self::with_source(WallClock, realtime, DEFAULT_DT)
    }

    /// Creates a fixed-step clock advancing `dt` seconds per update.
    pub fn fixed(dt: Sec) -> Self {
        Self::with_source(WallClock, false, dt)
    }

    pub fn from_mode(mode: ClockMode) -> Self {
        match mode {
            ClockMode::Realtime => Self::new(true),
            ClockMode::Fixed { dt } => Self::fixed(dt),
        }
    }
}

impl Default for Clock<WallClock> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<S: TimeSource> Clock<S> {
    pub fn with_source(source: S, realtime: bool, dt: Sec) -> Self {
        let reference = source.now();
        Self {
            source,
            now: 0.0,
            reference,
            dt,
            fps: 1.0 / dt,
            frame: 0,
            realtime,
        }
    }

    /// Current logical time in seconds.
    #[inline]
    pub fn now(&self) -> Sec {
        self.now
    }

    #[inline]
    pub fn dt(&self) -> Sec {
        self.dt
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of updates so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    pub fn mode(&self) -> ClockMode {
        if self.realtime {
            ClockMode::Realtime
        } else {
            ClockMode::Fixed { dt: self.dt }
        }
    }

    /// Advances the clock one frame and returns the new `now`.
    pub fn update(&mut self) -> Sec {
        if self.realtime {
            let t = self.source.now() - self.reference;
            self.dt = t - self.now;
            self.now = t;
            self.frame += 1;
            if self.dt > 0.0 {
                self.fps += FPS_SMOOTHING * (1.0 / self.dt - self.fps);
            }
        } else {
            self.now += self.dt;
            self.frame += 1;
            self.fps = 1.0 / self.dt;
        }
        self.now
    }

    /// Sets the step, then advances. In realtime mode the step is overwritten
    /// by the measured delta.
    pub fn update_with(&mut self, dt: Sec) -> Sec {
        self.dt = dt;
        self.update()
    }

    /// Switches to realtime mode without a jump in `now`.
    pub fn use_rt(&mut self) {
        if !self.realtime {
            self.reference = self.source.now() - self.now;
        }
        self.realtime = true;
    }

    /// Switches to fixed-step mode with step `dt`.
    pub fn use_nrt(&mut self, dt: Sec) {
        self.dt = dt;
        self.realtime = false;
    }
}

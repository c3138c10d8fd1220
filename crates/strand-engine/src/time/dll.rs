use std::f64::consts::{PI, SQRT_2};

use super::system::Sec;

/// Second-order delay-locked loop for a periodic realtime source.
///
/// Feed it the measured timestamp of every event with [`step`](Self::step).
/// It keeps a filtered timestamp of the current event (`t0`), a projection of
/// the next one (`t1`) and a smoothed period (`t2`), following drift while
/// rejecting jitter. See F. Adriaensen, "Using a DLL to filter time" (2005).
///
/// Larger bandwidths track changes faster but smooth less.
#[derive(Debug, Clone)]
pub struct DelayLockedLoop {
    period: Sec,
    bandwidth: f64,
    t0: Sec,
    t1: Sec,
    t2: Sec,
    b: f64,
    c: f64,
    reset: bool,
}

impl DelayLockedLoop {
    pub const DEFAULT_BANDWIDTH: f64 = 0.5;

    /// Creates a loop expecting one event every `period` seconds.
    pub fn new(period: Sec) -> Self {
        Self::with_bandwidth(period, Self::DEFAULT_BANDWIDTH)
    }

    /// `bandwidth` is in Hz.
    pub fn with_bandwidth(period: Sec, bandwidth: f64) -> Self {
        debug_assert!(period > 0.0, "DLL period must be positive");
        let mut dll = Self {
            period,
            bandwidth,
            t0: 0.0,
            t1: period,
            t2: period,
            b: 0.0,
            c: 0.0,
            reset: true,
        };
        dll.set_bandwidth(bandwidth);
        dll
    }

    /// Recomputes the loop weights for a new bandwidth.
    ///
    /// With `ω = 2π·B·T`, the critically damped weights are `b = √2·ω` and
    /// `c = ω²`.
    pub fn set_bandwidth(&mut self, bandwidth: f64) {
        let omega = 2.0 * PI * bandwidth * self.period;
        self.bandwidth = bandwidth;
        self.b = SQRT_2 * omega;
        self.c = omega * omega;
    }

    #[inline]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Arms a re-initialization consumed by the next `step`.
    ///
    /// Call after any discontinuity in the source (e.g. an audio xrun).
    pub fn reset(&mut self) {
        self.reset = true;
    }

    /// Feeds the timestamp of the latest event.
    pub fn step(&mut self, realtime: Sec) {
        if self.reset {
            self.t2 = self.period;
            self.t0 = realtime;
            self.t1 = realtime + self.period;
            self.reset = false;
        } else {
            let err = realtime - self.t1;
            self.t0 = self.t1;
            self.t1 += self.b * err + self.t2;
            self.t2 += self.c * err;
        }
    }

    /// Filtered timestamp of the current event.
    #[inline]
    pub fn current(&self) -> Sec {
        self.t0
    }

    /// Projected timestamp of the next event.
    #[inline]
    pub fn next(&self) -> Sec {
        self.t1
    }

    #[inline]
    pub fn period_smoothed(&self) -> Sec {
        self.t2
    }

    #[inline]
    pub fn rate_smoothed(&self) -> f64 {
        1.0 / self.t2
    }

    #[inline]
    pub fn period_ideal(&self) -> Sec {
        self.period
    }

    #[inline]
    pub fn rate_ideal(&self) -> f64 {
        1.0 / self.period
    }

    /// Realtime estimate at fraction `alpha` of the way from the current event
    /// to the projected next one. `alpha` outside `[0, 1]` extrapolates.
    #[inline]
    pub fn realtime_interp(&self, alpha: f64) -> Sec {
        self.t0 + alpha * (self.t1 - self.t0)
    }
}

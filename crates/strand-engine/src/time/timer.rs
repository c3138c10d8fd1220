use std::fmt;

use super::system::{steady_time_nsec, Nsec, Sec, NS_TO_S};

/// Stopwatch over the steady clock.
///
/// Holds two timestamps; `elapsed` is meaningful once both `start` and `stop`
/// have been called.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Timer {
    start: Nsec,
    stop: Nsec,
}

impl Timer {
    /// Creates a timer, optionally capturing the start time right away.
    pub fn new(start_now: bool) -> Self {
        let mut t = Self::default();
        if start_now {
            t.start();
        }
        t
    }

    pub fn start(&mut self) {
        self.start = steady_time_nsec();
    }

    pub fn stop(&mut self) {
        self.stop = steady_time_nsec();
    }

    /// Nanoseconds between the last `start` and `stop`.
    #[inline]
    pub fn elapsed(&self) -> Nsec {
        self.stop - self.start
    }

    /// Seconds between the last `start` and `stop`.
    #[inline]
    pub fn elapsed_sec(&self) -> Sec {
        self.elapsed() as Sec * NS_TO_S
    }

    /// Logs the elapsed time at info level.
    pub fn log(&self, label: &str) {
        log::info!("{label}: {self}");
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} sec", self.elapsed_sec())
    }
}

//! Time subsystem.
//!
//! - `system`: wall/steady clock readings, sleeping, timecode formatting
//! - `Timer`: stopwatch for measuring spans
//! - `Clock`: per-loop logical time, realtime-locked or fixed-step
//! - `DelayLockedLoop`: smooths timestamps of a periodic source (audio callbacks,
//!   vsync) against jitter and drift
//!
//! Everything here is a plain value type with no internal synchronization.

mod clock;
mod dll;
mod system;
mod timer;

pub use clock::{Clock, ClockMode, TimeSource, WallClock};
pub use dll::DelayLockedLoop;
pub use system::{
    reset_steady_clock, sleep, sleep_nsec, sleep_until, start_steady_clock, steady_time,
    steady_time_nsec, system_time, system_time_nsec, to_timecode, Nsec, Sec, DEFAULT_TIMECODE,
    NS_TO_S, S_TO_NS,
};
pub use timer::Timer;

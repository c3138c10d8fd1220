use std::fmt::Write as _;
use std::sync::RwLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Seconds.
pub type Sec = f64;

/// Nanoseconds (covers roughly ±292 years).
pub type Nsec = i64;

pub const NS_TO_S: f64 = 1.0e-9;
pub const S_TO_NS: f64 = 1.0e9;

/// Default layout for [`to_timecode`].
pub const DEFAULT_TIMECODE: &str = "D:H:M:S:m:u";

static STEADY_ORIGIN: RwLock<Option<Instant>> = RwLock::new(None);

/// Wall-clock time since the UNIX epoch, in seconds.
pub fn system_time() -> Sec {
    system_time_nsec() as Sec * NS_TO_S
}

/// Wall-clock time since the UNIX epoch, in nanoseconds.
///
/// A clock set before the epoch yields a negative value.
pub fn system_time_nsec() -> Nsec {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => duration_to_nsec(d),
        Err(e) => -duration_to_nsec(e.duration()),
    }
}

/// Anchors the steady clock if it is not anchored yet.
pub fn start_steady_clock() {
    let mut origin = STEADY_ORIGIN.write().unwrap_or_else(|e| e.into_inner());
    if origin.is_none() {
        *origin = Some(Instant::now());
    }
}

/// Re-anchors the steady clock at the current instant.
pub fn reset_steady_clock() {
    let mut origin = STEADY_ORIGIN.write().unwrap_or_else(|e| e.into_inner());
    *origin = Some(Instant::now());
}

/// Monotonic seconds since the steady clock was anchored.
pub fn steady_time() -> Sec {
    steady_time_nsec() as Sec * NS_TO_S
}

/// Monotonic nanoseconds since the steady clock was anchored.
///
/// The first call anchors the clock implicitly.
pub fn steady_time_nsec() -> Nsec {
    let origin = {
        let guard = STEADY_ORIGIN.read().unwrap_or_else(|e| e.into_inner());
        *guard
    };
    match origin {
        Some(o) => duration_to_nsec(o.elapsed()),
        None => {
            start_steady_clock();
            steady_time_nsec()
        }
    }
}

/// Blocks the calling thread for `dt` seconds. Non-positive values return at once.
pub fn sleep(dt: Sec) {
    if let Some(d) = sleep_duration(dt) {
        std::thread::sleep(d);
    }
}

/// `dt` as a `Duration`, saturating at `Duration::MAX`. `None` for
/// non-positive or NaN spans.
fn sleep_duration(dt: Sec) -> Option<Duration> {
    if dt.is_nan() || dt <= 0.0 {
        return None;
    }
    Some(Duration::try_from_secs_f64(dt).unwrap_or(Duration::MAX))
}

pub fn sleep_nsec(dt: Nsec) {
    if dt > 0 {
        std::thread::sleep(Duration::from_nanos(dt as u64));
    }
}

/// Sleeps until the wall clock reaches `target` seconds. Past targets return at once.
pub fn sleep_until(target: Sec) {
    sleep(target - system_time());
}

/// Formats a nanosecond span.
///
/// Tokens: `D` days, `H` hours, `M` minutes, `S` seconds, `m` milliseconds,
/// `u` microseconds. Every other character is copied as-is. Hours, minutes and
/// seconds are two digits wide; milli- and microseconds three. Negative spans
/// are prefixed with `-`.
pub fn to_timecode(t: Nsec, format: &str) -> String {
    let negative = t < 0;
    let t = t.unsigned_abs();
    let sec = t / 1_000_000_000;

    let days = sec / 86_400;
    let hours = (sec / 3_600) % 24;
    let minutes = (sec / 60) % 60;
    let seconds = sec % 60;
    let millis = (t / 1_000_000) % 1_000;
    let micros = (t / 1_000) % 1_000;

    let mut out = String::with_capacity(format.len() * 2 + 1);
    if negative {
        out.push('-');
    }
    for c in format.chars() {
        // Writing to a String cannot fail.
        let _ = match c {
            'D' => write!(out, "{days}"),
            'H' => write!(out, "{hours:02}"),
            'M' => write!(out, "{minutes:02}"),
            'S' => write!(out, "{seconds:02}"),
            'm' => write!(out, "{millis:03}"),
            'u' => write!(out, "{micros:03}"),
            other => {
                out.push(other);
                Ok(())
            }
        };
    }
    out
}

fn duration_to_nsec(d: Duration) -> Nsec {
    Nsec::try_from(d.as_nanos()).unwrap_or(Nsec::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecode_default_layout() {
        // 1 day, 2 h, 3 min, 4 s, 5 ms, 6 us
        let t: Nsec = (((86_400_i64 + 2 * 3_600 + 3 * 60 + 4) * 1_000 + 5) * 1_000 + 6) * 1_000;
        assert_eq!(to_timecode(t, DEFAULT_TIMECODE), "1:02:03:04:005:006");
    }

    #[test]
    fn timecode_copies_literals() {
        let t: Nsec = 61 * 1_000_000_000;
        assert_eq!(to_timecode(t, "M'S\""), "01'01\"");
    }

    #[test]
    fn negative_timecode_keeps_sign() {
        let t: Nsec = -61 * 1_000_000_000;
        assert_eq!(to_timecode(t, "M:S"), "-01:01");
        assert_eq!(to_timecode(-t, "M:S"), "01:01");
        assert_eq!(to_timecode(Nsec::MIN, "D").chars().next(), Some('-'));
    }

    #[test]
    fn steady_clock_is_monotonic() {
        let a = steady_time_nsec();
        let b = steady_time_nsec();
        assert!(b >= a);
        assert!(a >= 0);
    }

    #[test]
    fn system_time_is_after_2020() {
        assert!(system_time() > 1_577_836_800.0);
    }

    #[test]
    fn sleep_ignores_negative() {
        let t = Instant::now();
        sleep(-1.0);
        sleep_nsec(-5);
        sleep_until(system_time() - 10.0);
        assert!(t.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn huge_sleeps_saturate() {
        assert_eq!(sleep_duration(1.0e20), Some(Duration::MAX));
        assert_eq!(sleep_duration(f64::MAX), Some(Duration::MAX));
        assert_eq!(sleep_duration(0.5), Some(Duration::from_millis(500)));
        assert_eq!(sleep_duration(0.0), None);
        assert_eq!(sleep_duration(-3.0), None);
        assert_eq!(sleep_duration(f64::NAN), None);
    }
}

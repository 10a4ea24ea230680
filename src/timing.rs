//! Wall-clock timing for harness runs.

use std::fmt;
use std::time::{Duration, Instant};

/// Start time of a run, passed explicitly to whoever reports on it.
#[derive(Clone, Copy, Debug)]
pub struct RunClock {
    started: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Whole seconds of a duration displayed as `h:m:s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoursMinutesSeconds(pub u64);

impl From<Duration> for HoursMinutesSeconds {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs())
    }
}

impl fmt::Display for HoursMinutesSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0;
        write!(
            f,
            "{}:{}:{}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        let elapsed = HoursMinutesSeconds::from(Duration::from_secs(3 * 3600 + 7 * 60 + 42));
        assert_eq!(elapsed.to_string(), "3:7:42");
        assert_eq!(HoursMinutesSeconds(59).to_string(), "0:0:59");
    }
}

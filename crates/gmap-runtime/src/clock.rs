#![forbid(unsafe_code)]

use core::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Deterministic clock controlled by the host.
///
/// Monotonic time starts at zero and only moves when the host says so.
/// Wall time is `epoch + monotonic`, used for "active in the last 24 h"
/// checks and export dates.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
    epoch: DateTime<Utc>,
}

impl DeterministicClock {
    /// Create a clock at `0` with the Unix epoch as wall origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock whose monotonic zero corresponds to `epoch`.
    #[must_use]
    pub fn with_epoch(epoch: DateTime<Utc>) -> Self {
        Self {
            now: Duration::ZERO,
            epoch,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Re-anchor wall time without touching monotonic time.
    pub fn set_epoch(&mut self, epoch: DateTime<Utc>) {
        self.epoch = epoch;
    }

    #[inline]
    pub fn now_mono(&self) -> Duration {
        self.now
    }

    /// Wall-clock time; saturates at the largest representable instant.
    pub fn now_utc(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.now)
            .ok()
            .and_then(|dt| self.epoch.checked_add_signed(dt))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn advance_moves_both_clocks() {
        let epoch = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let mut clock = DeterministicClock::with_epoch(epoch);
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now_mono(), Duration::from_secs(90));
        assert_eq!(clock.now_utc(), epoch + TimeDelta::seconds(90));
    }

    #[test]
    fn set_is_absolute() {
        let mut clock = DeterministicClock::new();
        clock.advance(Duration::from_secs(5));
        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now_mono(), Duration::from_secs(1));
    }

    #[test]
    fn advance_saturates() {
        let mut clock = DeterministicClock::new();
        clock.set(Duration::MAX);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now_mono(), Duration::MAX);
        assert_eq!(clock.now_utc(), DateTime::<Utc>::MAX_UTC);
    }
}

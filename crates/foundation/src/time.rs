use std::time::Duration;

/// Monotonic timestamp in seconds.
///
/// Interaction timing (debouncing, quiescence windows) is driven by values of
/// this type supplied by the host, never by reading a wall clock, so it can be
/// recorded and replayed.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn after(self, d: Duration) -> Self {
        Time(self.0 + d.as_secs_f64())
    }

    /// Elapsed time from `earlier` to `self`, saturating at zero.
    pub fn since(self, earlier: Time) -> Duration {
        Duration::from_secs_f64((self.0 - earlier.0).max(0.0))
    }
}

use std::time::Duration;

use foundation::time::Time;

/// Trailing-edge coalescing of repeated triggers.
///
/// Each `schedule` replaces the pending value and restarts the quiescence
/// window; `poll` yields the value once the window has elapsed with no further
/// triggers. `cancel` drops pending work so teardown never fires stale calls.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Time, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn schedule(&mut self, now: Time, value: T) {
        self.pending = Some((now.after(self.window), value));
    }

    /// Returns the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|(d, _)| *d)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

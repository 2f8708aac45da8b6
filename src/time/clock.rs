//! Rebaseable monotonic millisecond clock.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic millisecond counter with an explicit rebase.
///
/// `now()` never decreases between two calls unless [`Clock::rebase`] runs
/// in between. A rebase is a deliberate discontinuity: it is used by tests
/// and by peers that agree on a shared clock epoch. Because it takes
/// `&mut self`, a rebase cannot race with concurrent readers.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Instant at which `base` was the reading.
    origin: Instant,
    /// Reading at `origin`, in milliseconds.
    base: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Create a clock that reads wall-clock milliseconds since the Unix
    /// epoch now, then advances monotonically.
    pub fn new() -> Self {
        Self::with_base(wall_clock_ms())
    }

    /// Create a clock that reads `base` milliseconds now.
    pub fn with_base(base: u64) -> Self {
        Self {
            origin: Instant::now(),
            base,
        }
    }

    /// Current reading in milliseconds.
    pub fn now(&self) -> u64 {
        self.base
            .saturating_add(self.origin.elapsed().as_millis() as u64)
    }

    /// Rebase so that an immediately following `now()` returns `new_base`.
    pub fn rebase(&mut self, new_base: u64) {
        self.origin = Instant::now();
        self.base = new_base;
        tracing::trace!(base = new_base, "clock rebased");
    }

    /// Milliseconds between an earlier reading and now, zero if `earlier` is
    /// ahead (e.g. taken before a rebase to a smaller base).
    pub fn elapsed_since(&self, earlier: u64) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_millis() as u64)
        .unwrap_or_default()
}

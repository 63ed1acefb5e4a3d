//! Countdown timer over the monotonic clock.
//!
//! All state logic goes through the `*_at` variants so tests can drive the
//! clock explicitly; the plain accessors sample `Instant::now()`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    duration: Duration,
    started_at: Option<Instant>,
}

impl Timer {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
        }
    }

    /// Restart the countdown from `now`, reusing the stored duration.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    /// Restart the countdown from `now` with a new duration.
    pub fn start_with(&mut self, duration: Duration, now: Instant) {
        self.duration = duration;
        self.start(now);
    }

    /// Clear the start instant; a stopped timer reports as finished.
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    #[must_use]
    pub const fn started(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Seconds left on the countdown as of `now`; negative once expired.
    /// A timer that was never started (or was stopped) is treated as long
    /// since expired.
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> f64 {
        match self.started_at {
            Some(start) => {
                self.duration.as_secs_f64() - now.saturating_duration_since(start).as_secs_f64()
            }
            None => f64::NEG_INFINITY,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.remaining_at(Instant::now())
    }

    #[must_use]
    pub fn finished_at(&self, now: Instant) -> bool {
        self.remaining_at(now) <= 0.0
    }

    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished_at(Instant::now())
    }
}

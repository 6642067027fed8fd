//! # Frame Clock
//!
//! Integer millisecond delta times without cumulative drift.
//!
//! ## The Problem
//!
//! ```text
//! elapsed = 16_600_000ns  ->  delta = 16ms  (0.6ms lost)
//! x 1000 frames           ->  600ms of game time lost
//! ```
//!
//! ## The Solution
//!
//! The sub-millisecond remainder is carried into the next frame by moving
//! the baseline to `now - remainder` instead of `now`. The sum of reported
//! deltas then never trails wall time by more than 1ms.

use std::time::Instant;

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Monotonic timestamp source.
pub trait ClockSource: Send + Sync {
    /// Current monotonic time in nanoseconds.
    fn now_nanos(&self) -> u64;
}

/// [`ClockSource`] backed by [`Instant`].
///
/// Timestamps are relative to construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose zero is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for MonotonicClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Delta-time calculator with remainder carry.
///
/// Owned by a single driver, never shared.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    /// Baseline of the next delta. `None` until the first tick.
    last_nanos: Option<u64>,
}

impl FrameClock {
    /// Creates a clock without a baseline; the first tick returns 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_nanos: None }
    }

    /// Creates a clock whose baseline is `now_nanos`.
    #[must_use]
    pub const fn starting_at(now_nanos: u64) -> Self {
        Self {
            last_nanos: Some(now_nanos),
        }
    }

    /// Returns whole milliseconds since the previous tick.
    ///
    /// A timestamp before the baseline returns 0 and leaves the baseline
    /// untouched.
    pub fn tick(&mut self, now_nanos: u64) -> u64 {
        let Some(last) = self.last_nanos else {
            self.last_nanos = Some(now_nanos);
            return 0;
        };

        if now_nanos < last {
            return 0;
        }

        let elapsed = now_nanos - last;
        let delta_ms = elapsed / NANOS_PER_MILLI;
        // Keep the lost fraction for the next frame
        self.last_nanos = Some(now_nanos - (elapsed - delta_ms * NANOS_PER_MILLI));
        delta_ms
    }

    /// Current baseline, if any.
    #[inline]
    #[must_use]
    pub const fn baseline(&self) -> Option<u64> {
        self.last_nanos
    }
}

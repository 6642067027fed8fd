//! # Pacing Controller
//!
//! Decides how long the render thread suspends after a frame.
//!
//! ```text
//! |<------------- target period ------------->|
//! |<--- frame work --->|<------ sleep ------->|
//! ```
//!
//! A frame that overruns its budget is not an error. It is counted and
//! logged, and the loop moves straight on to the next iteration.

use std::time::Duration;

/// Sleep for the next iteration, in milliseconds.
///
/// Returns 0 without a target period. A negative value is an overrun.
#[inline]
#[must_use]
pub fn compute_sleep(target_period_ms: Option<u64>, frame_work_ms: u64) -> i64 {
    match target_period_ms {
        None => 0,
        Some(period) => period as i64 - frame_work_ms as i64,
    }
}

/// What the loop does after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingDecision {
    /// No target period: start the next iteration at once.
    Uncapped,
    /// Suspend for this long.
    Sleep(Duration),
    /// Frame work used the whole budget exactly.
    OnTime,
    /// Frame work exceeded the budget.
    Overrun {
        /// Milliseconds over budget.
        by_ms: u64,
    },
}

/// Pacing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacingStats {
    /// Frames passed through the controller.
    pub frames_paced: u64,
    /// Frames that exceeded the budget.
    pub overruns: u64,
    /// Worst overrun observed.
    pub worst_overrun_ms: u64,
    /// Sum of requested sleeps.
    pub total_sleep_ms: u64,
}

impl PacingStats {
    /// Fraction of paced frames that overran.
    #[must_use]
    pub fn overrun_ratio(&self) -> f64 {
        if self.frames_paced == 0 {
            return 0.0;
        }
        self.overruns as f64 / self.frames_paced as f64
    }
}

/// Turns frame work durations into pacing decisions.
#[derive(Clone, Debug)]
pub struct PacingController {
    target_period_ms: Option<u64>,
    overrun_warn_ms: u64,
    stats: PacingStats,
}

impl PacingController {
    /// Creates a controller. `None` disables pacing.
    #[must_use]
    pub fn new(target_period_ms: Option<u64>, overrun_warn_ms: u64) -> Self {
        Self {
            target_period_ms,
            overrun_warn_ms,
            stats: PacingStats::default(),
        }
    }

    /// Decides the suspension after a frame that took `frame_work_ms`.
    pub fn pace(&mut self, frame_work_ms: u64) -> PacingDecision {
        self.stats.frames_paced += 1;

        if self.target_period_ms.is_none() {
            return PacingDecision::Uncapped;
        }

        let sleep_ms = compute_sleep(self.target_period_ms, frame_work_ms);
        match sleep_ms {
            0 => PacingDecision::OnTime,
            ms if ms > 0 => {
                self.stats.total_sleep_ms += ms as u64;
                PacingDecision::Sleep(Duration::from_millis(ms as u64))
            }
            ms => {
                let by_ms = ms.unsigned_abs();
                self.stats.overruns += 1;
                self.stats.worst_overrun_ms = self.stats.worst_overrun_ms.max(by_ms);

                if by_ms > self.overrun_warn_ms {
                    tracing::warn!(
                        frame_work_ms,
                        over_by_ms = by_ms,
                        target_period_ms = ?self.target_period_ms,
                        "frame exceeded budget"
                    );
                } else {
                    tracing::debug!(frame_work_ms, over_by_ms = by_ms, "frame exceeded budget");
                }
                PacingDecision::Overrun { by_ms }
            }
        }
    }

    /// Configured target period.
    #[inline]
    #[must_use]
    pub const fn target_period_ms(&self) -> Option<u64> {
        self.target_period_ms
    }

    /// Accumulated statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &PacingStats {
        &self.stats
    }
}

//! Surface readiness gate.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// "The drawing target is currently valid and lockable."
///
/// Single writer (surface callbacks on the UI thread), single reader (the
/// active render thread). Outlives every loop instance.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: AtomicBool,
    /// Number of ready/not-ready transitions, for diagnostics.
    transitions: AtomicU64,
}

impl ReadinessGate {
    /// Creates a gate in the not-ready state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            transitions: AtomicU64::new(0),
        }
    }

    /// Surface created: drawing targets may be locked.
    pub fn set_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            self.transitions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Surface destroyed (or about to be): stop locking.
    pub fn set_not_ready(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            self.transitions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Polled once per loop iteration.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Number of state changes since creation.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions.load(Ordering::Relaxed)
    }
}

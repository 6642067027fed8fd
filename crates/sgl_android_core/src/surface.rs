//! # Surface Event Bridge
//!
//! Translates surface creation/destruction into gate transitions and loop
//! shutdown.
//!
//! ```text
//! UI thread                              render thread
//! ─────────                              ─────────────
//! on_surface_destroyed
//!   gate := not ready        ─────────>  next iteration skips the draw
//!   stop all instances       ─────────>  sleep interrupted, loop exits
//!   join all instances       <─────────  thread ends
//! return (surface may be freed now)
//! ```
//!
//! Destruction is the one place that blocks: the platform frees the surface
//! as soon as the callback returns, so no render thread may outlive it.

use std::sync::Arc;

use crate::lifecycle::LoopControl;
use crate::sync::ReadinessGate;

/// Receives surface lifecycle callbacks on the UI thread.
pub struct SurfaceEventBridge<L> {
    gate: Arc<ReadinessGate>,
    loops: Arc<L>,
}

impl<L: LoopControl> SurfaceEventBridge<L> {
    /// Creates a bridge over `gate` controlling `loops`.
    #[must_use]
    pub fn new(gate: Arc<ReadinessGate>, loops: Arc<L>) -> Self {
        Self { gate, loops }
    }

    /// The surface exists and can be locked.
    pub fn on_surface_created(&self) {
        self.gate.set_ready();
        tracing::info!("surface created");
    }

    /// The surface is about to be destroyed.
    ///
    /// Returns only after every render thread has ended. Returns the
    /// number of threads joined.
    pub fn on_surface_destroyed(&self) -> usize {
        self.gate.set_not_ready();
        let joined = self.loops.stop_and_join();
        tracing::info!(joined, "surface destroyed, render threads joined");
        joined
    }

    /// Whether the surface is currently usable.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }
}

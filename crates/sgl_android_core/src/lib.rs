//! # SGL Android Core
//!
//! Game loop and surface lifecycle synchronization for the SGL Android
//! adapter. Platform-free: the surface and the engine are traits.
//!
//! ## Threads
//!
//! ```text
//! UI thread                                 render thread (one per foreground)
//! ─────────                                 ──────────────────────────────────
//! on_foreground   -> spawn driver  ───────> loop {
//! on_background   -> stop (no wait)           gate ready? lock, update, release
//! surface created -> gate ready               pace (interruptible sleep)
//! surface destroy -> gate not ready,        }
//!                    stop, JOIN     <─────── exit
//! ```
//!
//! ## Guarantees
//!
//! 1. **No drawing without a surface** - the gate is checked every iteration
//!    and closed before teardown waits for the render thread
//! 2. **Balanced locks** - every locked target is released exactly once,
//!    including when the engine fails or panics
//! 3. **Blocking teardown** - surface destruction returns only after every
//!    render thread has ended
//! 4. **Drift-free time** - reported deltas track wall time within 1ms
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sgl_android_core::{LifecycleCoordinator, LoopConfig, LoopShared, SurfaceEventBridge};
//!
//! let shared = LoopShared::new(my_game, my_surface);
//! let gate = Arc::clone(&shared.gate);
//! let loops = Arc::new(LifecycleCoordinator::new(LoopConfig::default(), shared)?);
//! let surface = SurfaceEventBridge::new(gate, Arc::clone(&loops));
//!
//! loops.on_foreground()?;
//! surface.on_surface_created();
//! // ...
//! surface.on_surface_destroyed(); // render thread is gone here
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod pacing;
pub mod surface;
pub mod sync;

pub use clock::{ClockSource, FrameClock, MonotonicClock, NANOS_PER_MILLI};
pub use config::{LoopConfig, DEFAULT_FRAME_PERIOD_MS, DEFAULT_OVERRUN_WARN_MS, DEFAULT_THREAD_NAME};
pub use driver::{
    DriverHandle, DriverReport, DriverState, DriverStats, FrameOutcome, LoopExit, LoopShared,
    RenderCycleDriver,
};
pub use engine::{GameApp, SurfaceProvider, TargetGuard};
pub use error::{ConfigError, EngineError, EngineResult, LoopError, LoopResult, SurfaceError};
pub use lifecycle::{LifecycleCoordinator, LoopControl};
pub use pacing::{compute_sleep, PacingController, PacingDecision, PacingStats};
pub use surface::SurfaceEventBridge;
pub use sync::{ReadinessGate, RunToken, SleepOutcome};

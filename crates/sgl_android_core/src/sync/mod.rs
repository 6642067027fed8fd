//! # Cross-Thread Signals
//!
//! The only shared state between the UI thread and the render thread.
//!
//! ## The Problem
//!
//! ```text
//! UI thread:      surfaceCreated / surfaceDestroyed / onPause
//! Render thread:  "may I lock the surface?" / "should I keep going?"
//!
//! Plain bool:     stale reads -> drawing on a destroyed surface
//! Mutex<bool>:    lock on every iteration for a single bit
//! ```
//!
//! ## The Solution
//!
//! ```text
//! ReadinessGate   AtomicBool, written by surface callbacks, polled per iteration
//! RunToken        AtomicBool + Condvar, stop request wakes a sleeping loop
//! ```
//!
//! Neither signal blocks its writer. Waiting for the render thread to be
//! gone is done by joining it, not by these signals.

mod readiness;
mod run_token;

pub use readiness::ReadinessGate;
pub use run_token::{RunToken, SleepOutcome};

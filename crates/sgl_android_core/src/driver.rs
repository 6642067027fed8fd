//! # Render Cycle Driver
//!
//! The game loop. One driver per foreground session, on its own thread.
//!
//! ## Iteration
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 0. token stopped?            -> exit (Stopped)                      │
//! │ 1. record iteration start                                           │
//! │ 2. gate not ready?           -> skip to 5                           │
//! │ 3a. first ready frame?       -> push starting screen if stack empty │
//! │ 3b. try_lock target          -> Ok(None): skip to 5                 │
//! │ 3c. tick clock, update(delta, target), release exactly once         │
//! │ 4. frame work = now - start                                         │
//! │ 5. pace: sleep (interruptible by stop), or go again at once         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## States
//!
//! ```text
//! NotStarted ──run()──> Running ──stop / failure──> Stopped (terminal)
//! ```
//!
//! An engine or fatal surface failure ends the instance after the drawing
//! target has been released. It is never retried mid-frame. A panic in the
//! engine ends the instance the same way, as [`LoopExit::Panicked`].

use std::any::Any;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::clock::{ClockSource, FrameClock, MonotonicClock, NANOS_PER_MILLI};
use crate::config::LoopConfig;
use crate::engine::{GameApp, SurfaceProvider, TargetGuard};
use crate::error::{EngineError, LoopResult, SurfaceError};
use crate::pacing::{PacingController, PacingDecision, PacingStats};
use crate::sync::{ReadinessGate, RunToken, SleepOutcome};

/// Lifecycle state of a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DriverState {
    /// Constructed, `run` not called yet.
    NotStarted = 0,
    /// Iterating.
    Running = 1,
    /// Left the loop. Terminal.
    Stopped = 2,
}

impl DriverState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Driver state readable from other threads.
#[derive(Clone, Debug)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(DriverState::NotStarted as u8)))
    }

    fn get(&self) -> DriverState {
        DriverState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: DriverState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// What happened to the draw step of one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The engine updated and the frame was posted.
    Rendered {
        /// Delta time handed to the engine.
        delta_ms: u64,
    },
    /// The surface was not ready; nothing was locked.
    NotReady,
    /// The surface was ready but the lock came back empty.
    TargetUnavailable,
}

/// Why a loop instance ended.
#[derive(Debug)]
pub enum LoopExit {
    /// Stop requested by the owner.
    Stopped,
    /// The engine failed; its state may be inconsistent.
    EngineFailure(EngineError),
    /// The surface failed in a non-transient way.
    SurfaceFailure(SurfaceError),
    /// The render thread panicked. Carries the panic message.
    Panicked(String),
}

impl LoopExit {
    /// Whether the instance ended on a failure rather than a stop request.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Counters of one loop instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Iterations started.
    pub iterations: u64,
    /// Frames the engine updated successfully.
    pub frames_rendered: u64,
    /// Iterations skipped because the gate was closed.
    pub skipped_not_ready: u64,
    /// Iterations skipped because the lock came back empty.
    pub skipped_unavailable: u64,
    /// Successful target locks.
    pub locks_acquired: u64,
    /// Target releases. Equals `locks_acquired` between iterations.
    pub releases: u64,
    /// Starting screens pushed (0 or 1).
    pub initializations: u64,
    /// Pacing counters.
    pub pacing: PacingStats,
}

/// Final report of a loop instance, returned by its thread.
#[derive(Debug)]
pub struct DriverReport {
    /// Instance number.
    pub instance: u64,
    /// Why the loop ended.
    pub exit: LoopExit,
    /// Counters at exit.
    pub stats: DriverStats,
}

/// State shared by every loop instance of a host.
pub struct LoopShared<A, S, C = MonotonicClock> {
    /// Surface readiness, written by the surface callbacks.
    pub gate: Arc<ReadinessGate>,
    /// The engine. Locked for the draw step of each frame.
    pub app: Arc<Mutex<A>>,
    /// The drawing target provider.
    pub surface: Arc<S>,
    /// Timestamp source.
    pub clock: Arc<C>,
}

impl<A, S> LoopShared<A, S, MonotonicClock> {
    /// Bundles an engine and a surface with a fresh gate and clock.
    #[must_use]
    pub fn new(app: A, surface: S) -> Self {
        Self {
            gate: Arc::new(ReadinessGate::new()),
            app: Arc::new(Mutex::new(app)),
            surface: Arc::new(surface),
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

impl<A, S, C> Clone for LoopShared<A, S, C> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            app: Arc::clone(&self.app),
            surface: Arc::clone(&self.surface),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// The game loop of one foreground session.
pub struct RenderCycleDriver<A, S, C = MonotonicClock>
where
    S: SurfaceProvider,
{
    instance: u64,
    config: LoopConfig,
    token: RunToken,
    shared: LoopShared<A, S, C>,
    frame_clock: FrameClock,
    pacing: PacingController,
    /// Set once the starting screen question has been settled.
    initialized: bool,
    state: StateCell,
    stats: DriverStats,
}

impl<A, S, C> RenderCycleDriver<A, S, C>
where
    S: SurfaceProvider,
    A: GameApp<S::Target>,
    C: ClockSource,
{
    /// Creates a driver bound to `token`.
    #[must_use]
    pub fn new(instance: u64, config: LoopConfig, token: RunToken, shared: LoopShared<A, S, C>) -> Self {
        let pacing = PacingController::new(config.target_frame_period_ms, config.overrun_warn_ms);
        Self {
            instance,
            config,
            token,
            shared,
            frame_clock: FrameClock::new(),
            pacing,
            initialized: false,
            state: StateCell::new(),
            stats: DriverStats::default(),
        }
    }

    /// Instance number.
    #[inline]
    #[must_use]
    pub const fn instance(&self) -> u64 {
        self.instance
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state.get()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> DriverStats {
        DriverStats {
            pacing: *self.pacing.stats(),
            ..self.stats
        }
    }

    /// Steps 1 to 4 of an iteration: everything except pacing.
    ///
    /// # Errors
    ///
    /// Returns the exit reason on engine or fatal surface failure. The
    /// target, if locked, has been released by then.
    pub fn render_frame(&mut self) -> Result<FrameOutcome, LoopExit> {
        self.stats.iterations += 1;

        // The loop may start before the surface exists
        if !self.shared.gate.is_ready() {
            self.stats.skipped_not_ready += 1;
            tracing::trace!(instance = self.instance, "surface not ready");
            return Ok(FrameOutcome::NotReady);
        }

        let mut app = self.shared.app.lock();

        if !self.initialized {
            if app.is_screen_stack_empty() {
                app.push_starting_screen().map_err(LoopExit::EngineFailure)?;
                self.stats.initializations += 1;
                tracing::info!(instance = self.instance, "starting screen pushed");
            }
            self.initialized = true;
        }

        // The surface can go away between the gate check and the lock
        let target = match self.shared.surface.try_lock() {
            Ok(Some(target)) => target,
            Ok(None) => {
                self.stats.skipped_unavailable += 1;
                tracing::trace!(instance = self.instance, "drawing target unavailable");
                return Ok(FrameOutcome::TargetUnavailable);
            }
            Err(err) => return Err(LoopExit::SurfaceFailure(err)),
        };
        self.stats.locks_acquired += 1;

        let mut guard = TargetGuard::new(&*self.shared.surface, target, &mut self.stats.releases);
        let delta_ms = self.frame_clock.tick(self.shared.clock.now_nanos());
        let result = app.update(delta_ms, guard.target_mut());
        if result.is_ok() {
            guard.commit();
        }
        drop(guard);

        match result {
            Ok(()) => {
                self.stats.frames_rendered += 1;
                Ok(FrameOutcome::Rendered { delta_ms })
            }
            Err(err) => Err(LoopExit::EngineFailure(err)),
        }
    }

    /// One full iteration: draw step, then pacing.
    pub fn iterate(&mut self) -> ControlFlow<LoopExit, FrameOutcome> {
        let frame_begin = self.shared.clock.now_nanos();

        let outcome = match self.render_frame() {
            Ok(outcome) => outcome,
            Err(exit) => return ControlFlow::Break(exit),
        };

        let frame_work_ms = self.shared.clock.now_nanos().saturating_sub(frame_begin) / NANOS_PER_MILLI;

        if let PacingDecision::Sleep(duration) = self.pacing.pace(frame_work_ms) {
            if self.token.sleep(duration) == SleepOutcome::Shutdown {
                return ControlFlow::Break(LoopExit::Stopped);
            }
        }

        ControlFlow::Continue(outcome)
    }

    /// Iterates until a stop request or a failure.
    pub fn run(mut self) -> DriverReport {
        self.state.set(DriverState::Running);
        self.frame_clock = FrameClock::starting_at(self.shared.clock.now_nanos());
        tracing::info!(
            instance = self.instance,
            target_frame_period_ms = ?self.config.target_frame_period_ms,
            "render loop started"
        );

        let exit = loop {
            if !self.token.is_running() {
                break LoopExit::Stopped;
            }
            // The target guard releases during unwinding; the app mutex does not poison
            match panic::catch_unwind(AssertUnwindSafe(|| self.iterate())) {
                Ok(ControlFlow::Continue(_)) => {}
                Ok(ControlFlow::Break(exit)) => break exit,
                Err(payload) => break LoopExit::Panicked(panic_message(payload.as_ref())),
            }
        };

        self.state.set(DriverState::Stopped);
        let stats = self.stats();

        match &exit {
            LoopExit::Stopped => tracing::info!(
                instance = self.instance,
                iterations = stats.iterations,
                frames = stats.frames_rendered,
                overruns = stats.pacing.overruns,
                "render loop stopped"
            ),
            LoopExit::EngineFailure(err) => tracing::error!(
                instance = self.instance,
                error = %err,
                "engine failed, render loop terminated"
            ),
            LoopExit::SurfaceFailure(err) => tracing::error!(
                instance = self.instance,
                error = %err,
                "surface failed, render loop terminated"
            ),
            LoopExit::Panicked(message) => tracing::error!(
                instance = self.instance,
                panic = %message,
                "engine panicked, render loop terminated"
            ),
        }

        DriverReport {
            instance: self.instance,
            exit,
            stats,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}

impl<A, S, C> RenderCycleDriver<A, S, C>
where
    S: SurfaceProvider + 'static,
    A: GameApp<S::Target> + 'static,
    C: ClockSource + 'static,
{
    /// Starts [`run`](Self::run) on a new named thread.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Spawn`](crate::LoopError::Spawn) if the OS
    /// refuses the thread.
    pub fn spawn(self) -> LoopResult<DriverHandle> {
        let instance = self.instance;
        let token = self.token.clone();
        let state = self.state.clone();
        let name = format!("{}-{}", self.config.thread_name, instance);

        let join = thread::Builder::new().name(name).spawn(move || self.run())?;

        Ok(DriverHandle {
            instance,
            token,
            state,
            join,
        })
    }
}

/// Owner's side of a running driver thread.
#[derive(Debug)]
pub struct DriverHandle {
    instance: u64,
    token: RunToken,
    state: StateCell,
    join: JoinHandle<DriverReport>,
}

impl DriverHandle {
    /// Instance number.
    #[inline]
    #[must_use]
    pub const fn instance(&self) -> u64 {
        self.instance
    }

    /// Driver state as last published by the thread.
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state.get()
    }

    /// Asks the loop to stop (no wait).
    pub fn request_stop(&self) {
        self.token.request_stop();
    }

    /// Whether the thread has terminated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Blocks until the thread has terminated.
    ///
    /// A panic that escaped [`RenderCycleDriver::run`] is reported as
    /// [`LoopExit::Panicked`] with empty counters.
    pub fn join(self) -> DriverReport {
        let instance = self.instance;
        match self.join.join() {
            Ok(report) => report,
            Err(payload) => {
                self.state.set(DriverState::Stopped);
                let message = panic_message(payload.as_ref());
                tracing::error!(instance, panic = %message, "render thread panicked");
                DriverReport {
                    instance,
                    exit: LoopExit::Panicked(message),
                    stats: DriverStats::default(),
                }
            }
        }
    }
}

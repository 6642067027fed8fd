//! # Collaborator Interfaces
//!
//! What the loop consumes: the engine entry points and the drawing target
//! provider. Implementations live outside this crate (the platform surface,
//! the engine wiring, or a headless backend).
//!
//! ```text
//!            ┌──────────────────┐   try_lock / release   ┌──────────────────┐
//!            │ RenderCycleDriver│ ─────────────────────> │ SurfaceProvider  │
//!            │  (render thread) │                        └──────────────────┘
//!            │                  │   update / init        ┌──────────────────┐
//!            │                  │ ─────────────────────> │ GameApp          │
//!            └──────────────────┘                        └──────────────────┘
//! ```

use crate::error::{EngineResult, SurfaceError};

/// Engine entry points, called only from a render thread.
///
/// `T` is the drawing target type of the surface provider.
pub trait GameApp<T>: Send {
    /// Advances the game by `delta_ms` and renders into `target`.
    ///
    /// # Errors
    ///
    /// An error ends the current loop instance.
    fn update(&mut self, delta_ms: u64, target: &mut T) -> EngineResult<()>;

    /// Whether the screen stack is empty (no game state yet).
    fn is_screen_stack_empty(&self) -> bool;

    /// Pushes the starting screen.
    ///
    /// # Errors
    ///
    /// An error ends the current loop instance.
    fn push_starting_screen(&mut self) -> EngineResult<()>;
}

/// Lockable, exclusive render surface.
///
/// Shared between the UI thread (which owns its lifetime) and the render
/// thread (which locks it). `try_lock` must not block for long: surface
/// teardown waits for the render thread to finish its iteration.
pub trait SurfaceProvider: Send + Sync {
    /// Drawing target handed out by a successful lock.
    type Target;

    /// Locks the surface for one frame.
    ///
    /// `Ok(None)` means "not available right now" (e.g. the surface is
    /// being torn down) and is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that will not resolve by retrying.
    fn try_lock(&self) -> Result<Option<Self::Target>, SurfaceError>;

    /// Unlocks the surface. `commit` posts the frame; otherwise it is dropped.
    fn release(&self, target: Self::Target, commit: bool);
}

/// Holds a locked target and releases it exactly once on drop.
///
/// Dropping without [`commit`](Self::commit) discards the frame, which is
/// what happens when the engine fails or panics mid-frame.
pub struct TargetGuard<'a, S: SurfaceProvider> {
    provider: &'a S,
    target: Option<S::Target>,
    commit: bool,
    releases: &'a mut u64,
}

impl<'a, S: SurfaceProvider> TargetGuard<'a, S> {
    /// Wraps a freshly locked target. `releases` is bumped on drop.
    pub fn new(provider: &'a S, target: S::Target, releases: &'a mut u64) -> Self {
        Self {
            provider,
            target: Some(target),
            commit: false,
            releases,
        }
    }

    /// The locked target.
    ///
    /// # Panics
    ///
    /// Never: the target is only taken in `drop`.
    pub fn target_mut(&mut self) -> &mut S::Target {
        match self.target.as_mut() {
            Some(target) => target,
            None => unreachable!("target is present until drop"),
        }
    }

    /// Marks the frame as complete; it is posted on release.
    pub fn commit(&mut self) {
        self.commit = true;
    }
}

impl<S: SurfaceProvider> Drop for TargetGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            self.provider.release(target, self.commit);
            *self.releases += 1;
        }
    }
}

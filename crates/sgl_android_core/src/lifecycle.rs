//! # Lifecycle Coordinator
//!
//! Maps host foreground/background transitions onto loop instances.
//!
//! ```text
//! on_foreground ──> new RunToken ──> new driver thread (instance N+1)
//! on_background ──> request stop of the active instance (no wait)
//! stop_and_join ──> request stop of every instance, wait for all of them
//! ```
//!
//! A backgrounded instance is retired, not forgotten: it may still be
//! draining its last iteration when the next foreground starts a new one.
//! Each instance watches only its own token, so a stale thread can never
//! keep the fresh one alive or be revived by it.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::clock::{ClockSource, MonotonicClock};
use crate::config::LoopConfig;
use crate::driver::{DriverHandle, DriverReport, DriverStats, LoopShared, RenderCycleDriver};
use crate::engine::{GameApp, SurfaceProvider};
use crate::error::LoopResult;
use crate::sync::{ReadinessGate, RunToken};

/// Stop-and-wait control over the render threads.
///
/// Used by surface teardown, which must not return while a render thread
/// can still touch the surface.
pub trait LoopControl: Send + Sync {
    /// Stops every loop instance and blocks until all threads have ended.
    ///
    /// Returns the number of threads joined.
    fn stop_and_join(&self) -> usize;
}

#[derive(Debug, Default)]
struct LoopSlots {
    active: Option<DriverHandle>,
    retired: Vec<DriverHandle>,
}

/// Owns the loop instances of one host.
pub struct LifecycleCoordinator<A, S, C = MonotonicClock> {
    config: LoopConfig,
    shared: LoopShared<A, S, C>,
    slots: Mutex<LoopSlots>,
    next_instance: AtomicU64,
    last_report: Mutex<Option<DriverReport>>,
}

impl<A, S, C> LifecycleCoordinator<A, S, C>
where
    S: SurfaceProvider + 'static,
    A: GameApp<S::Target> + 'static,
    C: ClockSource + 'static,
{
    /// Creates a coordinator. No thread is started until
    /// [`on_foreground`](Self::on_foreground).
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Config`](crate::LoopError::Config) for an invalid
    /// configuration.
    pub fn new(config: LoopConfig, shared: LoopShared<A, S, C>) -> LoopResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shared,
            slots: Mutex::new(LoopSlots::default()),
            next_instance: AtomicU64::new(1),
            last_report: Mutex::new(None),
        })
    }

    /// The readiness gate shared with the loop instances.
    #[must_use]
    pub fn gate(&self) -> &ReadinessGate {
        &self.shared.gate
    }

    /// Shared loop state.
    #[must_use]
    pub fn shared(&self) -> &LoopShared<A, S, C> {
        &self.shared
    }

    /// Starts a fresh loop instance. Returns its instance number.
    ///
    /// A still-active instance (foreground without background) is stopped
    /// and retired first.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Spawn`](crate::LoopError::Spawn) if the thread
    /// cannot be created; no instance is active afterwards.
    pub fn on_foreground(&self) -> LoopResult<u64> {
        let instance = self.next_instance.fetch_add(1, Ordering::Relaxed);
        let driver = RenderCycleDriver::new(instance, self.config.clone(), RunToken::new(), self.shared.clone());

        let mut slots = self.slots.lock();
        self.reap_finished(&mut slots);

        if let Some(stale) = slots.active.take() {
            tracing::warn!(
                stale_instance = stale.instance(),
                instance,
                "foreground while a loop is active, retiring it"
            );
            stale.request_stop();
            slots.retired.push(stale);
        }

        let handle = driver.spawn()?;
        slots.active = Some(handle);
        drop(slots);

        tracing::info!(instance, "loop instance started");
        Ok(instance)
    }

    /// Requests the active instance to stop without waiting for it.
    pub fn on_background(&self) {
        let mut slots = self.slots.lock();
        match slots.active.take() {
            Some(handle) => {
                handle.request_stop();
                tracing::info!(instance = handle.instance(), "loop stop requested");
                slots.retired.push(handle);
            }
            None => tracing::debug!("background with no active loop"),
        }
    }

    /// Whether an instance is active and its thread still alive.
    #[must_use]
    pub fn is_loop_active(&self) -> bool {
        self.slots.lock().active.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Instance number of the active loop.
    #[must_use]
    pub fn active_instance(&self) -> Option<u64> {
        self.slots.lock().active.as_ref().map(DriverHandle::instance)
    }

    /// Render threads not yet known to have ended, active and retired.
    #[must_use]
    pub fn live_threads(&self) -> usize {
        let slots = self.slots.lock();
        slots
            .active
            .iter()
            .chain(slots.retired.iter())
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Counters of the most recently joined instance.
    #[must_use]
    pub fn last_stats(&self) -> Option<DriverStats> {
        self.last_report.lock().as_ref().map(|report| report.stats)
    }

    /// Takes the report of the most recently joined instance.
    pub fn take_last_report(&self) -> Option<DriverReport> {
        self.last_report.lock().take()
    }

    /// Joins retired threads that have already ended.
    fn reap_finished(&self, slots: &mut LoopSlots) {
        let (finished, running): (Vec<_>, Vec<_>) = slots.retired.drain(..).partition(DriverHandle::is_finished);
        slots.retired = running;
        for handle in finished {
            self.record(handle.join());
        }
    }

    fn join_all(&self) -> usize {
        let handles: Vec<DriverHandle> = {
            let mut slots = self.slots.lock();
            let active = slots.active.take();
            active.into_iter().chain(slots.retired.drain(..)).collect()
        };

        for handle in &handles {
            handle.request_stop();
        }

        let joined = handles.len();
        for handle in handles {
            let instance = handle.instance();
            self.record(handle.join());
            tracing::debug!(instance, "render thread joined");
        }
        joined
    }
}

impl<A, S, C> LifecycleCoordinator<A, S, C> {
    /// Keeps `report` as the latest one. Failures included.
    fn record(&self, report: DriverReport) {
        if report.exit.is_failure() {
            tracing::warn!(instance = report.instance, exit = ?report.exit, "loop instance ended on failure");
        }
        *self.last_report.lock() = Some(report);
    }
}

impl<A, S, C> LoopControl for LifecycleCoordinator<A, S, C>
where
    S: SurfaceProvider + 'static,
    A: GameApp<S::Target> + 'static,
    C: ClockSource + 'static,
{
    fn stop_and_join(&self) -> usize {
        self.join_all()
    }
}

impl<A, S, C> Drop for LifecycleCoordinator<A, S, C> {
    fn drop(&mut self) {
        let slots = std::mem::take(self.slots.get_mut());
        for handle in slots.active.into_iter().chain(slots.retired) {
            handle.request_stop();
            self.record(handle.join());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::LoopExit;
    use crate::error::{EngineResult, SurfaceError};
    use std::time::{Duration, Instant};

    struct NullSurface;

    impl SurfaceProvider for NullSurface {
        type Target = ();

        fn try_lock(&self) -> Result<Option<()>, SurfaceError> {
            Ok(Some(()))
        }

        fn release(&self, _target: (), _commit: bool) {}
    }

    #[derive(Default)]
    struct NullApp {
        updates: u64,
        started: bool,
        panic_next_update: bool,
    }

    impl GameApp<()> for NullApp {
        fn update(&mut self, _delta_ms: u64, _target: &mut ()) -> EngineResult<()> {
            self.updates += 1;
            if self.panic_next_update {
                self.panic_next_update = false;
                panic!("engine bug");
            }
            Ok(())
        }

        fn is_screen_stack_empty(&self) -> bool {
            !self.started
        }

        fn push_starting_screen(&mut self) -> EngineResult<()> {
            self.started = true;
            Ok(())
        }
    }

    fn coordinator() -> LifecycleCoordinator<NullApp, NullSurface> {
        let config = LoopConfig {
            target_frame_period_ms: Some(2),
            ..LoopConfig::default()
        };
        LifecycleCoordinator::new(config, LoopShared::new(NullApp::default(), NullSurface)).unwrap()
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = LoopConfig {
            target_frame_period_ms: Some(0),
            ..LoopConfig::default()
        };
        let result = LifecycleCoordinator::new(config, LoopShared::new(NullApp::default(), NullSurface));
        assert!(result.is_err());
    }

    #[test]
    fn test_foreground_starts_instance() {
        let coordinator = coordinator();
        assert!(!coordinator.is_loop_active());

        let instance = coordinator.on_foreground().unwrap();
        assert_eq!(instance, 1);
        assert_eq!(coordinator.active_instance(), Some(1));
        assert!(coordinator.is_loop_active());

        assert_eq!(coordinator.stop_and_join(), 1);
        assert!(!coordinator.is_loop_active());
        assert_eq!(coordinator.live_threads(), 0);
    }

    #[test]
    fn test_background_does_not_wait() {
        let coordinator = coordinator();
        coordinator.on_foreground().unwrap();

        coordinator.on_background();
        assert_eq!(coordinator.active_instance(), None);

        wait_for(|| coordinator.live_threads() == 0);
        assert_eq!(coordinator.stop_and_join(), 1);

        let report = coordinator.take_last_report().unwrap();
        assert!(matches!(report.exit, LoopExit::Stopped));
    }

    #[test]
    fn test_new_instance_per_foreground() {
        let coordinator = coordinator();
        coordinator.gate().set_ready();

        let first = coordinator.on_foreground().unwrap();
        coordinator.on_background();
        let second = coordinator.on_foreground().unwrap();
        assert_ne!(first, second);

        // The fresh instance renders even though the old token was stopped
        wait_for(|| coordinator.shared().app.lock().updates > 3);
        assert!(coordinator.is_loop_active());

        coordinator.stop_and_join();
        assert_eq!(coordinator.live_threads(), 0);
    }

    #[test]
    fn test_double_foreground_retires_previous() {
        let coordinator = coordinator();
        coordinator.on_foreground().unwrap();
        coordinator.on_foreground().unwrap();

        assert_eq!(coordinator.active_instance(), Some(2));
        assert_eq!(coordinator.stop_and_join(), 2);
    }

    #[test]
    fn test_panicked_instance_is_last_report() {
        let coordinator = coordinator();
        coordinator.gate().set_ready();

        let first = coordinator.on_foreground().unwrap();
        wait_for(|| coordinator.shared().app.lock().updates > 3);
        coordinator.on_background();
        wait_for(|| coordinator.live_threads() == 0);

        coordinator.shared().app.lock().panic_next_update = true;
        let second = coordinator.on_foreground().unwrap();
        wait_for(|| !coordinator.is_loop_active());
        coordinator.stop_and_join();

        let report = coordinator.take_last_report().unwrap();
        assert_ne!(first, second);
        assert_eq!(report.instance, second);
        assert!(matches!(report.exit, LoopExit::Panicked(ref message) if message == "engine bug"));
        assert_eq!(report.stats.locks_acquired, report.stats.releases);
    }

    #[test]
    fn test_drop_joins_render_threads() {
        let coordinator = coordinator();
        coordinator.gate().set_ready();
        coordinator.on_foreground().unwrap();
        coordinator.on_foreground().unwrap();

        let app = std::sync::Arc::clone(&coordinator.shared().app);
        wait_for(|| app.lock().updates > 0);
        drop(coordinator);

        // Only this test still holds the engine: both threads are gone
        assert_eq!(std::sync::Arc::strong_count(&app), 1);
    }

    #[test]
    fn test_background_without_loop() {
        let coordinator = coordinator();
        coordinator.on_background();
        assert_eq!(coordinator.stop_and_join(), 0);
        assert!(coordinator.last_stats().is_none());
    }
}

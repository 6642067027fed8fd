//! Cooperative cancellation for one loop instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// How a [`RunToken::sleep`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration passed.
    Elapsed,
    /// A stop was requested before or during the sleep.
    Shutdown,
}

struct Inner {
    running: AtomicBool,
    wake_lock: Mutex<()>,
    wake: Condvar,
}

/// Run/stop flag shared by a render thread and its owner.
///
/// Starts running. [`request_stop`](Self::request_stop) is final: a token
/// never runs again, the next foreground transition makes a new one.
#[derive(Clone)]
pub struct RunToken {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RunToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunToken")
            .field("running", &self.is_running())
            .finish()
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

impl RunToken {
    /// Creates a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                running: AtomicBool::new(true),
                wake_lock: Mutex::new(()),
                wake: Condvar::new(),
            }),
        }
    }

    /// Checked by the render thread at the top of every iteration.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Asks the loop to stop. Does not wait for it.
    ///
    /// Wakes the loop if it is sleeping. Safe to call any number of times.
    pub fn request_stop(&self) {
        self.inner.running.store(false, Ordering::Release);

        // Taking the lock orders the notify after any in-progress check
        let _guard = self.inner.wake_lock.lock();
        self.inner.wake.notify_all();
    }

    /// Suspends the calling thread for `duration` or until a stop request.
    pub fn sleep(&self, duration: Duration) -> SleepOutcome {
        let deadline = Instant::now() + duration;
        let mut guard = self.inner.wake_lock.lock();

        while self.is_running() {
            if self.inner.wake.wait_until(&mut guard, deadline).timed_out() {
                return if self.is_running() {
                    SleepOutcome::Elapsed
                } else {
                    SleepOutcome::Shutdown
                };
            }
        }
        SleepOutcome::Shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_token_lifecycle() {
        let token = RunToken::new();
        assert!(token.is_running());

        token.request_stop();
        token.request_stop();
        assert!(!token.is_running());
    }

    #[test]
    fn test_clones_share_state() {
        let token = RunToken::new();
        let other = token.clone();
        other.request_stop();
        assert!(!token.is_running());
    }

    #[test]
    fn test_sleep_elapses() {
        let token = RunToken::new();
        let start = Instant::now();
        assert_eq!(token.sleep(Duration::from_millis(5)), SleepOutcome::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_sleep_after_stop_returns_immediately() {
        let token = RunToken::new();
        token.request_stop();
        let start = Instant::now();
        assert_eq!(token.sleep(Duration::from_secs(10)), SleepOutcome::Shutdown);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_stop_wakes_sleeper() {
        let token = RunToken::new();
        let sleeper = token.clone();

        let start = Instant::now();
        let handle = thread::spawn(move || sleeper.sleep(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(20));
        token.request_stop();

        assert_eq!(handle.join().unwrap(), SleepOutcome::Shutdown);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

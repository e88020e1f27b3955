#![forbid(unsafe_code)]

//! Cooperative cancellation for the run loop.
//!
//! The loop checks [`StopSignal`] between ticks and sleeps on it, so a
//! [`StopTrigger`] wakes it immediately instead of after the full interval.
//! A tick that is already running always completes.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

type Shared = Arc<(Mutex<bool>, Condvar)>;

fn lock(shared: &Shared) -> MutexGuard<'_, bool> {
    shared.0.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loop-side view of the stop flag.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Shared,
}

/// Host-side handle that requests a stop.
#[derive(Debug, Clone)]
pub struct StopTrigger {
    inner: Shared,
}

impl StopSignal {
    /// Create a connected (signal, trigger) pair.
    #[must_use]
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Self, StopTrigger) {
        let inner: Shared = Arc::new((Mutex::new(false), Condvar::new()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            StopTrigger { inner },
        )
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *lock(&self.inner)
    }

    /// Sleep for `duration` or until stopped.
    ///
    /// Returns `true` if stopped. Spurious wakeups are absorbed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let cvar = &self.inner.1;
        let mut stopped = lock(&self.inner);
        let deadline = Instant::now() + duration;
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            stopped = match cvar.wait_timeout(stopped, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

impl StopTrigger {
    pub fn stop(&self) {
        let mut stopped = lock(&self.inner);
        *stopped = true;
        self.inner.1.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_running() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.is_stopped());
        assert!(!signal.wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn trigger_wakes_waiter() {
        let (signal, trigger) = StopSignal::new();
        let handle = thread::spawn(move || signal.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(20));
        trigger.stop();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn stopped_before_wait_returns_immediately() {
        let (signal, trigger) = StopSignal::new();
        trigger.stop();
        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

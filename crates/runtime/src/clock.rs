//! Clocks for the game loop
//!
//! The loop never calls `Instant::now` directly. Production uses [`SystemClock`];
//! tests drive a [`ManualClock`] forward explicitly.

use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync + 'static {
    /// Time since the clock was created
    fn now(&self) -> Duration;

    /// Block for up to `duration`. May return early.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Real sleeps on a manual clock are capped so a stopped loop notices quickly
const MANUAL_SLEEP_SLICE: Duration = Duration::from_millis(5);

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    moved: Condvar,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
        self.moved.notify_all();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) {
        let now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        let target = *now + duration;
        let _ = self
            .moved
            .wait_timeout_while(now, MANUAL_SLEEP_SLICE, |now| *now < target)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.sleep(Duration::from_secs(10));
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(16));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() >= a + Duration::from_millis(2));
    }
}

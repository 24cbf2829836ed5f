//! Debounce and throttle timers driven by explicit timestamps.
//!
//! Neither timer owns a thread. The owner passes `now` on every call, which
//! keeps handlers deterministic and lets tests step through time without
//! sleeping.
//!
//! ```rust
//! use noteassist::debounce::Debouncer;
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut timer = Debouncer::new(Duration::from_millis(500));
//!
//! timer.trigger(start);
//! timer.trigger(start + Duration::from_millis(300)); // restarts the wait
//! assert!(!timer.poll(start + Duration::from_millis(600)));
//! assert!(timer.poll(start + Duration::from_millis(800)));
//! assert!(!timer.poll(start + Duration::from_millis(900))); // fires once
//! ```

use std::time::{Duration, Instant};

/// Fires once after `delay` has passed without a new trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the action, replacing any pending one.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending action, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Lets an action through at most once per `interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether the action may run at `now`. Records the run when it may.
    pub fn ready(&mut self, now: Instant) -> bool {
        let allowed = self
            .last
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);

        if allowed {
            self.last = Some(now);
        }
        allowed
    }
}

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::wait_strategy::WaitStrategy;

/// Wraps a `WaitStrategy` with a deadline and an optional attempt cap.
///
/// Every store call in `auto-repair-store` that can transiently fail is
/// retried through one of these.
pub struct Retry<S> {
    strategy: S,
    deadline: Option<Instant>,
    max_attempts: Option<u32>,
    attempts: AtomicU32,
}

impl<S: WaitStrategy> Retry<S> {
    /// Retries until `timeout` has elapsed from now.
    pub fn until_elapsed(strategy: S, timeout: Duration) -> Self {
        Self {
            strategy,
            deadline: Some(Instant::now() + timeout),
            max_attempts: None,
            attempts: AtomicU32::new(0),
        }
    }

    /// Retries until the given deadline.
    pub fn until(strategy: S, deadline: Instant) -> Self {
        Self {
            strategy,
            deadline: Some(deadline),
            max_attempts: None,
            attempts: AtomicU32::new(0),
        }
    }

    /// Retries forever (bounded only by `max_attempts`, if set).
    pub fn with_no_time_limit(strategy: S) -> Self {
        Self {
            strategy,
            deadline: None,
            max_attempts: None,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn with_max_attempts(mut self, retries: u32) -> Self {
        self.max_attempts = Some(retries);
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn has_expired(&self) -> bool {
        if let Some(max) = self.max_attempts {
            if self.attempts() >= max {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        false
    }

    /// Records an attempt and sleeps for the strategy's computed wait, if
    /// any and if it would not overrun the deadline. Returns `false`
    /// (without sleeping) once the retry has expired.
    pub fn maybe_sleep(&self) -> bool {
        if self.has_expired() {
            return false;
        }
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(wait) = self.strategy.compute_wait(attempt) {
            let wait = match self.deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    wait.min(remaining)
                }
                None => wait,
            };
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        true
    }
}

use std::time::Duration;

/// Computes the delay before the next attempt, given the number of
/// attempts made so far (1-indexed). Returning `None` means "give up" —
/// a negative delay doesn't exist in `Duration`, so `Option` is the
/// idiomatic Rust equivalent.
pub trait WaitStrategy: Send + Sync {
    fn compute_wait(&self, attempts: u32) -> Option<Duration>;
}

/// `base * attempts`, capped at `cap`. The documented default is
/// `50ms*attempts<=10s`.
pub struct LinearWaitStrategy {
    pub base: Duration,
    pub cap: Duration,
}

impl LinearWaitStrategy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }
}

impl WaitStrategy for LinearWaitStrategy {
    fn compute_wait(&self, attempts: u32) -> Option<Duration> {
        let attempts = attempts.max(1);
        let wait = self.base.saturating_mul(attempts);
        Some(wait.min(self.cap))
    }
}

/// Never waits; used by `Retry::with_no_time_limit` tests and by callers
/// that want immediate retries bounded only by a deadline.
pub struct ZeroWaitStrategy;

impl WaitStrategy for ZeroWaitStrategy {
    fn compute_wait(&self, _attempts: u32) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}

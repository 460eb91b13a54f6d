use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch milliseconds, the unit every timestamp in the persisted history
/// table is stored in.
pub type EpochMillis = i64;

/// A source of "now", injected rather than called directly so the
/// arbitrator and splitter stay pure functions of their snapshots in tests.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> EpochMillis;
}

/// The real wall clock. Named `System` to mirror `solana_sdk`'s habit of a
/// thin real-vs-fake pair around every external time/IO dependency.
#[derive(Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> EpochMillis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_millis() as EpochMillis
    }
}

/// A clock a test can advance deterministically.
pub struct FakeClock {
    millis: std::sync::atomic::AtomicI64,
}

impl FakeClock {
    pub fn new(start_millis: EpochMillis) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, delta_millis: i64) {
        self.millis
            .fetch_add(delta_millis, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set(&self, millis: EpochMillis) {
        self.millis.store(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> EpochMillis {
        self.millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_by_delta() {
        let clock = FakeClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
    }
}

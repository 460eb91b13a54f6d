//! Bounded exponential-ish backoff with a deadline check before every
//! attempt.

pub mod retry;
pub mod spec_string;
pub mod wait_strategy;

pub use retry::Retry;
pub use spec_string::{parse_retry_spec, RetrySpec};
pub use wait_strategy::{LinearWaitStrategy, WaitStrategy, ZeroWaitStrategy};

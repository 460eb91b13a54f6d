use std::time::Duration;

use crate::wait_strategy::LinearWaitStrategy;

/// The parsed form of a `WaitStrategy` spec string, e.g.
/// `"50ms*attempts<=10s,retries=5"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrySpec {
    pub base: Duration,
    pub cap: Duration,
    pub retries: Option<u32>,
}

impl Default for RetrySpec {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(50),
            cap: Duration::from_secs(10),
            retries: None,
        }
    }
}

impl RetrySpec {
    pub fn strategy(&self) -> LinearWaitStrategy {
        LinearWaitStrategy::new(self.base, self.cap)
    }
}

/// Parses a spec string of the form `"<base>*attempts<=<cap>,retries=<n>"`,
/// e.g. `"50ms*attempts<=10s,retries=5"`. Both the cap clause and the
/// retries clause are optional; whatever is missing or malformed falls
/// back to `RetrySpec::default()`'s value for that field.
pub fn parse_retry_spec(spec: &str) -> RetrySpec {
    let defaults = RetrySpec::default();
    let mut base = defaults.base;
    let mut cap = defaults.cap;
    let mut retries = defaults.retries;

    for clause in spec.split(',') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        if let Some(rest) = clause.strip_prefix("retries=") {
            retries = rest.trim().parse::<u32>().ok().or(retries);
            continue;
        }
        // "<base>*attempts<=<cap>"
        if let Some((base_part, cap_part)) = clause.split_once("*attempts<=") {
            if let Some(parsed) = parse_duration(base_part) {
                base = parsed;
            }
            if let Some(parsed) = parse_duration(cap_part) {
                cap = parsed;
            }
        }
    }

    RetrySpec { base, cap, retries }
}

fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if let Some(ms) = text.strip_suffix("ms") {
        return ms.trim().parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(s) = text.strip_suffix('s') {
        return s.trim().parse::<u64>().ok().map(Duration::from_secs);
    }
    None
}

//! Counters and histograms for the auto-repair coordinator.
//!
//! Modeled on `solana_metrics`'s `datapoint!` pattern: call sites record a
//! named point with one macro invocation and the registry handles
//! aggregation. Unlike `solana_metrics`, points never leave the process —
//! the real telemetry sink is an external collaborator.

pub mod histogram;
pub mod registry;

pub use histogram::{Histogram, HistogramSnapshot};
pub use registry::{RepairTypeCounters, MetricsRegistry, METRICS};

/// Logs a structured point at `info` level, the way `solana_metrics::datapoint!`
/// shapes its points before handing them to the submission thread.
#[macro_export]
macro_rules! datapoint_repair {
    ($name:expr, $($k:expr => $v:expr),+ $(,)?) => {
        log::info!(target: "auto_repair_metrics", "{} {}", $name, [$(format!("{}={:?}", $k, $v)),+].join(" "));
    };
}

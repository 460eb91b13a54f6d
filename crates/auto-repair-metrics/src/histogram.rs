use parking_lot::Mutex;

/// A minimal running-stats histogram: enough to answer "what's the typical
/// and worst-case repair start lag" without pulling in a full histogram
/// crate for a single in-process gauge.
#[derive(Default)]
pub struct Histogram {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    count: u64,
    sum: i64,
    min: Option<i64>,
    max: Option<i64>,
}

impl Histogram {
    pub fn record(&self, value: i64) {
        let mut inner = self.inner.lock();
        inner.count += 1;
        inner.sum += value;
        inner.min = Some(inner.min.map_or(value, |m| m.min(value)));
        inner.max = Some(inner.max.map_or(value, |m| m.max(value)));
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let inner = self.inner.lock();
        HistogramSnapshot {
            count: inner.count,
            mean: if inner.count > 0 {
                inner.sum as f64 / inner.count as f64
            } else {
                0.0
            },
            min: inner.min.unwrap_or(0),
            max: inner.max.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub mean: f64,
    pub min: i64,
    pub max: i64,
}

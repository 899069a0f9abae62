use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Bucket upper bounds in milliseconds; the last bucket is open-ended
const BUCKET_BOUNDS_MS: [u64; 12] = [
    10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000, 60_000,
];

const BUCKETS: usize = BUCKET_BOUNDS_MS.len() + 1;

/// Lock-free latency histogram with fixed, roughly logarithmic buckets
///
/// Percentiles are reported as the upper bound of the bucket that contains
/// them, capped at the largest observed value.
#[derive(Debug, Default)]
pub struct LatencyHistogram {
    buckets: [AtomicU64; BUCKETS],
    count: AtomicU64,
    sum_ms: AtomicU64,
    max_ms: AtomicU64,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        let slot = BUCKET_BOUNDS_MS
            .iter()
            .position(|bound| ms <= *bound)
            .unwrap_or(BUCKETS - 1);

        self.buckets[slot].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ms.fetch_add(ms, Ordering::Relaxed);
        self.max_ms.fetch_max(ms, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms.load(Ordering::Relaxed))
    }

    pub fn mean(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.sum_ms.load(Ordering::Relaxed) / count)
    }

    /// Returns the latency below which `quantile` (0.0 - 1.0) of samples fall
    pub fn percentile(&self, quantile: f64) -> Duration {
        let counts: Vec<u64> = self
            .buckets
            .iter()
            .map(|bucket| bucket.load(Ordering::Relaxed))
            .collect();
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Duration::ZERO;
        }

        let target = ((quantile.clamp(0.0, 1.0) * total as f64).ceil() as u64).max(1);
        let max_ms = self.max_ms.load(Ordering::Relaxed);

        let mut seen = 0;
        for (slot, count) in counts.iter().enumerate() {
            seen += count;
            if seen >= target {
                let bound = BUCKET_BOUNDS_MS.get(slot).copied().unwrap_or(max_ms);
                return Duration::from_millis(bound.min(max_ms));
            }
        }

        Duration::from_millis(max_ms)
    }
}

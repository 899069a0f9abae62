//! Process-wide crawl metrics
//!
//! One [`Metrics`] value is created per run and shared by every worker. All
//! updates are single atomic increments; nothing reads a counter to make a
//! crawl decision, so `Relaxed` ordering is enough. [`Metrics::snapshot`] is
//! exact once the scheduler reports completion and a valid partial view
//! before that.

mod histogram;

pub use histogram::LatencyHistogram;

use crate::extract::Strategy;
use crate::state::{CrawlRecord, FailureKind, Outcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Failure labels in the order they are counted
pub const FAILURE_LABELS: [&str; 7] = [
    "connection_failure",
    "timeout",
    "too_many_redirects",
    "http_error",
    "invalid_url",
    "cancelled",
    "internal",
];

fn failure_slot(kind: FailureKind) -> usize {
    match kind {
        FailureKind::ConnectionFailure => 0,
        FailureKind::Timeout => 1,
        FailureKind::TooManyRedirects => 2,
        FailureKind::HttpError(_) => 3,
        FailureKind::InvalidUrl => 4,
        FailureKind::Cancelled => 5,
        FailureKind::Internal => 6,
    }
}

/// A single accounting event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent {
    /// A logo was selected by the given strategy
    Success(Strategy),

    /// The page was inspected but had no extractable logo
    NoLogo,

    Failure(FailureKind),

    FaviconFound,

    FaviconMissing,
}

/// Atomic counters shared by all workers
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    dispatched: AtomicU64,
    strategy_hits: [AtomicU64; 5],
    no_logo: AtomicU64,
    failures: [AtomicU64; 7],
    favicon_found: AtomicU64,
    favicon_missing: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
    latency: LatencyHistogram,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            dispatched: AtomicU64::new(0),
            strategy_hits: Default::default(),
            no_logo: AtomicU64::new(0),
            failures: Default::default(),
            favicon_found: AtomicU64::new(0),
            favicon_missing: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            peak_in_flight: AtomicU64::new(0),
            latency: LatencyHistogram::new(),
        }
    }

    /// Counts a domain task taken from the input stream
    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record(&self, event: MetricEvent) {
        let counter = match event {
            MetricEvent::Success(strategy) => &self.strategy_hits[strategy.index()],
            MetricEvent::NoLogo => &self.no_logo,
            MetricEvent::Failure(kind) => &self.failures[failure_slot(kind)],
            MetricEvent::FaviconFound => &self.favicon_found,
            MetricEvent::FaviconMissing => &self.favicon_missing,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the single outcome event of a finished task, plus the favicon
    /// event for tasks that got as far as extraction
    pub fn record_outcome(&self, record: &CrawlRecord) {
        match record.outcome {
            Outcome::LogoFound(strategy) => self.record(MetricEvent::Success(strategy)),
            Outcome::NoLogo => self.record(MetricEvent::NoLogo),
            Outcome::Failed(kind) => {
                self.record(MetricEvent::Failure(kind));
                return;
            }
        }

        if record.favicon_url.is_some() {
            self.record(MetricEvent::FaviconFound);
        } else {
            self.record(MetricEvent::FaviconMissing);
        }
    }

    pub fn record_latency(&self, latency: Duration) {
        self.latency.record(latency);
    }

    /// Marks a fetch as in flight until the returned guard is dropped
    pub fn begin_fetch(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::Relaxed);
        InFlightGuard { metrics: self }
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        MetricsSnapshot {
            dispatched: load(&self.dispatched),
            strategy_hits: self.strategy_hits.each_ref().map(load),
            no_logo: load(&self.no_logo),
            failures: self.failures.each_ref().map(load),
            favicon_found: load(&self.favicon_found),
            favicon_missing: load(&self.favicon_missing),
            peak_in_flight: load(&self.peak_in_flight),
            elapsed: self.started.elapsed(),
            latency_p50: self.latency.percentile(0.50),
            latency_p90: self.latency.percentile(0.90),
            latency_p99: self.latency.percentile(0.99),
            latency_max: self.latency.max(),
            latency_mean: self.latency.mean(),
        }
    }
}

/// Decrements the in-flight gauge on drop
#[must_use]
pub struct InFlightGuard<'a> {
    metrics: &'a Metrics,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dispatched: u64,

    /// Logo hits indexed by [`Strategy::index`]
    pub strategy_hits: [u64; 5],

    pub no_logo: u64,

    /// Failures indexed like [`FAILURE_LABELS`]
    pub failures: [u64; 7],

    pub favicon_found: u64,
    pub favicon_missing: u64,
    pub peak_in_flight: u64,
    pub elapsed: Duration,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    pub latency_max: Duration,
    pub latency_mean: Duration,
}

impl MetricsSnapshot {
    pub fn logos_found(&self) -> u64 {
        self.strategy_hits.iter().sum()
    }

    pub fn hits(&self, strategy: Strategy) -> u64 {
        self.strategy_hits[strategy.index()]
    }

    pub fn failures_of(&self, kind: FailureKind) -> u64 {
        self.failures[failure_slot(kind)]
    }

    pub fn failures_total(&self) -> u64 {
        self.failures.iter().sum()
    }

    /// Outcome events recorded; equals `dispatched` after a completed run
    pub fn outcomes_total(&self) -> u64 {
        self.logos_found() + self.no_logo + self.failures_total()
    }

    /// Share of dispatched domains that produced a logo, as a percentage
    pub fn discovery_rate(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        self.logos_found() as f64 / self.dispatched as f64 * 100.0
    }

    pub fn domains_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.outcomes_total() as f64 / secs
    }
}

//! Run statistics reporting
//!
//! The summary goes through `tracing` so it lands on stderr next to the rest
//! of the logs, keeping stdout pure CSV.

use crate::extract::Strategy;
use crate::metrics::{MetricsSnapshot, FAILURE_LABELS};

/// Logs the end-of-run report
pub fn print_summary(snapshot: &MetricsSnapshot) {
    tracing::info!("=== Crawl summary ===");
    tracing::info!(
        "Domains: {} dispatched, {} logos found ({:.1}%), {} without logo, {} failed",
        snapshot.dispatched,
        snapshot.logos_found(),
        snapshot.discovery_rate(),
        snapshot.no_logo,
        snapshot.failures_total()
    );
    tracing::info!(
        "Throughput: {:.2} domains/sec over {:.1}s, peak {} fetches in flight",
        snapshot.domains_per_sec(),
        snapshot.elapsed.as_secs_f64(),
        snapshot.peak_in_flight
    );

    let logos = snapshot.logos_found();
    for strategy in Strategy::ALL {
        let hits = snapshot.hits(strategy);
        let share = if logos > 0 {
            hits as f64 / logos as f64 * 100.0
        } else {
            0.0
        };
        tracing::info!("  {:<16} {:>6} ({:.1}%)", strategy.name(), hits, share);
    }

    if snapshot.failures_total() > 0 {
        tracing::info!("Failures:");
        for (label, count) in FAILURE_LABELS.iter().zip(snapshot.failures) {
            if count > 0 {
                tracing::info!("  {:<18} {:>6}", label, count);
            }
        }
    }

    tracing::info!(
        "Favicons: {} found, {} missing",
        snapshot.favicon_found,
        snapshot.favicon_missing
    );
    tracing::info!(
        "Latency: p50 {:?}, p90 {:?}, p99 {:?}, max {:?}",
        snapshot.latency_p50,
        snapshot.latency_p90,
        snapshot.latency_p99,
        snapshot.latency_max
    );
}

//! Crawler module for fetching home pages and finding their logos
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirect handling and scheme fallback
//! - Per-domain coordination of fetch, extraction and favicon discovery
//! - Bounded-concurrency scheduling with per-worker throttling
//! - Overall run orchestration

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use scheduler::{DomainProcessor, Scheduler};

use crate::config::Config;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::output::ResultEmitter;
use crate::Result;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Completed domains between two progress lines
const PROGRESS_INTERVAL: u64 = 50;

/// Runs a complete crawl
///
/// This is the main entry point for a run. It will:
/// 1. Build the shared HTTP client
/// 2. Start the worker pool over `domains`
/// 3. Hand every crawl record to `emitter` as soon as it is produced
/// 4. Return the final metrics snapshot
///
/// Per-domain failures never end the run. Only the client failing to build
/// or the emitter failing to write are errors.
pub async fn crawl<S, E>(
    config: &Config,
    domains: S,
    emitter: &mut E,
    cancel: CancellationToken,
) -> Result<MetricsSnapshot>
where
    S: Stream<Item = String> + Send + 'static,
    E: ResultEmitter + ?Sized,
{
    let fetcher = Fetcher::from_config(config)?;
    let metrics = Arc::new(Metrics::new());
    let coordinator = Coordinator::new(fetcher, Arc::clone(&metrics));

    let records = Scheduler::new(coordinator, &config.crawler)
        .with_cancellation(cancel)
        .run(domains);
    futures::pin_mut!(records);

    let mut completed: u64 = 0;
    while let Some(record) = records.next().await {
        emitter.emit(&record)?;
        completed += 1;

        if completed % PROGRESS_INTERVAL == 0 {
            let snapshot = metrics.snapshot();
            tracing::info!(
                "Progress: {} domains done, {} logos found, {:.2} domains/sec",
                completed,
                snapshot.logos_found(),
                snapshot.domains_per_sec()
            );
        }
    }

    emitter.finish()?;

    let snapshot = metrics.snapshot();
    tracing::info!(
        "Crawl completed: {} domains in {:.1}s",
        completed,
        snapshot.elapsed.as_secs_f64()
    );

    Ok(snapshot)
}

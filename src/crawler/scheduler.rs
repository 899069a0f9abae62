//! Worker scheduler
//!
//! This module handles:
//! - A fixed pool of workers drawing from one shared domain stream
//! - Global concurrency limiting via a semaphore
//! - A per-worker politeness delay between dispatches
//! - Cancellation: undispatched domains resolve to `Cancelled` records
//! - Isolating worker faults so one bad task never aborts the run

use crate::config::CrawlerConfig;
use crate::metrics::Metrics;
use crate::state::{CrawlRecord, FailureKind};
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type DomainStream = Arc<Mutex<BoxStream<'static, String>>>;

/// Per-task work the scheduler dispatches
///
/// [`Coordinator`](crate::crawler::Coordinator) is the production
/// implementation. `process` must produce a record for every line; a panic
/// inside it is caught by the scheduler.
pub trait DomainProcessor: Send + Sync + 'static {
    /// Turns one input line into its crawl record
    fn process<'a>(&'a self, line: &'a str) -> BoxFuture<'a, CrawlRecord>;

    /// Collector that dispatches and outcomes are recorded on
    fn metrics(&self) -> &Arc<Metrics>;
}

/// Dispatches domain tasks to a bounded pool of workers
///
/// The scheduler coordinates:
/// - Global concurrency (at most `concurrency_limit` tasks, and therefore
///   fetches, in flight)
/// - Per-worker throttling (at least `inter_request_delay` between two
///   dispatches of the same worker)
/// - Exactly-once consumption of the input, in arrival order
pub struct Scheduler {
    processor: Arc<dyn DomainProcessor>,
    semaphore: Arc<Semaphore>,
    concurrency_limit: usize,
    inter_request_delay: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new<P: DomainProcessor>(processor: P, config: &CrawlerConfig) -> Self {
        let concurrency_limit = (config.concurrency_limit as usize).max(1);

        Self {
            processor: Arc::new(processor),
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
            inter_request_delay: config.inter_request_delay(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token as the global cancellation signal
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Starts the workers and returns the stream of crawl records
    ///
    /// Records arrive in completion order, not input order. The stream ends
    /// once the input is exhausted and every worker has finished, at which
    /// point exactly one record has been produced per input item read.
    pub fn run<S>(self, domains: S) -> impl Stream<Item = CrawlRecord>
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.concurrency_limit * 2);
        let domains: DomainStream = Arc::new(Mutex::new(domains.boxed()));

        tracing::info!(
            "Starting {} workers, {:?} between dispatches",
            self.concurrency_limit,
            self.inter_request_delay
        );

        for id in 0..self.concurrency_limit {
            let worker = Worker {
                id,
                processor: Arc::clone(&self.processor),
                semaphore: Arc::clone(&self.semaphore),
                inter_request_delay: self.inter_request_delay,
                cancel: self.cancel.clone(),
                domains: Arc::clone(&domains),
                records: tx.clone(),
            };
            tokio::spawn(worker.run());
        }

        // The channel closes once the last worker drops its sender
        drop(tx);

        stream::unfold(rx, |mut rx| async move {
            let record = rx.recv().await?;
            Some((record, rx))
        })
    }
}

struct Worker {
    id: usize,
    processor: Arc<dyn DomainProcessor>,
    semaphore: Arc<Semaphore>,
    inter_request_delay: Duration,
    cancel: CancellationToken,
    domains: DomainStream,
    records: mpsc::Sender<CrawlRecord>,
}

impl Worker {
    async fn run(self) {
        let mut last_dispatch: Option<Instant> = None;

        loop {
            let Some(line) = self.next_line().await else {
                break;
            };

            let metrics = self.processor.metrics();
            metrics.record_dispatch();

            let record = match self.dispatch(&line, &mut last_dispatch).await {
                Some(record) => record,
                None => CrawlRecord::failed(line.trim(), FailureKind::Cancelled),
            };
            metrics.record_outcome(&record);

            if self.records.send(record).await.is_err() {
                tracing::debug!("Worker {}: record receiver dropped, stopping", self.id);
                break;
            }
        }

        tracing::trace!("Worker {} finished", self.id);
    }

    /// Pulls the next input line
    ///
    /// After cancellation, lines the input can hand over immediately are
    /// still taken (and become `Cancelled` records), but the worker no longer
    /// waits for input that is not there yet, such as an idle stdin.
    async fn next_line(&self) -> Option<String> {
        // The lock is only held while pulling the next item
        let pull = async { self.domains.lock().await.next().await };

        tokio::select! {
            biased;
            next = pull => next,
            _ = self.cancel.cancelled() => {
                tracing::debug!("Worker {}: cancelled while waiting for input", self.id);
                None
            }
        }
    }

    /// Runs one task; None when cancellation wins before the task starts
    async fn dispatch(
        &self,
        line: &str,
        last_dispatch: &mut Option<Instant>,
    ) -> Option<CrawlRecord> {
        if self.cancel.is_cancelled() {
            return None;
        }

        if let Some(last) = *last_dispatch {
            tokio::select! {
                _ = tokio::time::sleep_until(last + self.inter_request_delay) => {}
                _ = self.cancel.cancelled() => return None,
            }
        }

        let permit = tokio::select! {
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok()?,
            _ = self.cancel.cancelled() => return None,
        };

        *last_dispatch = Some(Instant::now());

        // Spawned so that a panic inside the task surfaces as a join error
        let processor = Arc::clone(&self.processor);
        let owned = line.to_string();
        let task = tokio::spawn(async move {
            let _permit = permit;
            processor.process(&owned).await
        });

        match task.await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!("Worker {} faulted on {:?}: {}", self.id, line.trim(), e);
                Some(CrawlRecord::failed(line.trim(), FailureKind::Internal))
            }
        }
    }
}

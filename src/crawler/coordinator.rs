//! Per-domain orchestration
//!
//! The coordinator owns one domain task from start to finish:
//! - Parsing the input line into a domain task
//! - Fetching the home page (with scheme fallback)
//! - Running the extraction pipeline over the markup
//! - Completing the favicon field from the manifest or `/favicon.ico`
//! - Falling back to the best declared icon when no logo was found

use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::scheduler::DomainProcessor;
use crate::extract::{inspect, parse_manifest_icons, select_best, Extraction, Strategy};
use crate::metrics::Metrics;
use crate::state::{CrawlRecord, FailureKind};
use crate::url::DomainTask;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Processes single domains; shared by every worker
#[derive(Debug, Clone)]
pub struct Coordinator {
    fetcher: Fetcher,
    metrics: Arc<Metrics>,
}

impl Coordinator {
    pub fn new(fetcher: Fetcher, metrics: Arc<Metrics>) -> Self {
        Self { fetcher, metrics }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Turns one input line into its crawl record
    ///
    /// Never fails: every problem is reported through the record's outcome.
    /// Outcome accounting is left to the caller so that records produced
    /// outside this method (cancellation, worker faults) are counted the same
    /// way.
    pub async fn process(&self, line: &str) -> CrawlRecord {
        let started = Instant::now();

        let record = match DomainTask::parse(line) {
            Ok(task) => self.process_task(&task).await,
            Err(e) => {
                tracing::warn!("Skipping invalid domain {:?}: {}", line.trim(), e);
                CrawlRecord::failed(line.trim(), FailureKind::InvalidUrl)
            }
        };

        self.metrics.record_latency(started.elapsed());
        record
    }

    async fn process_task(&self, task: &DomainTask) -> CrawlRecord {
        let fetched = {
            let _in_flight = self.metrics.begin_fetch();
            self.fetcher.fetch_domain(task).await
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", task.domain(), e);
                return CrawlRecord::failed(task.domain(), e.kind());
            }
        };

        if !page.is_html() {
            tracing::debug!(
                "{} served {:?}, inspecting anyway",
                task.domain(),
                page.content_type
            );
        }

        let Extraction {
            logo,
            icon,
            manifest_url,
        } = inspect(&page.body, &page.final_url);

        let declared_icon = match (icon, manifest_url) {
            (Some(icon), _) => Some(icon.url),
            (None, Some(manifest_url)) => self.manifest_icon(&manifest_url).await,
            (None, None) => None,
        };

        let favicon_url = match &declared_icon {
            Some(url) => Some(url.clone()),
            None => self.probe_favicon(&page).await,
        };

        let logo = match logo {
            Some(selection) => Some((selection.url, selection.candidate.strategy)),
            None => declared_icon.map(|url| (url, Strategy::Favicon)),
        };

        match &logo {
            Some((url, strategy)) => {
                tracing::debug!("{}: logo {} via {}", task.domain(), url, strategy)
            }
            None => tracing::debug!("{}: no extractable logo", task.domain()),
        }

        CrawlRecord::extracted(task.domain(), logo, favicon_url)
    }

    /// Best icon listed in a web app manifest, resolved against the manifest URL
    async fn manifest_icon(&self, manifest_url: &Url) -> Option<Url> {
        let manifest = self.fetch_optional(manifest_url).await?;
        select_best(parse_manifest_icons(&manifest.body), &manifest.final_url)
            .map(|selection| selection.url)
    }

    /// Probes `/favicon.ico` at the page origin
    ///
    /// Servers that answer every path with an HTML page do not count.
    async fn probe_favicon(&self, page: &FetchedPage) -> Option<Url> {
        let probe_url = page.final_url.join("/favicon.ico").ok()?;
        let probe = self.fetch_optional(&probe_url).await?;

        if probe.is_html() || probe.body.is_empty() {
            tracing::debug!("{} is not an icon", probe_url);
            return None;
        }
        Some(probe.final_url)
    }

    async fn fetch_optional(&self, url: &Url) -> Option<FetchedPage> {
        let _in_flight = self.metrics.begin_fetch();
        self.fetcher.fetch_optional(url).await
    }
}

impl DomainProcessor for Coordinator {
    fn process<'a>(&'a self, line: &'a str) -> BoxFuture<'a, CrawlRecord> {
        Coordinator::process(self, line).boxed()
    }

    fn metrics(&self) -> &Arc<Metrics> {
        Coordinator::metrics(self)
    }
}

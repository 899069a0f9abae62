//! HTTP fetch layer
//!
//! This module handles every request the crawler makes:
//! - Building the shared, pooled HTTP client with the configured User-Agent
//! - Following redirects manually, against a bounded budget
//! - Falling back from `https` to `http` after a connection-level failure
//! - Classifying transport errors and status codes into failure kinds

use crate::config::{Config, CrawlerConfig, UserAgentConfig};
use crate::state::FailureKind;
use crate::url::DomainTask;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use thiserror::Error;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Idle connections kept per host for reuse across tasks
const POOL_IDLE_PER_HOST: usize = 4;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after all redirects; relative references resolve against this
    pub final_url: Url,

    pub status_code: u16,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    pub body: String,

    /// Every URL requested before `final_url`, in order
    pub redirect_chain: Vec<Url>,
}

impl FetchedPage {
    /// Whether the server labelled the body as HTML
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(false)
    }
}

/// Why a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Exceeded redirect limit of {0}")]
    TooManyRedirects(u32),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Maps this error onto the crawl record taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::ConnectionFailure,
            Self::Timeout => FailureKind::Timeout,
            Self::TooManyRedirects(_) => FailureKind::TooManyRedirects,
            Self::Status(status) => FailureKind::HttpError(*status),
            Self::InvalidUrl(_) => FailureKind::InvalidUrl,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_builder() {
            Self::InvalidUrl(error.to_string())
        } else {
            // Refused, DNS, TLS, and resets mid-body all land here
            Self::Connection(error.to_string())
        }
    }
}

/// Builds the HTTP client shared by every worker
///
/// Redirects are disabled at the client level and followed by [`Fetcher`] so
/// the hop count can be bounded and shared across a scheme fallback.
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    Client::builder()
        .user_agent(user_agent.header_value())
        .default_headers(headers)
        .timeout(crawler.request_timeout())
        .connect_timeout(crawler.connect_timeout())
        .pool_max_idle_per_host(POOL_IDLE_PER_HOST)
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests on behalf of workers
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: u32,
}

impl Fetcher {
    pub fn new(client: Client, max_redirects: u32) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Builds a fetcher with a fresh client from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        Ok(Self::new(client, config.crawler.max_redirects))
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    /// Fetches a URL, following redirects up to the configured bound
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut remaining = self.max_redirects;
        self.follow(url.clone(), &mut remaining).await
    }

    /// Fetches an auxiliary resource whose absence is expected
    ///
    /// Any failure, including a non-2xx status, yields None.
    pub async fn fetch_optional(&self, url: &Url) -> Option<FetchedPage> {
        match self.fetch(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::debug!("Optional resource {} unavailable: {}", url, e);
                None
            }
        }
    }

    /// Fetches the home page of a domain task
    ///
    /// A connection-level failure on the defaulted `https` URL is retried
    /// once over `http`. Both attempts draw on one redirect budget.
    pub async fn fetch_domain(&self, task: &DomainTask) -> Result<FetchedPage, FetchError> {
        let mut remaining = self.max_redirects;

        match self.follow(task.primary_url().clone(), &mut remaining).await {
            Err(e) if e.kind().is_connection_level() => match task.fallback_url() {
                Some(fallback) => {
                    tracing::debug!(
                        "{} failed over https ({}), retrying {}",
                        task.domain(),
                        e,
                        fallback
                    );
                    self.follow(fallback, &mut remaining).await
                }
                None => Err(e),
            },
            result => result,
        }
    }

    /// Requests `url`, following redirects while `remaining` allows
    async fn follow(&self, mut url: Url, remaining: &mut u32) -> Result<FetchedPage, FetchError> {
        let mut redirect_chain = Vec::new();

        loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(FetchError::from_reqwest)?;

            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = response.headers().get(LOCATION) {
                    let target = redirect_target(&url, location)?;

                    if *remaining == 0 {
                        return Err(FetchError::TooManyRedirects(self.max_redirects));
                    }
                    *remaining -= 1;

                    tracing::trace!("Redirect {} {} -> {}", status.as_u16(), url, target);
                    redirect_chain.push(std::mem::replace(&mut url, target));
                    continue;
                }
            }

            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = response.text().await.map_err(FetchError::from_reqwest)?;

            return Ok(FetchedPage {
                final_url: url,
                status_code: status.as_u16(),
                content_type,
                body,
                redirect_chain,
            });
        }
    }
}

/// Resolves a `Location` header against the URL that returned it
fn redirect_target(current: &Url, location: &HeaderValue) -> Result<Url, FetchError> {
    let location = location
        .to_str()
        .map_err(|_| FetchError::InvalidUrl("non-ASCII Location header".to_string()))?;

    let mut target = current
        .join(location)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", location, e)))?;

    if target.scheme() != "http" && target.scheme() != "https" {
        return Err(FetchError::InvalidUrl(target.to_string()));
    }
    target.set_fragment(None);

    Ok(target)
}

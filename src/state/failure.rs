//! Failure taxonomy for a single domain task
//!
//! Failures are data: they end up on the crawl record and in the metrics,
//! never as an error that stops the run.

use std::fmt;

/// Why a domain task produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Could not connect (DNS, refused, TLS, reset mid-transfer)
    ConnectionFailure,

    /// Connect or read exceeded the per-request timeout
    Timeout,

    /// Redirect chain longer than the configured bound
    TooManyRedirects,

    /// Final response was neither 2xx nor a followable 3xx
    HttpError(u16),

    /// The input or a redirect target is not a usable http(s) URL
    InvalidUrl,

    /// The run was cancelled before this task was dispatched
    Cancelled,

    /// The worker processing this task faulted
    Internal,
}

impl FailureKind {
    /// Stable label used in logs, metrics and the optional CSV failure column
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConnectionFailure => "connection_failure",
            Self::Timeout => "timeout",
            Self::TooManyRedirects => "too_many_redirects",
            Self::HttpError(_) => "http_error",
            Self::InvalidUrl => "invalid_url",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }

    /// Whether a retry on the plain-HTTP scheme makes sense after this failure
    ///
    /// Only transport-level failures qualify. An HTTP error status means the
    /// server answered, so switching scheme would not help.
    pub fn is_connection_level(&self) -> bool {
        matches!(self, Self::ConnectionFailure | Self::Timeout)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError(status) => write!(f, "http_error_{}", status),
            other => f.write_str(other.label()),
        }
    }
}

use crate::extract::Strategy;
use crate::state::FailureKind;
use url::Url;

/// How a domain task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A logo was selected by the given strategy
    LogoFound(Strategy),

    /// The page was fetched but no strategy produced a usable candidate
    NoLogo,

    /// The task failed before extraction could run
    Failed(FailureKind),
}

/// The terminal, per-domain output
///
/// Exactly one record is produced per input domain. Once handed to the
/// emitter it is never revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    /// The input line this record answers, verbatim
    pub domain: String,

    /// Selected logo URL
    pub logo_url: Option<Url>,

    /// Selected favicon URL
    pub favicon_url: Option<Url>,

    pub outcome: Outcome,
}

impl CrawlRecord {
    /// Builds the record for a task that failed
    pub fn failed(domain: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            domain: domain.into(),
            logo_url: None,
            favicon_url: None,
            outcome: Outcome::Failed(kind),
        }
    }

    /// Builds the record for a page that was fetched and inspected
    pub fn extracted(
        domain: impl Into<String>,
        logo: Option<(Url, Strategy)>,
        favicon_url: Option<Url>,
    ) -> Self {
        let (logo_url, outcome) = match logo {
            Some((url, strategy)) => (Some(url), Outcome::LogoFound(strategy)),
            None => (None, Outcome::NoLogo),
        };
        Self {
            domain: domain.into(),
            logo_url,
            favicon_url,
            outcome,
        }
    }

    /// The failure kind, if the task failed
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.outcome {
            Outcome::Failed(kind) => Some(kind),
            _ => None,
        }
    }

    /// The strategy that produced the logo, if any
    pub fn strategy(&self) -> Option<Strategy> {
        match self.outcome {
            Outcome::LogoFound(strategy) => Some(strategy),
            _ => None,
        }
    }
}

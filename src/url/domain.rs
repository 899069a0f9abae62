use crate::{UrlError, UrlResult};
use url::Url;

/// A single unit of input: one domain to inspect
///
/// The task remembers the line it was built from so the crawl record can echo
/// it back verbatim. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTask {
    domain: String,
    primary: Url,
    scheme_defaulted: bool,
}

impl DomainTask {
    /// Builds a task from a raw input line
    ///
    /// Bare domains get an `https` scheme with `http` as a fallback. An
    /// explicit `http://` or `https://` prefix is honored as-is and disables
    /// the fallback.
    ///
    /// # Examples
    ///
    /// ```
    /// use logo_scout::url::DomainTask;
    ///
    /// let task = DomainTask::parse("Example.com").unwrap();
    /// assert_eq!(task.primary_url().as_str(), "https://example.com/");
    /// assert_eq!(task.fallback_url().unwrap().as_str(), "http://example.com/");
    /// ```
    pub fn parse(line: &str) -> UrlResult<Self> {
        let domain = line.trim();
        if domain.is_empty() {
            return Err(UrlError::Empty);
        }

        let scheme_defaulted = !domain.contains("://");
        let candidate = if scheme_defaulted {
            format!("https://{}", domain)
        } else {
            domain.to_string()
        };

        let primary = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

        if primary.scheme() != "http" && primary.scheme() != "https" {
            return Err(UrlError::InvalidScheme(primary.scheme().to_string()));
        }

        if primary.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingDomain);
        }

        Ok(Self {
            domain: domain.to_string(),
            primary,
            scheme_defaulted,
        })
    }

    /// The trimmed input line
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The URL tried first
    pub fn primary_url(&self) -> &Url {
        &self.primary
    }

    /// The plain-HTTP URL to try after a connection-level failure, if any
    pub fn fallback_url(&self) -> Option<Url> {
        if !self.scheme_defaulted || self.primary.scheme() != "https" {
            return None;
        }
        let mut fallback = self.primary.clone();
        fallback.set_scheme("http").ok()?;
        Some(fallback)
    }
}

/// Derives the brand token of a site from its host
///
/// `www.acme-widgets.co.uk` becomes `acme-widgets`. Hosts that are IP
/// addresses or whose token is shorter than three characters yield None, since
/// such short tokens match far too many attribute values to be useful.
pub fn site_name(url: &Url) -> Option<String> {
    let host = match url.host()? {
        url::Host::Domain(host) => host.to_lowercase(),
        _ => return None,
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let token = host.split('.').next()?;
    if token.len() < 3 {
        return None;
    }
    Some(token.to_string())
}

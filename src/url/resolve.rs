use crate::url::normalize::normalize_parsed;
use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a reference found in markup against the page it came from
///
/// `base` must be the page's final URL after redirects, so that relative
/// references land where the browser would load them.
///
/// Returns an error for empty references, for anything that does not end up
/// as an `http`/`https` URL (`data:`, `javascript:`, `mailto:`), and for
/// references that cannot be parsed. The result is normalized (see
/// [`normalize_url`](crate::url::normalize_url)); resolving an already
/// absolute, normalized URL returns it unchanged whatever the base.
///
/// # Examples
///
/// ```
/// use logo_scout::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/about/").unwrap();
/// let url = resolve("../img/logo.png", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/logo.png");
/// ```
pub fn resolve(reference: &str, base: &Url) -> UrlResult<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = base
        .join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    normalize_parsed(joined)
}

use crate::UrlError;
use url::Url;

/// Normalizes an absolute URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but `http` and `https`
/// 3. Require a host
/// 4. Collapse duplicate slashes in the path
/// 5. Remove the fragment
///
/// Host lowercasing and dot-segment removal are done by the parser. Query
/// strings are kept untouched because image URLs often carry cache-busting or
/// resizing parameters that matter to the server.
///
/// Normalizing a normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use logo_scout::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com//img///logo.png#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/logo.png");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
pub(crate) fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    if url.path().contains("//") {
        let collapsed = collapse_slashes(url.path());
        url.set_path(&collapsed);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Replaces every run of slashes in a path with a single slash
fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                collapsed.push(c);
            }
            previous_slash = true;
        } else {
            collapsed.push(c);
            previous_slash = false;
        }
    }

    collapsed
}

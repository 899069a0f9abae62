//! Strategy 5: favicon and web app manifest icons
//!
//! Markup-only parts live here. Fetching the manifest and probing
//! `/favicon.ico` need the network and are driven by the coordinator.

use crate::extract::candidate::{parse_sizes, Candidate, Strategy};
use crate::extract::markup::{attr, rel_tokens, Page};
use scraper::Selector;
use serde::Deserialize;

/// Link-declared icons (`icon`, `shortcut icon`, `apple-touch-icon`,
/// `mask-icon`, ...) and any link whose `href` names a favicon
pub fn icon_links(page: &Page) -> Vec<Candidate> {
    let Ok(link_selector) = Selector::parse("link[href]") else {
        return Vec::new();
    };
    let mut candidates = Vec::new();

    for (position, element) in page.select(&link_selector) {
        let Some(href) = attr(&element, "href") else {
            continue;
        };

        let rel = rel_tokens(&element);
        let is_icon = rel.iter().any(|token| token.contains("icon"))
            || (!rel.iter().any(|token| token == "stylesheet" || token == "preload")
                && href.to_ascii_lowercase().contains("favicon"));

        if is_icon {
            let size = attr(&element, "sizes").and_then(parse_sizes);
            candidates.push(Candidate::new(href, Strategy::Favicon, position).with_area(size));
        }
    }

    candidates
}

/// The `href` of the first `<link rel="manifest">`, if any
pub fn manifest_link(page: &Page) -> Option<String> {
    let manifest_selector = Selector::parse("link[rel][href]").ok()?;
    let href = page
        .select(&manifest_selector)
        .filter(|(_, element)| rel_tokens(element).iter().any(|token| token == "manifest"))
        .find_map(|(_, element)| attr(&element, "href").map(str::to_string));
    href
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    icons: Vec<ManifestIcon>,
}

#[derive(Debug, Deserialize)]
struct ManifestIcon {
    src: Option<String>,
    sizes: Option<String>,
}

/// Parses the `icons` array of a web app manifest
///
/// References are returned unresolved; they are relative to the manifest URL,
/// not the page. All icons share position 0 so the largest declared size wins
/// selection. Returns an empty list for anything that is not a manifest.
pub fn parse_manifest_icons(body: &str) -> Vec<Candidate> {
    let manifest: Manifest = match serde_json::from_str(body) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::debug!("Ignoring unparseable manifest: {}", e);
            return Vec::new();
        }
    };

    manifest
        .icons
        .into_iter()
        .filter_map(|icon| {
            let src = icon.src.filter(|src| !src.trim().is_empty())?;
            let size = icon.sizes.as_deref().and_then(parse_sizes);
            Some(Candidate::new(src, Strategy::Favicon, 0).with_area(size))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, Url::parse("https://example.com/").unwrap())
    }

    fn references(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.reference.as_str()).collect()
    }

    #[test]
    fn test_icon_variants() {
        let page = page(
            r#"<head>
                 <link rel="shortcut icon" href="/favicon.ico">
                 <link rel="apple-touch-icon" sizes="180x180" href="/apple.png">
                 <link rel="mask-icon" href="/mask.svg">
                 <link rel="stylesheet" href="/main.css">
               </head>"#,
        );
        let found = icon_links(&page);
        assert_eq!(
            references(&found),
            vec!["/favicon.ico", "/apple.png", "/mask.svg"]
        );
        assert_eq!(found[1].declared_area, Some(180 * 180));
    }

    #[test]
    fn test_href_named_favicon() {
        let page = page(r#"<link rel="alternate" href="/static/favicon.png">"#);
        assert_eq!(references(&icon_links(&page)), vec!["/static/favicon.png"]);
    }

    #[test]
    fn test_preloaded_favicon_is_ignored() {
        let page = page(r#"<link rel="preload" as="image" href="/favicon.png">"#);
        assert!(icon_links(&page).is_empty());
    }

    #[test]
    fn test_no_icons() {
        let page = page("<html><body><p>Just some text content</p></body></html>");
        assert!(icon_links(&page).is_empty());
        assert!(manifest_link(&page).is_none());
    }

    #[test]
    fn test_manifest_link() {
        let page = page(r#"<link rel="manifest" href="/site.webmanifest">"#);
        assert_eq!(manifest_link(&page), Some("/site.webmanifest".to_string()));
    }

    #[test]
    fn test_parse_manifest_icons() {
        let body = r#"{
            "name": "Example",
            "icons": [
                {"src": "icons/192.png", "sizes": "192x192", "type": "image/png"},
                {"src": "icons/512.png", "sizes": "512x512", "type": "image/png"},
                {"sizes": "48x48"}
            ]
        }"#;
        let icons = parse_manifest_icons(body);
        assert_eq!(references(&icons), vec!["icons/192.png", "icons/512.png"]);
        assert_eq!(icons[1].declared_area, Some(512 * 512));
        assert!(icons.iter().all(|c| c.strategy == Strategy::Favicon));
    }

    #[test]
    fn test_parse_manifest_without_icons() {
        assert!(parse_manifest_icons(r#"{"name": "x"}"#).is_empty());
        assert!(parse_manifest_icons("<html>not json</html>").is_empty());
    }
}

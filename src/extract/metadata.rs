//! Tag-based strategies: explicit logo declarations and social preview images

use crate::extract::candidate::{area, parse_dimension, parse_sizes, Candidate, Strategy};
use crate::extract::markup::{attr, attr_lower, rel_tokens, Page};
use scraper::Selector;

/// Meta properties carrying a social preview image
const SOCIAL_IMAGE_PROPERTIES: &[&str] = &[
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

/// Attributes checked, in order, for the reference of an `itemprop="logo"` element
const ITEMPROP_SOURCES: &[&str] = &["content", "src", "href", "data-src"];

/// Strategy 1: tags that declare a logo explicitly
///
/// Matches, in document order:
/// - any element with `itemprop="logo"`
/// - `<meta>` whose `name`, `property` or `itemprop` mentions `logo`
/// - `<link>` whose `rel` mentions `logo`, or an icon/image link whose `href`
///   names a logo file
pub fn logo_tags(page: &Page) -> Vec<Candidate> {
    let Ok(selector) = Selector::parse("[itemprop], meta[content], link[href]") else {
        return Vec::new();
    };
    let mut candidates = Vec::new();

    for (position, element) in page.select(&selector) {
        let name = element.value().name();

        if attr_lower(&element, "itemprop") == "logo" {
            let reference = ITEMPROP_SOURCES
                .iter()
                .find_map(|source| attr(&element, source));
            if let Some(reference) = reference {
                let size = area(
                    attr(&element, "width").and_then(parse_dimension),
                    attr(&element, "height").and_then(parse_dimension),
                );
                candidates
                    .push(Candidate::new(reference, Strategy::LogoTag, position).with_area(size));
            }
            continue;
        }

        match name {
            "meta" => {
                let labels_logo = ["name", "property", "itemprop"]
                    .iter()
                    .any(|key| attr_lower(&element, key).contains("logo"));
                if labels_logo {
                    if let Some(content) = attr(&element, "content") {
                        candidates.push(Candidate::new(content, Strategy::LogoTag, position));
                    }
                }
            }
            "link" => {
                let Some(href) = attr(&element, "href") else {
                    continue;
                };
                let rel = rel_tokens(&element);
                let rel_says_logo = rel.iter().any(|token| token.contains("logo"));
                let image_like_rel = rel
                    .iter()
                    .any(|token| token.contains("icon") || token == "image_src");

                if rel_says_logo || (image_like_rel && href_names_logo(href)) {
                    let size = attr(&element, "sizes").and_then(parse_sizes);
                    candidates
                        .push(Candidate::new(href, Strategy::LogoTag, position).with_area(size));
                }
            }
            _ => {}
        }
    }

    candidates
}

/// Strategy 2: Open Graph and Twitter Card preview images
///
/// `og:image:width` / `og:image:height` apply to the most recent `og:image`
/// before them, following the Open Graph structured property convention.
pub fn social_images(page: &Page) -> Vec<Candidate> {
    let Ok(selector) = Selector::parse("meta[content], link[href]") else {
        return Vec::new();
    };
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut last_og: Option<usize> = None;
    let mut width: Option<u64> = None;
    let mut height: Option<u64> = None;

    for (position, element) in page.select(&selector) {
        match element.value().name() {
            "meta" => {
                let key = meta_key(&element);
                let Some(content) = attr(&element, "content") else {
                    continue;
                };

                if SOCIAL_IMAGE_PROPERTIES.contains(&key.as_str()) {
                    if key.starts_with("og:") {
                        last_og = Some(candidates.len());
                        width = None;
                        height = None;
                    }
                    candidates.push(Candidate::new(content, Strategy::SocialImage, position));
                } else if key == "og:image:width" || key == "og:image:height" {
                    if key.ends_with("width") {
                        width = parse_dimension(content);
                    } else {
                        height = parse_dimension(content);
                    }
                    if let Some(candidate) = last_og.and_then(|i| candidates.get_mut(i)) {
                        candidate.declared_area = area(width, height);
                    }
                }
            }
            "link" => {
                if rel_tokens(&element).iter().any(|token| token == "image_src") {
                    if let Some(href) = attr(&element, "href") {
                        candidates.push(Candidate::new(href, Strategy::SocialImage, position));
                    }
                }
            }
            _ => {}
        }
    }

    candidates
}

/// The identifying key of a `<meta>` element: `property`, else `name`
fn meta_key(element: &scraper::ElementRef<'_>) -> String {
    let property = attr_lower(element, "property");
    if property.is_empty() {
        attr_lower(element, "name")
    } else {
        property
    }
}

/// Whether the file part of a reference mentions a logo
fn href_names_logo(href: &str) -> bool {
    let path = href.split(|c: char| c == '?' || c == '#').next().unwrap_or(href);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.to_ascii_lowercase().contains("logo")
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
    fn test_icon_link_named_logo() {
        let page = page(r#"<html><head><link rel="icon" href="/logo.png"></head></html>"#);
        let found = logo_tags(&page);
        assert_eq!(references(&found), vec!["/logo.png"]);
        assert_eq!(found[0].strategy, Strategy::LogoTag);
    }

    #[test]
    fn test_plain_icon_link_is_not_a_logo_tag() {
        let page = page(r#"<html><head><link rel="icon" href="/favicon.ico"></head></html>"#);
        assert!(logo_tags(&page).is_empty());
    }

    #[test]
    fn test_stylesheet_named_logo_is_ignored() {
        let page = page(r#"<link rel="stylesheet" href="/css/logo.css">"#);
        assert!(logo_tags(&page).is_empty());
    }

    #[test]
    fn test_logo_only_in_directory_is_ignored() {
        let page = page(r#"<link rel="icon" href="/logos/favicon.ico">"#);
        assert!(logo_tags(&page).is_empty());
    }

    #[test]
    fn test_itemprop_logo_img() {
        let page = page(
            r#"<div itemscope itemtype="https://schema.org/Organization">
                 <img itemprop="logo" src="/brand/mark.svg" width="120" height="40">
               </div>"#,
        );
        let found = logo_tags(&page);
        assert_eq!(references(&found), vec!["/brand/mark.svg"]);
        assert_eq!(found[0].declared_area, Some(4800));
    }

    #[test]
    fn test_meta_itemprop_logo_counted_once() {
        let page = page(r#"<meta itemprop="logo" content="https://cdn.example.com/l.png">"#);
        assert_eq!(
            references(&logo_tags(&page)),
            vec!["https://cdn.example.com/l.png"]
        );
    }

    #[test]
    fn test_meta_property_logo() {
        let page = page(r#"<meta property="og:logo" content="/og-logo.png">"#);
        assert_eq!(references(&logo_tags(&page)), vec!["/og-logo.png"]);
    }

    #[test]
    fn test_rel_logo_link() {
        let page = page(r#"<link rel="logo" type="image/svg" href="/mark.svg">"#);
        assert_eq!(references(&logo_tags(&page)), vec!["/mark.svg"]);
    }

    #[test]
    fn test_logo_tags_in_document_order() {
        let page = page(
            r#"<head><meta name="logo" content="/first.png"><link rel="logo" href="/second.svg"></head>"#,
        );
        let found = logo_tags(&page);
        assert_eq!(references(&found), vec!["/first.png", "/second.svg"]);
        assert!(found[0].position < found[1].position);
    }

    #[test]
    fn test_og_image() {
        let page = page(
            r#"<head>
                 <meta property="og:image" content="/social.png">
                 <meta property="og:image:width" content="1200">
                 <meta property="og:image:height" content="630">
               </head>"#,
        );
        let found = social_images(&page);
        assert_eq!(references(&found), vec!["/social.png"]);
        assert_eq!(found[0].declared_area, Some(1200 * 630));
    }

    #[test]
    fn test_twitter_image_by_name() {
        let page = page(r#"<meta name="twitter:image" content="https://example.com/card.jpg">"#);
        assert_eq!(
            references(&social_images(&page)),
            vec!["https://example.com/card.jpg"]
        );
    }

    #[test]
    fn test_image_src_link() {
        let page = page(r#"<link rel="image_src" href="/share.png">"#);
        assert_eq!(references(&social_images(&page)), vec!["/share.png"]);
    }

    #[test]
    fn test_unrelated_meta_is_ignored() {
        let page = page(
            r#"<meta property="og:title" content="Example"><meta name="description" content="x">"#,
        );
        assert!(social_images(&page).is_empty());
    }

    #[test]
    fn test_meta_without_content_is_ignored() {
        let page = page(r#"<meta property="og:image" content="  ">"#);
        assert!(social_images(&page).is_empty());
    }
}

//! Strategy 4: heuristic scan of `<img>` elements
//!
//! This is the fuzziest strategy and the one most worth tuning. An image
//! qualifies when its own attributes, or the attributes of an enclosing
//! element, carry a logo-indicating token. Qualifying images are scored:
//!
//! | Evidence | Points |
//! |----------|--------|
//! | `logo` in alt/class/id/title/source | 4 |
//! | `logo` in an ancestor's class/id | 2 |
//! | `brand` anywhere in the above | 2 |
//! | site name in alt/title/source | 1 |
//! | inside `<header>`, `<nav>`, `role="banner"` or a header-like class | 3 |
//!
//! Ties go to the first image in document order.

use crate::extract::candidate::{area, parse_dimension, Candidate, Strategy};
use crate::extract::markup::{attr, attr_lower, element_ancestors, Page};
use crate::url::site_name;
use scraper::{ElementRef, Selector};

/// Attributes checked, in order, for the image source (lazy loaders included)
const SOURCE_ATTRIBUTES: &[&str] = &[
    "src",
    "data-src",
    "data-lazy",
    "data-lazy-src",
    "data-original",
];

const HEADER_TOKENS: &[&str] = &["header", "masthead", "navbar", "topbar", "site-nav"];

/// How many ancestors up to look for logo-labelled wrappers and header markup
const ANCESTOR_DEPTH: usize = 8;

const OWN_LOGO_POINTS: u32 = 4;
const ANCESTOR_LOGO_POINTS: u32 = 2;
const BRAND_POINTS: u32 = 2;
const SITE_NAME_POINTS: u32 = 1;
const HEADER_POINTS: u32 = 3;

/// Scans `<img>` elements for logo-like images
pub fn image_heuristic(page: &Page) -> Vec<Candidate> {
    let Ok(img_selector) = Selector::parse("img") else {
        return Vec::new();
    };
    let site = site_name(page.base());
    let mut candidates = Vec::new();

    for (position, element) in page.select(&img_selector) {
        let Some(source) = image_source(&element) else {
            continue;
        };

        let score = score_image(&element, &source, site.as_deref());
        if score == 0 {
            continue;
        }

        let size = area(
            attr(&element, "width").and_then(parse_dimension),
            attr(&element, "height").and_then(parse_dimension),
        );
        candidates.push(
            Candidate::new(source, Strategy::ImageHeuristic, position)
                .with_score(score)
                .with_area(size),
        );
    }

    candidates
}

/// Picks the image source, honoring lazy-loading attributes and `srcset`
fn image_source(element: &ElementRef<'_>) -> Option<String> {
    SOURCE_ATTRIBUTES
        .iter()
        .filter_map(|name| attr(element, name))
        .find(|value| !value.starts_with("data:"))
        .map(str::to_string)
        .or_else(|| {
            attr(element, "srcset")
                .and_then(|srcset| srcset.split(',').next())
                .and_then(|entry| entry.split_whitespace().next())
                .map(str::to_string)
        })
}

/// Scores an image; zero means it does not qualify
fn score_image(element: &ElementRef<'_>, source: &str, site: Option<&str>) -> u32 {
    let own = [
        attr_lower(element, "alt"),
        attr_lower(element, "class"),
        attr_lower(element, "id"),
        attr_lower(element, "title"),
        source.to_ascii_lowercase(),
    ]
    .join(" ");

    let mut ancestor_labels = String::new();
    let mut in_header = false;
    for ancestor in element_ancestors(element).take(ANCESTOR_DEPTH) {
        let labels = format!(
            "{} {}",
            attr_lower(&ancestor, "class"),
            attr_lower(&ancestor, "id")
        );
        let name = ancestor.value().name();
        if name == "header"
            || name == "nav"
            || attr_lower(&ancestor, "role") == "banner"
            || HEADER_TOKENS.iter().any(|token| labels.contains(token))
        {
            in_header = true;
        }
        ancestor_labels.push_str(&labels);
        ancestor_labels.push(' ');
    }

    let mut score = 0;
    if own.contains("logo") {
        score += OWN_LOGO_POINTS;
    }
    if ancestor_labels.contains("logo") {
        score += ANCESTOR_LOGO_POINTS;
    }
    if own.contains("brand") || ancestor_labels.contains("brand") {
        score += BRAND_POINTS;
    }
    if let Some(site) = site {
        let named = [
            attr_lower(element, "alt"),
            attr_lower(element, "title"),
            source.to_ascii_lowercase(),
        ];
        if named.iter().any(|value| value.contains(site)) {
            score += SITE_NAME_POINTS;
        }
    }

    // Header placement only boosts images that already look like a logo
    if score > 0 && in_header {
        score += HEADER_POINTS;
    }

    score
}

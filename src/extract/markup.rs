//! Parsed page wrapper shared by all strategies
//!
//! Strategies pick their elements with [`Page::select`], which yields matches
//! in document order together with their index among all elements. Candidates
//! carry that index as their position, which keeps selection deterministic
//! across strategies.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fetched HTML document and the URL it was served from
pub struct Page {
    document: Html,
    base: Url,
}

impl Page {
    /// Parses HTML content
    ///
    /// `base` should be the final URL after redirects. Parsing never fails:
    /// html5ever recovers from malformed markup, and an empty body yields an
    /// empty document.
    pub fn parse(html: &str, base: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// All elements in document order, with their document-order index
    pub fn elements(&self) -> impl Iterator<Item = (usize, ElementRef<'_>)> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
    }

    /// Elements matching `selector`, in document order, with their index
    pub fn select<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = (usize, ElementRef<'a>)> + 'a {
        self.elements()
            .filter(move |(_, element)| selector.matches(element))
    }
}

/// Returns an attribute value, trimmed, or None when missing or blank
pub(crate) fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Returns an attribute value lowercased, or an empty string when missing
pub(crate) fn attr_lower(element: &ElementRef<'_>, name: &str) -> String {
    attr(element, name)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Splits the `rel` attribute into lowercase tokens
pub(crate) fn rel_tokens(element: &ElementRef<'_>) -> Vec<String> {
    attr_lower(element, "rel")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Returns the ancestors of an element that are themselves elements,
/// nearest first
pub(crate) fn element_ancestors<'a>(
    element: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    element.ancestors().filter_map(ElementRef::wrap)
}

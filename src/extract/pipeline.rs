//! Extraction pipeline: runs the strategies in priority order over one page
//!
//! # Policy
//!
//! 1. Strategies 1-4 run in order. The first one that yields at least one
//!    usable candidate (one that resolves to an http(s) URL) wins, and its
//!    best candidate becomes the logo. Low confidence never triggers a
//!    fallback, only an empty or unusable result does.
//! 2. Strategy 5 (icons) always runs, since it fills the favicon field on its
//!    own. Its result doubles as the logo of last resort, which the
//!    coordinator applies once manifest icons are known.

use crate::extract::candidate::{Candidate, Strategy};
use crate::extract::favicon::{icon_links, manifest_link};
use crate::extract::heuristic::image_heuristic;
use crate::extract::markup::Page;
use crate::extract::metadata::{logo_tags, social_images};
use crate::extract::structured::structured_data;
use crate::url::resolve;
use url::Url;

/// Shared shape of every strategy: markup in, ranked candidates out
pub type StrategyFn = fn(&Page) -> Vec<Candidate>;

/// Every markup strategy, in priority order
pub const STRATEGIES: [(Strategy, StrategyFn); 5] = [
    (Strategy::LogoTag, logo_tags),
    (Strategy::SocialImage, social_images),
    (Strategy::StructuredData, structured_data),
    (Strategy::ImageHeuristic, image_heuristic),
    (Strategy::Favicon, icon_links),
];

/// A candidate together with the absolute URL it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: Candidate,
    pub url: Url,
}

impl Selection {
    pub fn strategy(&self) -> Strategy {
        self.candidate.strategy
    }
}

/// What the pipeline found on one page
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Best logo from strategies 1-4
    pub logo: Option<Selection>,

    /// Best link-declared icon
    pub icon: Option<Selection>,

    /// Resolved `<link rel="manifest">` target, for the coordinator to fetch
    pub manifest_url: Option<Url>,
}

/// Runs every markup strategy and returns all candidates
///
/// Candidates come grouped by strategy in priority order, and within a
/// strategy in preference order. References are left unresolved.
pub fn extract(html: &str, base: &Url) -> Vec<Candidate> {
    let page = Page::parse(html, base.clone());
    STRATEGIES
        .iter()
        .flat_map(|(_, strategy)| ranked(strategy(&page)))
        .collect()
}

/// Parses a page and applies the pipeline policy
pub fn inspect(html: &str, base: &Url) -> Extraction {
    let page = Page::parse(html, base.clone());
    inspect_page(&page)
}

/// Applies the pipeline policy to an already parsed page
pub fn inspect_page(page: &Page) -> Extraction {
    let mut logo = None;

    for (strategy, run) in STRATEGIES.iter().filter(|(s, _)| *s != Strategy::Favicon) {
        let candidates = run(page);
        let found = candidates.len();
        match select_best(candidates, page.base()) {
            Some(selection) => {
                tracing::debug!(
                    "Strategy {} selected {} ({} candidates)",
                    strategy,
                    selection.url,
                    found
                );
                logo = Some(selection);
                break;
            }
            None if found > 0 => {
                tracing::debug!(
                    "Strategy {} yielded {} candidates, none usable",
                    strategy,
                    found
                );
            }
            None => {}
        }
    }

    let icon = select_best(icon_links(page), page.base());
    let manifest_url = manifest_link(page).and_then(|href| resolve(&href, page.base()).ok());

    Extraction {
        logo,
        icon,
        manifest_url,
    }
}

/// Picks the most preferred candidate that resolves against `base`
///
/// Candidates that fail resolution (`data:` URIs, `javascript:`, garbage) are
/// skipped rather than ending the search.
pub fn select_best(candidates: Vec<Candidate>, base: &Url) -> Option<Selection> {
    ranked(candidates).into_iter().find_map(|candidate| {
        match resolve(&candidate.reference, base) {
            Ok(url) => Some(Selection { candidate, url }),
            Err(e) => {
                tracing::trace!("Unusable candidate {:?}: {}", candidate.reference, e);
                None
            }
        }
    })
}

/// Sorts candidates into preference order; stable, so emission order breaks ties
fn ranked(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| a.preference(b));
    candidates
}

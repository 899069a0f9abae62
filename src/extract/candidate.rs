use std::cmp::{Ordering, Reverse};
use std::fmt;

/// Extraction strategies in priority order (highest confidence first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// Tags that explicitly label a logo (`itemprop="logo"`, `rel="logo"`, ...)
    LogoTag,

    /// Open Graph / Twitter Card preview images
    SocialImage,

    /// JSON-LD `logo` / `image` fields of organization-like entities
    StructuredData,

    /// `<img>` elements whose attributes or surroundings suggest a logo
    ImageHeuristic,

    /// Link-declared icons and web app manifest icons
    Favicon,
}

impl Strategy {
    /// All strategies, in priority order
    pub const ALL: [Strategy; 5] = [
        Strategy::LogoTag,
        Strategy::SocialImage,
        Strategy::StructuredData,
        Strategy::ImageHeuristic,
        Strategy::Favicon,
    ];

    /// Fixed confidence rank, 1 being the most trusted
    pub fn rank(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Zero-based position in [`Strategy::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::LogoTag => 0,
            Self::SocialImage => 1,
            Self::StructuredData => 2,
            Self::ImageHeuristic => 3,
            Self::Favicon => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LogoTag => "logo_tag",
            Self::SocialImage => "social_image",
            Self::StructuredData => "structured_data",
            Self::ImageHeuristic => "image_heuristic",
            Self::Favicon => "favicon",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single extraction hit: an unresolved reference to a possible logo or icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The reference exactly as found in the markup (trimmed)
    pub reference: String,

    /// The strategy that found it
    pub strategy: Strategy,

    /// Document-order index of the element it came from
    pub position: usize,

    /// Heuristic weight, only used by the image heuristic; zero elsewhere
    pub score: u32,

    /// Declared pixel area (width x height) when the markup states one
    pub declared_area: Option<u64>,
}

impl Candidate {
    pub fn new(reference: impl Into<String>, strategy: Strategy, position: usize) -> Self {
        Self {
            reference: reference.into().trim().to_string(),
            strategy,
            position,
            score: 0,
            declared_area: None,
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn with_area(mut self, area: Option<u64>) -> Self {
        self.declared_area = area;
        self
    }

    pub fn confidence_rank(&self) -> u8 {
        self.strategy.rank()
    }

    /// Orders two candidates of the same strategy, preferred first
    ///
    /// Higher heuristic score wins, then earlier document position, then the
    /// larger declared area. Candidates without a declared area lose to ones
    /// with any area. Equal keys compare equal, so a stable sort keeps
    /// emission order as the final tie-break.
    pub fn preference(&self, other: &Self) -> Ordering {
        let key = |c: &Self| (Reverse(c.score), c.position, Reverse(c.declared_area));
        key(self).cmp(&key(other))
    }
}

/// Parses a `WxH` dimension pair into a pixel area
///
/// Accepts the `sizes` attribute syntax, including several space-separated
/// pairs (the largest wins). `any` and garbage yield None.
pub(crate) fn parse_sizes(sizes: &str) -> Option<u64> {
    sizes
        .split_whitespace()
        .filter_map(|pair| {
            let (w, h) = pair.to_ascii_lowercase().split_once('x').map(|(w, h)| {
                (w.trim().parse::<u64>().ok(), h.trim().parse::<u64>().ok())
            })?;
            Some(w?.saturating_mul(h?))
        })
        .max()
}

/// Parses a single dimension value such as `"120"`, `"120px"` or `120.0`
pub(crate) fn parse_dimension(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let parsed = digits.parse::<f64>().ok()?;
    if parsed.is_finite() && parsed > 0.0 {
        Some(parsed as u64)
    } else {
        None
    }
}

/// Combines optional width and height into an area
pub(crate) fn area(width: Option<u64>, height: Option<u64>) -> Option<u64> {
    match (width, height) {
        (Some(w), Some(h)) => Some(w.saturating_mul(h)),
        (Some(side), None) | (None, Some(side)) => Some(side.saturating_mul(side)),
        (None, None) => None,
    }
}

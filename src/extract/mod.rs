//! Logo and icon extraction
//!
//! Each strategy is a pure function from a parsed [`Page`] to a list of
//! [`Candidate`]s, independently testable against literal HTML. The
//! [`pipeline`] module runs them in priority order and applies the fallback
//! policy:
//!
//! 1. Explicit logo tags
//! 2. Social preview images (Open Graph / Twitter Card)
//! 3. JSON-LD structured data
//! 4. Heuristic `<img>` scan
//! 5. Favicon / manifest icons (always run, fills the favicon field)

mod candidate;
mod favicon;
mod heuristic;
mod markup;
mod metadata;
pub mod pipeline;
mod structured;

pub use candidate::{Candidate, Strategy};
pub use favicon::{icon_links, manifest_link, parse_manifest_icons};
pub use heuristic::image_heuristic;
pub use markup::Page;
pub use metadata::{logo_tags, social_images};
pub use pipeline::{extract, inspect, inspect_page, select_best, Extraction, Selection};
pub use structured::structured_data;

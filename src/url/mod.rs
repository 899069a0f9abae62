//! URL handling module for Logo-Scout
//!
//! This module turns raw input lines into domain tasks, resolves references
//! found in markup against the page they came from, and normalizes the result.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{site_name, DomainTask};
pub use normalize::normalize_url;
pub use resolve::resolve;

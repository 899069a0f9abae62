//! State module for per-domain crawl results
//!
//! # Components
//!
//! - `CrawlRecord`: the terminal, per-domain output handed to the result emitter
//! - `Outcome`: how a domain task ended (logo found, no logo, failed)
//! - `FailureKind`: the taxonomy of per-domain failures

mod crawl_record;
mod failure;

// Re-export main types
pub use crawl_record::{CrawlRecord, Outcome};
pub use failure::FailureKind;

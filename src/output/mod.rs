//! Output module for emitting crawl results and run statistics
//!
//! This module handles:
//! - Streaming crawl records as CSV rows
//! - The emitter trait other sinks implement
//! - Reporting the end-of-run statistics

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::CsvEmitter;
pub use stats::print_summary;
pub use traits::{OutputError, OutputResult, ResultEmitter};

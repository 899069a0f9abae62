//! Result emitter trait and errors
//!
//! An emitter receives crawl records as workers finish them, in completion
//! order, and owns their serialization.

use crate::state::CrawlRecord;
use thiserror::Error;

/// Errors that can occur while emitting results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result emitters
///
/// Each record is emitted exactly once and never revised afterwards.
pub trait ResultEmitter {
    /// Writes one crawl record
    fn emit(&mut self, record: &CrawlRecord) -> OutputResult<()>;

    /// Flushes anything still buffered once the run is over
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Collects records in memory, mostly useful in tests and for re-sorting
impl ResultEmitter for Vec<CrawlRecord> {
    fn emit(&mut self, record: &CrawlRecord) -> OutputResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

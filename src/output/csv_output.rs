//! CSV result emitter
//!
//! Writes one row per crawl record with the header
//! `domain,logo_url,favicon_url`, plus a `failure` column when failure
//! annotation is enabled. Missing URLs render as empty fields. Every row is
//! flushed as soon as it is written so output streams while the crawl runs.

use crate::output::traits::{OutputError, OutputResult, ResultEmitter};
use crate::state::CrawlRecord;
use std::io::Write;

const HEADER: [&str; 3] = ["domain", "logo_url", "favicon_url"];
const FAILURE_COLUMN: &str = "failure";

/// Streams crawl records as CSV rows
pub struct CsvEmitter<W: Write> {
    writer: csv::Writer<W>,
    annotate_failures: bool,
    rows: u64,
}

impl<W: Write> CsvEmitter<W> {
    /// Creates the emitter and writes the header row
    pub fn new(inner: W, annotate_failures: bool) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);

        if annotate_failures {
            writer.write_record(HEADER.iter().chain(std::iter::once(&FAILURE_COLUMN)))?;
        } else {
            writer.write_record(HEADER)?;
        }
        writer.flush()?;

        Ok(Self {
            writer,
            annotate_failures,
            rows: 0,
        })
    }

    /// Number of data rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl<W: Write> ResultEmitter for CsvEmitter<W> {
    fn emit(&mut self, record: &CrawlRecord) -> OutputResult<()> {
        let logo = record.logo_url.as_ref().map(|u| u.as_str()).unwrap_or("");
        let favicon = record.favicon_url.as_ref().map(|u| u.as_str()).unwrap_or("");

        if self.annotate_failures {
            let failure = record
                .failure_kind()
                .map(|kind| kind.to_string())
                .unwrap_or_default();
            self.writer
                .write_record([record.domain.as_str(), logo, favicon, failure.as_str()])?;
        } else {
            self.writer
                .write_record([record.domain.as_str(), logo, favicon])?;
        }

        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!("Wrote {} CSV rows", self.rows);
        Ok(())
    }
}

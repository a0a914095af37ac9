//! Per-file processing counters
//!
//! `ProcessMetrics` is updated once per line by the processor and turned
//! into a `ProcessSummary` when the file is done.

use crate::core::RecordKind;
use crate::source::Compression;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of one successfully processed file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub path: PathBuf,
    pub compression: Compression,
    /// Every line read from the source, header lines included
    pub lines_read: u64,
    pub header_lines_skipped: u64,
    /// Lines rejected by the line filter
    pub lines_filtered: u64,
    /// Lines the parser rejected (dropped, substituted or not)
    pub bad_lines: u64,
    /// Bad lines replaced by a record from the bad line handler
    pub substituted: u64,
    /// Records rejected by the record filter
    pub records_filtered: u64,
    pub quotes: u64,
    pub trades: u64,
    pub open_interest: u64,
    pub other: u64,
    /// Records handed to an aggregator
    pub dispatched: u64,
    pub elapsed_micros: u64,
}

impl ProcessSummary {
    /// Records dispatched to one category
    pub fn dispatched_to(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::Quote => self.quotes,
            RecordKind::Trade => self.trades,
            RecordKind::OpenInterest => self.open_interest,
            RecordKind::Other => self.other,
        }
    }

    /// Lines per second over the whole run
    pub fn lines_per_second(&self) -> f64 {
        if self.elapsed_micros == 0 {
            return 0.0;
        }
        self.lines_read as f64 * 1_000_000.0 / self.elapsed_micros as f64
    }
}

/// Counter set for the file currently being processed
#[derive(Debug)]
pub struct ProcessMetrics {
    summary: ProcessSummary,
    start_time: Instant,
}

impl ProcessMetrics {
    pub fn start(path: PathBuf, compression: Compression) -> Self {
        Self {
            summary: ProcessSummary {
                path,
                compression,
                ..ProcessSummary::default()
            },
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn record_line(&mut self) {
        self.summary.lines_read += 1;
    }

    #[inline]
    pub fn record_header_skip(&mut self) {
        self.summary.header_lines_skipped += 1;
    }

    #[inline]
    pub fn record_filtered_line(&mut self) {
        self.summary.lines_filtered += 1;
    }

    #[inline]
    pub fn record_bad_line(&mut self) {
        self.summary.bad_lines += 1;
    }

    #[inline]
    pub fn record_substitute(&mut self) {
        self.summary.substituted += 1;
    }

    #[inline]
    pub fn record_filtered_record(&mut self) {
        self.summary.records_filtered += 1;
    }

    #[inline]
    pub fn record_dispatch(&mut self, kind: RecordKind) {
        let counter = match kind {
            RecordKind::Quote => &mut self.summary.quotes,
            RecordKind::Trade => &mut self.summary.trades,
            RecordKind::OpenInterest => &mut self.summary.open_interest,
            RecordKind::Other => &mut self.summary.other,
        };
        *counter += 1;
        self.summary.dispatched += 1;
    }

    pub fn finish(mut self) -> ProcessSummary {
        self.summary.elapsed_micros = self.start_time.elapsed().as_micros() as u64;
        self.summary
    }
}

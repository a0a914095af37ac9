//! Streaming market data file ingestion
//!
//! Core library for turning a (possibly compressed) line-oriented text file
//! of market events into typed records routed to per-category aggregators,
//! in one pass and with one line resident at a time.

pub mod core;
pub mod infrastructure;
pub mod parsing;
pub mod pipeline;
pub mod source;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use infrastructure::config::Config;
pub use infrastructure::metrics::ProcessSummary;
pub use pipeline::processor::TextFileProcessor;
pub use source::Compression;

use std::path::PathBuf;
use thiserror::Error;

use crate::parsing::ParseError;

/// Main error type for file ingestion
#[derive(Error, Debug)]
pub enum TickIngestError {
    /// Invalid compression scheme, filter pattern or config value.
    /// Always raised before the first line is read.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error reading {} after line {line_number}: {source}", path.display())]
    Read {
        path: PathBuf,
        line_number: u64,
        #[source]
        source: std::io::Error,
    },

    /// Malformed line escalated by the bad line handler
    #[error("{}:{line_number}: malformed line {line:?}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line_number: u64,
        line: String,
        #[source]
        source: ParseError,
    },
}

impl TickIngestError {
    /// Line number that triggered the error, if it happened mid-stream
    pub fn line_number(&self) -> Option<u64> {
        match self {
            Self::Read { line_number, .. } | Self::Parse { line_number, .. } => Some(*line_number),
            Self::Config(_) | Self::Open { .. } => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TickIngestError>;

//! Line parsers
//!
//! The grammar is pluggable: anything implementing `RecordParser` can feed
//! the pipeline. `DelimitedRecordParser` is the bundled grammar.

pub mod delimited;

pub use delimited::DelimitedRecordParser;

use crate::core::{Record, RecordKind};
use thiserror::Error;

/// Why a line could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown record type {0:?}")]
    UnknownRecordType(String),

    #[error("{kind} record needs {expected} fields, found {found}")]
    FieldCount {
        kind: RecordKind,
        expected: usize,
        found: usize,
    },

    #[error("invalid {field} {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid quote side {0:?}")]
    InvalidSide(String),

    #[error("empty instrument id")]
    EmptyId,

    /// Raised before the parser runs; the grammar only ever sees text
    #[error("line is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// Failure reported by an external grammar
    #[error("{0}")]
    Custom(String),
}

/// Line to record conversion
pub trait RecordParser {
    /// Parse one accepted line. `line_number` is stored on the record.
    fn parse(&mut self, line_number: u64, line: &str) -> Result<Record, ParseError>;
}

impl<F> RecordParser for F
where
    F: FnMut(u64, &str) -> Result<Record, ParseError>,
{
    #[inline]
    fn parse(&mut self, line_number: u64, line: &str) -> Result<Record, ParseError> {
        self(line_number, line)
    }
}

/// Parse a signed integer timestamp
#[inline]
pub fn parse_timestamp(token: &str) -> Result<i64, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        field: "timestamp",
        value: token.to_string(),
    })
}

/// True for tokens that mark a missing price or quantity
#[inline]
pub fn is_missing_marker(token: &str) -> bool {
    matches!(token, "" | "NaN" | "nan" | "NAN" | "NA")
}

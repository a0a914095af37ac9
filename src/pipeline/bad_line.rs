//! Recovery policy for lines the parser rejects
//!
//! The only recovery point in the pipeline. `Ok` keeps the file going,
//! `Err` escalates and aborts the whole file.

use crate::core::Record;
use crate::parsing::ParseError;

/// Log target for malformed line diagnostics
pub const BAD_LINE_TARGET: &str = "bad_line";

/// Non-escalating outcome of a parse failure
#[derive(Debug, Clone, PartialEq)]
pub enum BadLineOutcome {
    /// Skip the line
    Drop,
    /// Continue with a replacement record
    Substitute(Record),
}

/// Called with every line the parser rejected
pub trait BadLineHandler {
    /// Return `Err` with the original error to abort processing
    fn handle(
        &mut self,
        line_number: u64,
        line: &str,
        error: ParseError,
    ) -> Result<BadLineOutcome, ParseError>;
}

impl<F> BadLineHandler for F
where
    F: FnMut(u64, &str, ParseError) -> Result<BadLineOutcome, ParseError>,
{
    #[inline]
    fn handle(
        &mut self,
        line_number: u64,
        line: &str,
        error: ParseError,
    ) -> Result<BadLineOutcome, ParseError> {
        self(line_number, line, error)
    }
}

/// Logs the malformed line, then either drops it or escalates
#[derive(Debug, Clone, Default)]
pub struct PrintBadLineHandler {
    raise: bool,
    reported: u64,
}

impl PrintBadLineHandler {
    /// `raise = true` turns every malformed line into a fatal error
    pub fn new(raise: bool) -> Self {
        Self { raise, reported: 0 }
    }

    pub fn raises(&self) -> bool {
        self.raise
    }

    /// Number of diagnostics emitted so far
    pub fn reported(&self) -> u64 {
        self.reported
    }
}

impl BadLineHandler for PrintBadLineHandler {
    fn handle(
        &mut self,
        line_number: u64,
        line: &str,
        error: ParseError,
    ) -> Result<BadLineOutcome, ParseError> {
        self.reported += 1;
        if self.raise {
            tracing::error!(
                target: BAD_LINE_TARGET,
                line_number,
                line,
                error = %error,
                "malformed line, aborting file"
            );
            return Err(error);
        }

        tracing::warn!(
            target: BAD_LINE_TARGET,
            line_number,
            line,
            error = %error,
            "skipping malformed line"
        );
        Ok(BadLineOutcome::Drop)
    }
}

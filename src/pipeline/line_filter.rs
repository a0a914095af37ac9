//! Raw line filters
//!
//! Applied before any parsing. A rejected line is skipped silently.

use crate::{Result, TickIngestError};
use regex::Regex;

/// Accept/reject a raw line
pub trait LineFilter {
    fn matches(&self, line: &str) -> bool;
}

impl<F> LineFilter for F
where
    F: Fn(&str) -> bool,
{
    #[inline]
    fn matches(&self, line: &str) -> bool {
        self(line)
    }
}

/// Accepts lines where the pattern matches anywhere (search, not full match)
#[derive(Debug, Clone)]
pub struct RegexLineFilter {
    pattern: Regex,
}

impl RegexLineFilter {
    /// Compile `pattern`; an invalid pattern is a configuration error
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            TickIngestError::Config(format!("invalid line filter pattern {pattern:?}: {e}"))
        })?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl LineFilter for RegexLineFilter {
    #[inline]
    fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Accepts lines containing at least one of the patterns.
/// An empty pattern set accepts nothing.
#[derive(Debug, Clone, Default)]
pub struct SubstringLineFilter {
    patterns: Vec<String>,
}

impl SubstringLineFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl LineFilter for SubstringLineFilter {
    #[inline]
    fn matches(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| line.contains(p.as_str()))
    }
}

/// Negates the wrapped filter, turning an include list into an exclude list
#[derive(Debug, Clone)]
pub struct Inverted<F>(pub F);

impl<F: LineFilter> LineFilter for Inverted<F> {
    #[inline]
    fn matches(&self, line: &str) -> bool {
        !self.0.matches(line)
    }
}

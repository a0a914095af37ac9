//! Canonical field splitting
//!
//! One rule turns a line into its field list: split on a single delimiter
//! byte, no quoting, no trimming, empty tokens kept. Parsers store the
//! resulting list on the record so record filters index the same tokens.

use serde::{Deserialize, Serialize};

/// Field delimiter used to split a line into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldSplitter {
    delimiter: u8,
}

impl FieldSplitter {
    pub const COMMA: Self = Self { delimiter: b',' };
    pub const TAB: Self = Self { delimiter: b'\t' };
    pub const PIPE: Self = Self { delimiter: b'|' };

    /// Delimiter must be a single ASCII byte so splitting never lands inside
    /// a multi-byte UTF-8 sequence
    pub fn new(delimiter: u8) -> Option<Self> {
        delimiter.is_ascii().then_some(Self { delimiter })
    }

    #[inline(always)]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Borrowing split, no allocation
    #[inline]
    pub fn split<'a>(&self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        line.split(self.delimiter as char)
    }

    /// Owned field list, as stored on a record
    pub fn fields(&self, line: &str) -> Vec<String> {
        self.split(line).map(str::to_owned).collect()
    }
}

impl Default for FieldSplitter {
    fn default() -> Self {
        Self::COMMA
    }
}

impl TryFrom<String> for FieldSplitter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let named = match value.as_str() {
            "\\t" | "tab" => Some(b'\t'),
            _ => None,
        };
        match (named, value.as_bytes()) {
            (Some(b), _) | (None, &[b]) => {
                Self::new(b).ok_or_else(|| format!("delimiter must be ASCII, got {value:?}"))
            }
            _ => Err(format!("delimiter must be a single character, got {value:?}")),
        }
    }
}

impl From<FieldSplitter> for String {
    fn from(splitter: FieldSplitter) -> Self {
        (splitter.delimiter as char).to_string()
    }
}

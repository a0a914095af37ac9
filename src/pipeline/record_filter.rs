//! Field-level record filters

use crate::core::Record;
use std::collections::HashSet;

/// Accept/reject a parsed record
pub trait RecordFilter {
    fn accept(&self, record: &Record) -> bool;
}

impl<F> RecordFilter for F
where
    F: Fn(&Record) -> bool,
{
    #[inline]
    fn accept(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Accepts records whose field at `index` is one of `allowed` (exact match).
/// An index past the end of the field list never matches.
#[derive(Debug, Clone)]
pub struct FieldInList {
    index: usize,
    allowed: HashSet<String>,
}

impl FieldInList {
    pub fn new<I, S>(index: usize, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Check a raw field list
    #[inline]
    pub fn check_fields<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        fields
            .get(self.index)
            .is_some_and(|field| self.allowed.contains(field.as_ref()))
    }
}

impl RecordFilter for FieldInList {
    #[inline]
    fn accept(&self, record: &Record) -> bool {
        self.check_fields(record.fields())
    }
}

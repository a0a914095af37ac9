//! Market data records
//!
//! A `Record` is one parsed line: its line number, the canonical field list
//! it was built from, and a typed body. The body variant is fixed at
//! construction; mutation goes through `RecordBodyMut`, which hands out the
//! inner struct but never the enum, so the category tag cannot change.

use super::FixedPoint8;
use serde::Serialize;
use std::fmt;

/// Record category, one per aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Quote,
    Trade,
    OpenInterest,
    Other,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [Self::Quote, Self::Trade, Self::OpenInterest, Self::Other];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Trade => "trade",
            Self::OpenInterest => "open_interest",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quote side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum QuoteSide {
    Bid = 1,
    Ask = 2,
}

impl QuoteSide {
    /// Parse side from `B`/`BID` or `A`/`ASK` in upper or lower case
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"B" | b"b" | b"BID" | b"bid" | b"Bid" => Some(Self::Bid),
            b"A" | b"a" | b"ASK" | b"ask" | b"Ask" => Some(Self::Ask),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_bid(&self) -> bool {
        matches!(self, Self::Bid)
    }
}

/// One side of a top-of-book quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRecord {
    pub id: String,
    pub timestamp: i64,
    pub side: QuoteSide,
    /// None while missing, filled by the missing data handler
    pub price: Option<FixedPoint8>,
    pub qty: Option<FixedPoint8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: i64,
    pub price: Option<FixedPoint8>,
    pub qty: Option<FixedPoint8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenInterestRecord {
    pub id: String,
    pub timestamp: i64,
    pub qty: Option<FixedPoint8>,
}

/// Catch-all category; anything after the id is kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherRecord {
    pub id: String,
    pub timestamp: i64,
    pub extra: Vec<String>,
}

/// Typed payload of a record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    Quote(QuoteRecord),
    Trade(TradeRecord),
    OpenInterest(OpenInterestRecord),
    Other(OtherRecord),
}

impl RecordBody {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Quote(_) => RecordKind::Quote,
            Self::Trade(_) => RecordKind::Trade,
            Self::OpenInterest(_) => RecordKind::OpenInterest,
            Self::Other(_) => RecordKind::Other,
        }
    }
}

impl From<QuoteRecord> for RecordBody {
    fn from(record: QuoteRecord) -> Self {
        Self::Quote(record)
    }
}

impl From<TradeRecord> for RecordBody {
    fn from(record: TradeRecord) -> Self {
        Self::Trade(record)
    }
}

impl From<OpenInterestRecord> for RecordBody {
    fn from(record: OpenInterestRecord) -> Self {
        Self::OpenInterest(record)
    }
}

impl From<OtherRecord> for RecordBody {
    fn from(record: OtherRecord) -> Self {
        Self::Other(record)
    }
}

/// Mutable view of a record body that cannot swap the variant
#[derive(Debug)]
pub enum RecordBodyMut<'a> {
    Quote(&'a mut QuoteRecord),
    Trade(&'a mut TradeRecord),
    OpenInterest(&'a mut OpenInterestRecord),
    Other(&'a mut OtherRecord),
}

/// A parsed line
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    line_number: u64,
    fields: Vec<String>,
    body: RecordBody,
}

impl Record {
    pub fn new(line_number: u64, fields: Vec<String>, body: impl Into<RecordBody>) -> Self {
        Self {
            line_number,
            fields,
            body: body.into(),
        }
    }

    #[inline(always)]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    #[inline(always)]
    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    /// Field list produced by the canonical splitter
    #[inline(always)]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, None when out of range
    #[inline]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> RecordBodyMut<'_> {
        match &mut self.body {
            RecordBody::Quote(r) => RecordBodyMut::Quote(r),
            RecordBody::Trade(r) => RecordBodyMut::Trade(r),
            RecordBody::OpenInterest(r) => RecordBodyMut::OpenInterest(r),
            RecordBody::Other(r) => RecordBodyMut::Other(r),
        }
    }

    pub fn into_body(self) -> RecordBody {
        self.body
    }

    /// Identifier of the instrument this record refers to
    pub fn id(&self) -> &str {
        match &self.body {
            RecordBody::Quote(r) => &r.id,
            RecordBody::Trade(r) => &r.id,
            RecordBody::OpenInterest(r) => &r.id,
            RecordBody::Other(r) => &r.id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match &self.body {
            RecordBody::Quote(r) => r.timestamp,
            RecordBody::Trade(r) => r.timestamp,
            RecordBody::OpenInterest(r) => r.timestamp,
            RecordBody::Other(r) => r.timestamp,
        }
    }

    /// True when no price/qty field carries the missing marker
    pub fn is_complete(&self) -> bool {
        match &self.body {
            RecordBody::Quote(r) => r.price.is_some() && r.qty.is_some(),
            RecordBody::Trade(r) => r.price.is_some() && r.qty.is_some(),
            RecordBody::OpenInterest(r) => r.qty.is_some(),
            RecordBody::Other(_) => true,
        }
    }
}

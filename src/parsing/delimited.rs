//! Delimited text grammar
//!
//! One event per line, first field is the record type:
//!
//! ```text
//! Q,<timestamp>,<id>,<B|A>,<price>,<qty>
//! T,<timestamp>,<id>,<price>,<qty>
//! OI,<timestamp>,<id>,<qty>
//! O,<timestamp>,<id>[,<anything>...]
//! ```
//!
//! An empty price/qty token (or `NaN`, `NA`) parses as missing.

use super::{is_missing_marker, parse_timestamp, ParseError, RecordParser};
use crate::core::{
    FieldSplitter, FixedPoint8, OpenInterestRecord, OtherRecord, QuoteRecord, QuoteSide, Record,
    RecordBody, RecordKind, TradeRecord,
};

const QUOTE_FIELDS: usize = 6;
const TRADE_FIELDS: usize = 5;
const OPEN_INTEREST_FIELDS: usize = 4;
const OTHER_MIN_FIELDS: usize = 3;

/// Parser for the bundled delimited grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedRecordParser {
    splitter: FieldSplitter,
}

impl DelimitedRecordParser {
    pub fn new(splitter: FieldSplitter) -> Self {
        Self { splitter }
    }

    pub fn splitter(&self) -> FieldSplitter {
        self.splitter
    }

    /// Map the type token to a record kind
    #[inline]
    pub fn detect_kind(tag: &str) -> Option<RecordKind> {
        match tag {
            "Q" => Some(RecordKind::Quote),
            "T" => Some(RecordKind::Trade),
            "OI" => Some(RecordKind::OpenInterest),
            "O" => Some(RecordKind::Other),
            _ => None,
        }
    }

    fn parse_body(fields: &[String]) -> Result<RecordBody, ParseError> {
        let tag = fields.first().map(String::as_str).unwrap_or_default();
        let kind =
            Self::detect_kind(tag).ok_or_else(|| ParseError::UnknownRecordType(tag.to_string()))?;

        let expected = match kind {
            RecordKind::Quote => QUOTE_FIELDS,
            RecordKind::Trade => TRADE_FIELDS,
            RecordKind::OpenInterest => OPEN_INTEREST_FIELDS,
            RecordKind::Other => OTHER_MIN_FIELDS,
        };
        let count_ok = match kind {
            RecordKind::Other => fields.len() >= expected,
            _ => fields.len() == expected,
        };
        if !count_ok {
            return Err(ParseError::FieldCount {
                kind,
                expected,
                found: fields.len(),
            });
        }

        let timestamp = parse_timestamp(&fields[1])?;
        let id = fields[2].clone();
        if id.is_empty() {
            return Err(ParseError::EmptyId);
        }

        let body = match kind {
            RecordKind::Quote => {
                let side = QuoteSide::from_bytes(fields[3].as_bytes())
                    .ok_or_else(|| ParseError::InvalidSide(fields[3].clone()))?;
                RecordBody::Quote(QuoteRecord {
                    id,
                    timestamp,
                    side,
                    price: parse_decimal("price", &fields[4])?,
                    qty: parse_decimal("qty", &fields[5])?,
                })
            }
            RecordKind::Trade => RecordBody::Trade(TradeRecord {
                id,
                timestamp,
                price: parse_decimal("price", &fields[3])?,
                qty: parse_decimal("qty", &fields[4])?,
            }),
            RecordKind::OpenInterest => RecordBody::OpenInterest(OpenInterestRecord {
                id,
                timestamp,
                qty: parse_decimal("qty", &fields[3])?,
            }),
            RecordKind::Other => RecordBody::Other(OtherRecord {
                id,
                timestamp,
                extra: fields[OTHER_MIN_FIELDS..].to_vec(),
            }),
        };
        Ok(body)
    }
}

impl RecordParser for DelimitedRecordParser {
    fn parse(&mut self, line_number: u64, line: &str) -> Result<Record, ParseError> {
        let fields = self.splitter.fields(line);
        let body = Self::parse_body(&fields)?;
        Ok(Record::new(line_number, fields, body))
    }
}

/// Price or quantity token; missing markers become None
#[inline]
fn parse_decimal(field: &'static str, token: &str) -> Result<Option<FixedPoint8>, ParseError> {
    if is_missing_marker(token) {
        return Ok(None);
    }
    FixedPoint8::parse_bytes(token.as_bytes())
        .map(Some)
        .ok_or_else(|| ParseError::InvalidNumber {
            field,
            value: token.to_string(),
        })
}

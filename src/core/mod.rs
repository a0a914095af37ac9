//! Core types for market data ingestion
//!
//! - FixedPoint8: fixed-point decimal for prices and quantities
//! - FieldSplitter: the one tokenization rule shared by parsers and filters
//! - Record: a parsed line with an immutable category tag

pub mod fields;
pub mod fixed_point;
pub mod record;

pub use fields::FieldSplitter;
pub use fixed_point::FixedPoint8;
pub use record::{
    OpenInterestRecord, OtherRecord, QuoteRecord, QuoteSide, Record, RecordBody, RecordBodyMut,
    RecordKind, TradeRecord,
};

//! The streaming pipeline
//!
//! One trait per stage, each with a blanket impl for plain closures, plus
//! the bundled strategies and the `TextFileProcessor` that drives them.

pub mod bad_line;
pub mod line_filter;
pub mod missing_data;
pub mod processor;
pub mod record_filter;
pub mod routing;

pub use bad_line::{BadLineHandler, BadLineOutcome, PrintBadLineHandler};
pub use line_filter::{Inverted, LineFilter, RegexLineFilter, SubstringLineFilter};
pub use missing_data::{
    CarryForward, ConstantFill, FillKey, ImputationPolicy, MissingDataHandler,
    PriceQtyMissingDataHandler,
};
pub use processor::{TextFileProcessor, TextFileProcessorBuilder};
pub use record_filter::{FieldInList, RecordFilter};
pub use routing::{
    Aggregator, Aggregators, CountingAggregator, CountingAggregators, MemoryAggregator,
    MemoryAggregators,
};

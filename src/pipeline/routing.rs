//! Type-directed dispatch to the per-category aggregators
//!
//! Every surviving record goes to exactly one of the four sinks, picked by
//! its category tag. Static dispatch: the sink types are generic so callers
//! get their concrete aggregators back after processing.

use crate::core::{OpenInterestRecord, OtherRecord, QuoteRecord, Record, RecordBody, RecordKind, TradeRecord};

/// Per-category sink; the record is moved in, nothing is kept by the core
pub trait Aggregator<R> {
    fn aggregate(&mut self, record: R, line_number: u64);
}

impl<R, F> Aggregator<R> for F
where
    F: FnMut(R, u64),
{
    #[inline]
    fn aggregate(&mut self, record: R, line_number: u64) {
        self(record, line_number)
    }
}

/// The four sinks, one per category
#[derive(Debug, Clone, Default)]
pub struct Aggregators<Q, T, I, O> {
    pub quote: Q,
    pub trade: T,
    pub open_interest: I,
    pub other: O,
}

impl<Q, T, I, O> Aggregators<Q, T, I, O>
where
    Q: Aggregator<QuoteRecord>,
    T: Aggregator<TradeRecord>,
    I: Aggregator<OpenInterestRecord>,
    O: Aggregator<OtherRecord>,
{
    pub fn new(quote: Q, trade: T, open_interest: I, other: O) -> Self {
        Self {
            quote,
            trade,
            open_interest,
            other,
        }
    }

    /// Route a record to the sink matching its tag
    #[inline]
    pub fn dispatch(&mut self, record: Record, line_number: u64) -> RecordKind {
        match record.into_body() {
            RecordBody::Quote(r) => {
                self.quote.aggregate(r, line_number);
                RecordKind::Quote
            }
            RecordBody::Trade(r) => {
                self.trade.aggregate(r, line_number);
                RecordKind::Trade
            }
            RecordBody::OpenInterest(r) => {
                self.open_interest.aggregate(r, line_number);
                RecordKind::OpenInterest
            }
            RecordBody::Other(r) => {
                self.other.aggregate(r, line_number);
                RecordKind::Other
            }
        }
    }
}

/// Collects records with their line numbers
#[derive(Debug, Clone)]
pub struct MemoryAggregator<R> {
    records: Vec<(u64, R)>,
}

impl<R> MemoryAggregator<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[(u64, R)] {
        &self.records
    }

    pub fn line_numbers(&self) -> Vec<u64> {
        self.records.iter().map(|(line, _)| *line).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<(u64, R)> {
        self.records
    }
}

impl<R> Default for MemoryAggregator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Aggregator<R> for MemoryAggregator<R> {
    #[inline]
    fn aggregate(&mut self, record: R, line_number: u64) {
        self.records.push((line_number, record));
    }
}

/// Counts records without keeping them; constant memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingAggregator {
    count: u64,
    first_line: Option<u64>,
    last_line: Option<u64>,
}

impl CountingAggregator {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn first_line(&self) -> Option<u64> {
        self.first_line
    }

    pub fn last_line(&self) -> Option<u64> {
        self.last_line
    }
}

impl<R> Aggregator<R> for CountingAggregator {
    #[inline]
    fn aggregate(&mut self, _record: R, line_number: u64) {
        self.count += 1;
        self.first_line.get_or_insert(line_number);
        self.last_line = Some(line_number);
    }
}

pub type MemoryAggregators = Aggregators<
    MemoryAggregator<QuoteRecord>,
    MemoryAggregator<TradeRecord>,
    MemoryAggregator<OpenInterestRecord>,
    MemoryAggregator<OtherRecord>,
>;

pub type CountingAggregators =
    Aggregators<CountingAggregator, CountingAggregator, CountingAggregator, CountingAggregator>;

impl MemoryAggregators {
    /// Total records collected across the four sinks
    pub fn total(&self) -> usize {
        self.quote.len() + self.trade.len() + self.open_interest.len() + self.other.len()
    }
}

impl CountingAggregators {
    pub fn total(&self) -> u64 {
        self.quote.count() + self.trade.count() + self.open_interest.count() + self.other.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OtherRecord;
    use crate::test_utils::{open_interest, quote, trade};

    fn other(id: &str) -> OtherRecord {
        OtherRecord {
            id: id.into(),
            timestamp: 0,
            extra: vec![],
        }
    }

    #[test]
    fn test_dispatch_by_kind() {
        let mut sinks = MemoryAggregators::default();
        assert_eq!(sinks.dispatch(Record::new(1, vec![], quote("A", Some(1), Some(1))), 1), RecordKind::Quote);
        assert_eq!(sinks.dispatch(Record::new(2, vec![], trade("A", Some(1), Some(1))), 2), RecordKind::Trade);
        assert_eq!(sinks.dispatch(Record::new(3, vec![], open_interest("A", Some(1))), 3), RecordKind::OpenInterest);
        assert_eq!(sinks.dispatch(Record::new(4, vec![], other("A")), 4), RecordKind::Other);

        assert_eq!(sinks.quote.line_numbers(), vec![1]);
        assert_eq!(sinks.trade.line_numbers(), vec![2]);
        assert_eq!(sinks.open_interest.line_numbers(), vec![3]);
        assert_eq!(sinks.other.line_numbers(), vec![4]);
        assert_eq!(sinks.total(), 4);
    }

    #[test]
    fn test_order_preserved_within_category() {
        let mut sinks = MemoryAggregators::default();
        for line in [3, 5, 9] {
            sinks.dispatch(Record::new(line, vec![], trade("A", Some(1), Some(1))), line);
        }
        assert_eq!(sinks.trade.line_numbers(), vec![3, 5, 9]);
        assert!(sinks.quote.is_empty());
    }

    #[test]
    fn test_counting_aggregator() {
        let mut sinks = CountingAggregators::default();
        sinks.dispatch(Record::new(2, vec![], quote("A", None, None)), 2);
        sinks.dispatch(Record::new(7, vec![], quote("A", None, None)), 7);
        assert_eq!(sinks.quote.count(), 2);
        assert_eq!(sinks.quote.first_line(), Some(2));
        assert_eq!(sinks.quote.last_line(), Some(7));
        assert_eq!(sinks.total(), 2);
    }

    #[test]
    fn test_closures_as_sinks() {
        let mut trades = Vec::new();
        {
            let mut sinks = Aggregators::new(
                |_: QuoteRecord, _: u64| {},
                |t: TradeRecord, line: u64| trades.push((line, t.id)),
                |_: OpenInterestRecord, _: u64| {},
                |_: OtherRecord, _: u64| {},
            );
            sinks.dispatch(Record::new(4, vec![], trade("MSFT", Some(1), Some(1))), 4);
        }
        assert_eq!(trades, vec![(4, "MSFT".to_string())]);
    }
}

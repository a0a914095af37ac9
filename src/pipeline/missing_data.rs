//! In-place repair of missing prices and quantities
//!
//! `PriceQtyMissingDataHandler` owns which fields get filled; the values
//! come from an `ImputationPolicy`. After `repair` no quote or trade has a
//! missing price/qty and no open interest record has a missing qty.

use crate::core::{FixedPoint8, QuoteSide, Record, RecordBodyMut, RecordKind};
use std::collections::HashMap;

/// Repairs a record before it is dispatched
pub trait MissingDataHandler {
    fn repair(&mut self, record: &mut Record);
}

impl<F> MissingDataHandler for F
where
    F: FnMut(&mut Record),
{
    #[inline]
    fn repair(&mut self, record: &mut Record) {
        self(record)
    }
}

/// Series a fill value is looked up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillKey<'a> {
    pub kind: RecordKind,
    pub id: &'a str,
    /// Only set for quotes
    pub side: Option<QuoteSide>,
}

/// Source of replacement values
pub trait ImputationPolicy {
    fn price(&mut self, key: &FillKey<'_>) -> FixedPoint8;

    fn qty(&mut self, key: &FillKey<'_>) -> FixedPoint8;

    /// Sees the values a record arrived with, before anything is filled
    fn observe(&mut self, _key: &FillKey<'_>, _price: Option<FixedPoint8>, _qty: Option<FixedPoint8>) {}
}

/// Fixed replacement values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstantFill {
    pub price: FixedPoint8,
    pub qty: FixedPoint8,
}

impl ConstantFill {
    pub fn new(price: FixedPoint8, qty: FixedPoint8) -> Self {
        Self { price, qty }
    }
}

impl ImputationPolicy for ConstantFill {
    #[inline]
    fn price(&mut self, _key: &FillKey<'_>) -> FixedPoint8 {
        self.price
    }

    #[inline]
    fn qty(&mut self, _key: &FillKey<'_>) -> FixedPoint8 {
        self.qty
    }
}

/// Last observed value per (id, kind, side) series
#[derive(Debug, Clone, Copy, Default)]
struct LastSeen {
    price: Option<FixedPoint8>,
    qty: Option<FixedPoint8>,
}

/// Series slots per instrument: bid, ask, trade, open interest
const SERIES_SLOTS: usize = 4;

/// Carries the last observed value of the same series forward, falling
/// back to constants until the series has produced one.
///
/// Memory grows with the number of distinct instruments, not with file
/// length.
#[derive(Debug, Clone, Default)]
pub struct CarryForward {
    fallback: ConstantFill,
    last: HashMap<String, [LastSeen; SERIES_SLOTS]>,
}

impl CarryForward {
    pub fn new(fallback: ConstantFill) -> Self {
        Self {
            fallback,
            last: HashMap::new(),
        }
    }

    #[inline]
    fn slot(key: &FillKey<'_>) -> Option<usize> {
        match (key.kind, key.side) {
            (RecordKind::Quote, Some(QuoteSide::Bid)) => Some(0),
            (RecordKind::Quote, Some(QuoteSide::Ask)) => Some(1),
            (RecordKind::Trade, _) => Some(2),
            (RecordKind::OpenInterest, _) => Some(3),
            _ => None,
        }
    }

    fn seen(&self, key: &FillKey<'_>) -> LastSeen {
        Self::slot(key)
            .and_then(|slot| self.last.get(key.id).map(|series| series[slot]))
            .unwrap_or_default()
    }
}

impl ImputationPolicy for CarryForward {
    fn price(&mut self, key: &FillKey<'_>) -> FixedPoint8 {
        self.seen(key).price.unwrap_or(self.fallback.price)
    }

    fn qty(&mut self, key: &FillKey<'_>) -> FixedPoint8 {
        self.seen(key).qty.unwrap_or(self.fallback.qty)
    }

    fn observe(&mut self, key: &FillKey<'_>, price: Option<FixedPoint8>, qty: Option<FixedPoint8>) {
        let Some(slot) = Self::slot(key) else {
            return;
        };
        if price.is_none() && qty.is_none() {
            return;
        }
        if !self.last.contains_key(key.id) {
            self.last.insert(key.id.to_string(), Default::default());
        }
        let Some(series) = self.last.get_mut(key.id) else {
            return;
        };
        let seen = &mut series[slot];
        if price.is_some() {
            seen.price = price;
        }
        if qty.is_some() {
            seen.qty = qty;
        }
    }
}

impl<P: ImputationPolicy + ?Sized> ImputationPolicy for Box<P> {
    fn price(&mut self, key: &FillKey<'_>) -> FixedPoint8 {
        (**self).price(key)
    }

    fn qty(&mut self, key: &FillKey<'_>) -> FixedPoint8 {
        (**self).qty(key)
    }

    fn observe(&mut self, key: &FillKey<'_>, price: Option<FixedPoint8>, qty: Option<FixedPoint8>) {
        (**self).observe(key, price, qty)
    }
}

/// Fills missing price/qty on quotes and trades and missing qty on open
/// interest records. Other records pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct PriceQtyMissingDataHandler<P = ConstantFill> {
    policy: P,
    repaired: u64,
}

impl<P: ImputationPolicy> PriceQtyMissingDataHandler<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            repaired: 0,
        }
    }

    /// Records that had at least one field filled
    pub fn repaired(&self) -> u64 {
        self.repaired
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P: ImputationPolicy> MissingDataHandler for PriceQtyMissingDataHandler<P> {
    fn repair(&mut self, record: &mut Record) {
        let line_number = record.line_number();
        let filled = match record.body_mut() {
            RecordBodyMut::Quote(q) => {
                let key = FillKey {
                    kind: RecordKind::Quote,
                    id: &q.id,
                    side: Some(q.side),
                };
                fill_price_qty(&mut self.policy, &key, &mut q.price, &mut q.qty)
            }
            RecordBodyMut::Trade(t) => {
                let key = FillKey {
                    kind: RecordKind::Trade,
                    id: &t.id,
                    side: None,
                };
                fill_price_qty(&mut self.policy, &key, &mut t.price, &mut t.qty)
            }
            RecordBodyMut::OpenInterest(oi) => {
                let key = FillKey {
                    kind: RecordKind::OpenInterest,
                    id: &oi.id,
                    side: None,
                };
                self.policy.observe(&key, None, oi.qty);
                match oi.qty {
                    Some(_) => false,
                    None => {
                        oi.qty = Some(self.policy.qty(&key));
                        true
                    }
                }
            }
            RecordBodyMut::Other(_) => false,
        };

        if filled {
            self.repaired += 1;
            tracing::trace!(line_number, "filled missing price/qty");
        }
    }
}

fn fill_price_qty<P: ImputationPolicy>(
    policy: &mut P,
    key: &FillKey<'_>,
    price: &mut Option<FixedPoint8>,
    qty: &mut Option<FixedPoint8>,
) -> bool {
    policy.observe(key, *price, *qty);
    let mut filled = false;
    if price.is_none() {
        *price = Some(policy.price(key));
        filled = true;
    }
    if qty.is_none() {
        *qty = Some(policy.qty(key));
        filled = true;
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OtherRecord, RecordBody};
    use crate::test_utils::{fp, open_interest, quote, trade};

    #[test]
    fn test_constant_fill_completes_records() {
        let mut handler = PriceQtyMissingDataHandler::new(ConstantFill::new(fp(1), fp(2)));
        let mut q = Record::new(1, vec![], quote("AAPL", None, None));
        let mut t = Record::new(2, vec![], trade("AAPL", Some(10), None));
        let mut oi = Record::new(3, vec![], open_interest("ESZ4", None));

        handler.repair(&mut q);
        handler.repair(&mut t);
        handler.repair(&mut oi);

        assert!(q.is_complete() && t.is_complete() && oi.is_complete());
        match t.body() {
            RecordBody::Trade(t) => {
                assert_eq!(t.price, Some(fp(10)));
                assert_eq!(t.qty, Some(fp(2)));
            }
            other => panic!("Expected trade, got {other:?}"),
        }
        assert_eq!(handler.repaired(), 3);
    }

    #[test]
    fn test_complete_records_untouched() {
        let mut handler = PriceQtyMissingDataHandler::<ConstantFill>::default();
        let original = Record::new(1, vec![], quote("AAPL", Some(5), Some(6)));
        let mut record = original.clone();
        handler.repair(&mut record);
        assert_eq!(record, original);
        assert_eq!(handler.repaired(), 0);
    }

    #[test]
    fn test_other_records_pass_through() {
        let mut handler = PriceQtyMissingDataHandler::<ConstantFill>::default();
        let body = OtherRecord {
            id: "X".into(),
            timestamp: 1,
            extra: vec!["".into()],
        };
        let mut record = Record::new(1, vec![], body.clone());
        handler.repair(&mut record);
        assert_eq!(record.body(), &RecordBody::Other(body));
    }

    #[test]
    fn test_carry_forward_per_series() {
        let mut handler = PriceQtyMissingDataHandler::new(CarryForward::new(ConstantFill::new(fp(0), fp(1))));

        // nothing seen yet: fallback
        let mut first = Record::new(1, vec![], trade("AAPL", None, Some(3)));
        handler.repair(&mut first);
        assert!(matches!(first.body(), RecordBody::Trade(t) if t.price == Some(fp(0))));

        let mut seen = Record::new(2, vec![], trade("AAPL", Some(150), Some(4)));
        handler.repair(&mut seen);

        let mut gap = Record::new(3, vec![], trade("AAPL", None, None));
        handler.repair(&mut gap);
        match gap.body() {
            RecordBody::Trade(t) => {
                assert_eq!(t.price, Some(fp(150)));
                assert_eq!(t.qty, Some(fp(4)));
            }
            other => panic!("Expected trade, got {other:?}"),
        }

        // different instrument and different series do not share values
        let mut other_id = Record::new(4, vec![], trade("MSFT", None, None));
        handler.repair(&mut other_id);
        assert!(matches!(other_id.body(), RecordBody::Trade(t) if t.price == Some(fp(0))));

        let mut bid = Record::new(5, vec![], quote("AAPL", None, None));
        handler.repair(&mut bid);
        assert!(matches!(bid.body(), RecordBody::Quote(q) if q.price == Some(fp(0)) && q.qty == Some(fp(1))));
    }

    #[test]
    fn test_carry_forward_ignores_imputed_values() {
        let mut handler = PriceQtyMissingDataHandler::new(CarryForward::new(ConstantFill::new(fp(7), fp(7))));
        let mut a = Record::new(1, vec![], trade("X", None, Some(1)));
        handler.repair(&mut a);
        let mut b = Record::new(2, vec![], trade("X", Some(9), None));
        handler.repair(&mut b);
        // qty was only ever observed as 1
        assert!(matches!(b.body(), RecordBody::Trade(t) if t.qty == Some(fp(1))));
    }

    #[test]
    fn test_closure_handler_and_boxed_policy() {
        let mut marks = 0;
        let mut closure = |_: &mut Record| marks += 1;
        closure.repair(&mut Record::new(1, vec![], trade("X", None, None)));
        assert_eq!(marks, 1);

        let boxed: Box<dyn ImputationPolicy + Send> = Box::new(ConstantFill::new(fp(3), fp(3)));
        let mut handler = PriceQtyMissingDataHandler::new(boxed);
        let mut record = Record::new(1, vec![], open_interest("X", None));
        handler.repair(&mut record);
        assert!(matches!(record.body(), RecordBody::OpenInterest(oi) if oi.qty == Some(fp(3))));
    }
}

//! Transaction ordering policy.
//!
//! FIFO matching is order-sensitive, so the engine only ever sees each
//! symbol's transactions in one canonical order.
//!
//! # Canonical sort key
//!
//! `(date, seq)` ascending, where `seq` is the transaction's original input
//! position. The sort is stable, so two rows on the same date keep their file
//! order. A same-day BUY can therefore fill a same-day SELL only when it
//! appears earlier in the input.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::Transaction;

/// Transactions regrouped by symbol, each group in canonical order.
pub type BySymbol = BTreeMap<String, Vec<Transaction>>;

fn canonical_cmp(a: &Transaction, b: &Transaction) -> Ordering {
    a.date.cmp(&b.date).then(a.seq.cmp(&b.seq))
}

/// Sort `txs` into canonical order **in place**. Pure and idempotent.
pub fn sort_canonical(txs: &mut [Transaction]) {
    txs.sort_by(canonical_cmp);
}

/// Regroup parsed transactions by symbol and sort each group canonically.
///
/// This is the only supported way to build matching input.
pub fn group_for_matching<I>(txs: I) -> BySymbol
where
    I: IntoIterator<Item = Transaction>,
{
    let mut by_symbol = BySymbol::new();
    for tx in txs {
        by_symbol.entry(tx.symbol.clone()).or_default().push(tx);
    }
    for group in by_symbol.values_mut() {
        sort_canonical(group);
    }
    by_symbol
}

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{trace, warn};

use crate::fixedpoint::{Micros, Qty};
use crate::ordering::BySymbol;
use crate::queue::OpenLotQueue;
use crate::types::{Lot, RealizedEvent, Side, Transaction, UnmatchedWarning};

/// Everything one matching run produces.
///
/// `open_lots` only holds symbols that still have at least one open lot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub realized: Vec<RealizedEvent>,
    pub warnings: Vec<UnmatchedWarning>,
    pub open_lots: BTreeMap<String, OpenLotQueue>,
}

impl MatchOutcome {
    pub fn realized_gain(&self) -> Micros {
        self.realized.iter().map(|e| e.gain).sum()
    }

    pub fn open_qty(&self, symbol: &str) -> Qty {
        self.open_lots
            .get(symbol)
            .map(OpenLotQueue::open_qty)
            .unwrap_or(Qty::ZERO)
    }
}

/// Apply one transaction to its symbol's queue.
///
/// Rules:
/// - Buy: append a lot (remaining = qty, unit_cost = price).
/// - Sell: consume lots oldest-first. Each touched lot yields one
///   [`RealizedEvent`] with `cost = m × unit_cost` and `proceeds = m × price`.
///   If the queue runs dry with quantity left, one [`UnmatchedWarning`] is
///   emitted and the remainder is dropped. No short lot is ever opened.
pub fn apply_transaction(
    queue: &mut OpenLotQueue,
    tx: &Transaction,
    realized: &mut Vec<RealizedEvent>,
    warnings: &mut Vec<UnmatchedWarning>,
) {
    debug_assert!(tx.qty.is_positive());
    match tx.side {
        Side::Buy => queue.push(Lot::open(tx)),
        Side::Sell => {
            if let Some(w) = sell_fifo(queue, tx, realized) {
                warnings.push(w);
            }
        }
    }
}

fn sell_fifo(
    queue: &mut OpenLotQueue,
    tx: &Transaction,
    realized: &mut Vec<RealizedEvent>,
) -> Option<UnmatchedWarning> {
    let mut qty = tx.qty;

    while qty.is_positive() {
        let Some(lot) = queue.front_mut() else {
            break;
        };

        let m = qty.min(lot.remaining);
        let cost = Micros::notional(lot.unit_cost, m);
        let proceeds = Micros::notional(tx.price, m);
        trace!(
            symbol = %tx.symbol,
            sell_date = %tx.date,
            open_date = %lot.open_date,
            qty = %m,
            "fifo match"
        );
        realized.push(RealizedEvent::new(
            tx.date,
            tx.symbol.clone(),
            lot.open_date,
            m,
            cost,
            proceeds,
        ));

        lot.remaining -= m;
        qty -= m;
        if lot.is_closed() {
            queue.pop_closed_front();
        }
    }

    if qty.is_positive() {
        warn!(
            symbol = %tx.symbol,
            date = %tx.date,
            unmatched = %qty,
            "sell exceeds open quantity; remainder discarded"
        );
        return Some(UnmatchedWarning {
            date: tx.date,
            symbol: tx.symbol.clone(),
            qty_unmatched: qty,
        });
    }
    None
}

/// Run FIFO matching over transactions already grouped by symbol and sorted
/// by `(date, seq)` (see [`crate::group_for_matching`]).
///
/// Every symbol gets its own queue, local to this call. Realized events and
/// warnings come out in symbol order, then transaction order.
///
/// Feeding unsorted or mixed-symbol groups is a caller contract violation;
/// it is only checked in debug builds.
pub fn match_fifo(by_symbol: &BySymbol) -> MatchOutcome {
    let mut out = MatchOutcome::default();

    for (symbol, txs) in by_symbol {
        debug_assert_sorted(symbol, txs);

        let mut queue = OpenLotQueue::new();
        for tx in txs {
            apply_transaction(&mut queue, tx, &mut out.realized, &mut out.warnings);
        }
        if !queue.is_empty() {
            out.open_lots.insert(symbol.clone(), queue);
        }
    }

    out
}

fn debug_assert_sorted(symbol: &str, txs: &[Transaction]) {
    debug_assert!(
        txs.iter().all(|t| t.symbol == symbol),
        "transactions for '{symbol}' contain another symbol"
    );
    debug_assert!(
        txs.windows(2)
            .all(|w| (w[0].date, w[0].seq) <= (w[1].date, w[1].seq)),
        "transactions for '{symbol}' are not sorted by (date, seq)"
    );
}

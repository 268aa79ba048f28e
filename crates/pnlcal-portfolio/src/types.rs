use chrono::NaiveDate;
use serde::Serialize;

use crate::fixedpoint::{Micros, Qty};

/// BUY or SELL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Case-insensitive parse of `BUY` / `SELL`. Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// A single parsed trade (the matching atom).
///
/// `qty` is always positive, `price` is never negative.
/// `seq` is the zero-based position of the source row in the input and is
/// used only to break same-date ties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub seq: usize,
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub qty: Qty,
    pub price: Micros,
}

impl Transaction {
    pub fn new<S: Into<String>>(
        seq: usize,
        date: NaiveDate,
        symbol: S,
        side: Side,
        qty: Qty,
        price: Micros,
    ) -> Self {
        debug_assert!(qty.is_positive(), "Transaction.qty must be > 0");
        debug_assert!(!price.is_negative(), "Transaction.price must be >= 0");
        Self {
            seq,
            date,
            symbol: symbol.into(),
            side,
            qty,
            price,
        }
    }
}

/// An open FIFO lot created by a BUY.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Lot {
    pub symbol: String,
    pub open_date: NaiveDate,
    pub remaining: Qty,
    pub unit_cost: Micros,
}

impl Lot {
    pub fn open(tx: &Transaction) -> Self {
        debug_assert_eq!(tx.side, Side::Buy);
        Self {
            symbol: tx.symbol.clone(),
            open_date: tx.date,
            remaining: tx.qty,
            unit_cost: tx.price,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Cost basis still carried by this lot.
    pub fn open_cost(&self) -> Micros {
        Micros::notional(self.unit_cost, self.remaining)
    }
}

/// One SELL-against-lot match. A SELL spanning several lots yields several
/// events, all dated on the SELL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RealizedEvent {
    pub date: NaiveDate,
    pub symbol: String,
    /// Open date of the lot this match consumed from.
    pub open_date: NaiveDate,
    pub qty: Qty,
    pub cost_basis: Micros,
    pub proceeds: Micros,
    pub gain: Micros,
}

impl RealizedEvent {
    pub fn new<S: Into<String>>(
        date: NaiveDate,
        symbol: S,
        open_date: NaiveDate,
        qty: Qty,
        cost_basis: Micros,
        proceeds: Micros,
    ) -> Self {
        Self {
            date,
            symbol: symbol.into(),
            open_date,
            qty,
            cost_basis,
            proceeds,
            gain: proceeds.saturating_sub(cost_basis),
        }
    }
}

/// A SELL whose quantity exceeded the open quantity for its symbol. The
/// unmatched remainder is discarded; no short lot is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnmatchedWarning {
    pub date: NaiveDate,
    pub symbol: String,
    pub qty_unmatched: Qty,
}

/// A hand-entered day result: what was paid and what came back.
///
/// Not tied to a symbol and never touches the lot queues. `row` is the
/// 1-based data row it was read from, which also identifies it for removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub row: usize,
    pub date: NaiveDate,
    pub buy: Micros,
    pub sell: Micros,
    pub profit: Micros,
}

impl JournalEntry {
    pub fn new(row: usize, date: NaiveDate, buy: Micros, sell: Micros) -> Self {
        Self {
            row,
            date,
            buy,
            sell,
            profit: sell.saturating_sub(buy),
        }
    }
}

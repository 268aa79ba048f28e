//! Incremental FIFO book, one transaction at a time.
//!
//! [`accounting`](crate::accounting) owns the FIFO mechanics. `FifoBook`
//! wraps them behind an append boundary that:
//!
//! - Rejects transactions that break the record invariants (empty symbol,
//!   non-positive quantity, negative price).
//! - Rejects transactions that arrive out of `(date, seq)` order for their
//!   symbol, so the batch-path contract is enforced at runtime here.
//! - Exposes read-only views of realized events, warnings and open lots.
//!
//! # Determinism
//! Feeding a `FifoBook` the canonical order of a batch yields exactly the
//! [`MatchOutcome`] that [`match_fifo`](crate::match_fifo) returns for it.
//! The book is rejected-not-mutated on error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::accounting::{apply_transaction, MatchOutcome};
use crate::fixedpoint::{Micros, Qty};
use crate::queue::OpenLotQueue;
use crate::types::{RealizedEvent, Transaction, UnmatchedWarning};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("book invariant: symbol must not be empty")]
    EmptySymbol,
    #[error("book invariant: qty must be > 0, got {qty}")]
    NonPositiveQty { qty: Qty },
    #[error("book invariant: price must be >= 0, got {price}")]
    NegativePrice { price: Micros },
    #[error(
        "book invariant: {symbol} transaction ({date}, #{seq}) arrived after ({last_date}, #{last_seq})"
    )]
    OutOfOrder {
        symbol: String,
        date: NaiveDate,
        seq: usize,
        last_date: NaiveDate,
        last_seq: usize,
    },
}

#[derive(Clone, Debug, Default)]
pub struct FifoBook {
    queues: BTreeMap<String, OpenLotQueue>,
    last_key: BTreeMap<String, (NaiveDate, usize)>,
    realized: Vec<RealizedEvent>,
    warnings: Vec<UnmatchedWarning>,
}

impl FifoBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transaction.
    ///
    /// # Errors
    /// Returns [`BookError`] if the transaction is malformed or out of order
    /// for its symbol. The book is unchanged in that case.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), BookError> {
        Self::validate(tx)?;

        let key = (tx.date, tx.seq);
        if let Some(&(last_date, last_seq)) = self.last_key.get(&tx.symbol) {
            if key < (last_date, last_seq) {
                return Err(BookError::OutOfOrder {
                    symbol: tx.symbol.clone(),
                    date: tx.date,
                    seq: tx.seq,
                    last_date,
                    last_seq,
                });
            }
        }

        let queue = self.queues.entry(tx.symbol.clone()).or_default();
        apply_transaction(queue, tx, &mut self.realized, &mut self.warnings);
        self.last_key.insert(tx.symbol.clone(), key);
        Ok(())
    }

    /// Apply a sequence, stopping at the first invariant violation.
    pub fn extend<'a, I>(&mut self, txs: I) -> Result<(), BookError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        for tx in txs {
            self.apply(tx)?;
        }
        Ok(())
    }

    pub fn realized(&self) -> &[RealizedEvent] {
        &self.realized
    }

    pub fn warnings(&self) -> &[UnmatchedWarning] {
        &self.warnings
    }

    /// Open lots for `symbol`, if it has any.
    pub fn open_lots(&self, symbol: &str) -> Option<&OpenLotQueue> {
        self.queues.get(symbol).filter(|q| !q.is_empty())
    }

    pub fn realized_gain(&self) -> Micros {
        self.realized.iter().map(|e| e.gain).sum()
    }

    /// `true` if no symbol has an open lot.
    pub fn is_flat(&self) -> bool {
        self.queues.values().all(OpenLotQueue::is_empty)
    }

    /// Consume the book into the same shape the batch engine returns.
    ///
    /// Events are regrouped by symbol (stable), matching batch output order.
    pub fn finish(self) -> MatchOutcome {
        let mut realized = self.realized;
        realized.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let mut warnings = self.warnings;
        warnings.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let open_lots = self
            .queues
            .into_iter()
            .filter(|(_, q)| !q.is_empty())
            .collect();

        MatchOutcome {
            realized,
            warnings,
            open_lots,
        }
    }

    fn validate(tx: &Transaction) -> Result<(), BookError> {
        if tx.symbol.trim().is_empty() {
            return Err(BookError::EmptySymbol);
        }
        if !tx.qty.is_positive() {
            return Err(BookError::NonPositiveQty { qty: tx.qty });
        }
        if tx.price.is_negative() {
            return Err(BookError::NegativePrice { price: tx.price });
        }
        Ok(())
    }
}

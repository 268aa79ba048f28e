//! Ingest summary for a parsed transaction batch.
//!
//! Accepts a [`ParseOutcome`] and produces an [`IngestSummary`] covering:
//! - rows read / accepted / rejected
//! - rejected rows per reason
//! - symbols seen among accepted rows
//! - earliest / latest transaction date
//!
//! This module does **not** read files or run the matching engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::parser::{ParseOutcome, RejectReason};

/// Counts and ranges describing one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_ok: usize,
    pub rows_rejected: usize,
    /// Only reasons that occurred; iteration order is the enum order.
    pub rejected_by_reason: BTreeMap<RejectReason, usize>,
    pub symbols: BTreeSet<String>,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
}

impl IngestSummary {
    /// `true` when no row was rejected.
    pub fn is_clean(&self) -> bool {
        self.rows_rejected == 0
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: Option<NaiveDate>| d.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string());
        writeln!(
            f,
            "rows: read={} ok={} rejected={}",
            self.rows_read, self.rows_ok, self.rows_rejected
        )?;
        for (reason, count) in &self.rejected_by_reason {
            writeln!(f, "  {reason}: {count}")?;
        }
        writeln!(
            f,
            "symbols: {}",
            self.symbols.iter().cloned().collect::<Vec<_>>().join(",")
        )?;
        write!(
            f,
            "dates: {} .. {}",
            date(self.earliest_date),
            date(self.latest_date)
        )
    }
}

/// Build an [`IngestSummary`]. Independent of row order.
pub fn summarize(outcome: &ParseOutcome) -> IngestSummary {
    let mut rejected_by_reason: BTreeMap<RejectReason, usize> = BTreeMap::new();
    for rej in &outcome.rejections {
        *rejected_by_reason.entry(rej.reason).or_insert(0) += 1;
    }

    IngestSummary {
        rows_read: outcome.rows_read(),
        rows_ok: outcome.transactions.len(),
        rows_rejected: outcome.rejections.len(),
        rejected_by_reason,
        symbols: outcome.transactions.iter().map(|t| t.symbol.clone()).collect(),
        earliest_date: outcome.transactions.iter().map(|t| t.date).min(),
        latest_date: outcome.transactions.iter().map(|t| t.date).max(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

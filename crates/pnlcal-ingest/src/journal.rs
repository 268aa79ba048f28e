//! Per-day journal: hand-entered `date,buy,sell` rows.
//!
//! A journal entry records what was paid and what came back on one day,
//! with `profit = sell - buy`. Entries have no symbol and never reach the
//! FIFO book; they are folded into the daily map beside lot matches.
//!
//! Rows are judged one by one with the same rejection reasons as
//! transactions. Checks run in order: missing fields, date, buy, sell.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use pnlcal_portfolio::{JournalEntry, Micros};
use serde::Serialize;
use tracing::debug;

use crate::ingest_csv::{read_table, CsvIngestError};
use crate::normalizer::{parse_date, parse_price};
use crate::parser::{ParseOptions, RejectReason, Rejection};

/// Columns every journal file must carry.
pub const JOURNAL_COLUMNS: [&str; 3] = ["date", "buy", "sell"];

/// One journal row as strings. `None` means the source row had no such field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalRow {
    pub date: Option<String>,
    pub buy: Option<String>,
    pub sell: Option<String>,
}

impl JournalRow {
    pub fn new(date: &str, buy: &str, sell: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            buy: Some(buy.to_string()),
            sell: Some(sell.to_string()),
        }
    }
}

/// Parsed journal. `entries` keep file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalOutcome {
    pub entries: Vec<JournalEntry>,
    pub rejections: Vec<Rejection>,
}

impl JournalOutcome {
    pub fn rows_read(&self) -> usize {
        self.entries.len() + self.rejections.len()
    }

    pub fn entries_on(&self, date: NaiveDate) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.date == date)
    }

    /// Drop the entry read from `row`. Only the working set changes; the
    /// source file is never rewritten.
    pub fn remove_row(&mut self, row: usize) -> Option<JournalEntry> {
        let pos = self.entries.iter().position(|e| e.row == row)?;
        Some(self.entries.remove(pos))
    }

    pub fn total_profit(&self) -> Micros {
        self.entries.iter().map(|e| e.profit).sum()
    }
}

pub fn read_journal<R: Read>(reader: R) -> Result<Vec<JournalRow>, CsvIngestError> {
    read_table(reader, &JOURNAL_COLUMNS, |get| JournalRow {
        date: get("date"),
        buy: get("buy"),
        sell: get("sell"),
    })
}

/// Parse every row; never fails as a whole.
pub fn parse_journal<I>(rows: I, opts: &ParseOptions) -> JournalOutcome
where
    I: IntoIterator<Item = JournalRow>,
{
    let mut out = JournalOutcome::default();
    for (idx, raw) in rows.into_iter().enumerate() {
        match parse_journal_row(idx, &raw, opts) {
            Ok(entry) => out.entries.push(entry),
            Err(rej) => {
                debug!(
                    row = rej.row,
                    reason = rej.reason.as_str(),
                    value = %rej.value,
                    "journal row rejected"
                );
                out.rejections.push(rej);
            }
        }
    }
    out
}

pub fn parse_journal_row(
    idx: usize,
    raw: &JournalRow,
    opts: &ParseOptions,
) -> Result<JournalEntry, Rejection> {
    let row = idx + 1;
    let reject = |reason: RejectReason, value: &str| Rejection {
        row,
        reason,
        value: value.to_string(),
    };

    let fields = [
        ("date", raw.date.as_deref()),
        ("buy", raw.buy.as_deref()),
        ("sell", raw.sell.as_deref()),
    ];
    for (name, value) in fields {
        if value.map_or(true, |v| v.trim().is_empty()) {
            return Err(reject(RejectReason::MissingField, name));
        }
    }

    let date_s = raw.date.as_deref().unwrap_or_default();
    let buy_s = raw.buy.as_deref().unwrap_or_default();
    let sell_s = raw.sell.as_deref().unwrap_or_default();

    let date = parse_date(date_s, &opts.date_formats)
        .ok_or_else(|| reject(RejectReason::InvalidDate, date_s))?;
    let buy = parse_price(buy_s, opts.grouping_separator)
        .map_err(|_| reject(RejectReason::InvalidNumber, buy_s))?;
    let sell = parse_price(sell_s, opts.grouping_separator)
        .map_err(|_| reject(RejectReason::InvalidNumber, sell_s))?;

    Ok(JournalEntry::new(row, date, buy, sell))
}

pub fn ingest_journal_file(path: &Path, opts: &ParseOptions) -> Result<JournalOutcome, CsvIngestError> {
    let file = std::fs::File::open(path).map_err(|source| CsvIngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(finish(read_journal(file)?, opts))
}

pub fn ingest_journal_str(src: &str, opts: &ParseOptions) -> Result<JournalOutcome, CsvIngestError> {
    Ok(finish(read_journal(src.as_bytes())?, opts))
}

fn finish(rows: Vec<JournalRow>, opts: &ParseOptions) -> JournalOutcome {
    let out = parse_journal(rows, opts);
    tracing::info!(
        rows_read = out.rows_read(),
        entries = out.entries.len(),
        rejected = out.rejections.len(),
        "journal ingest complete"
    );
    out
}

//! Row-level transaction parser.
//!
//! Turns raw string rows into typed [`Transaction`]s. Every row is judged on
//! its own: a malformed row becomes a [`Rejection`] and parsing continues.
//!
//! Checks run in a fixed order and the first failure is the reported reason:
//! missing fields, date, side, quantity, price.

use std::fmt;

use pnlcal_portfolio::{Side, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::normalizer::{
    parse_date, parse_price, parse_qty, DEFAULT_DATE_FORMATS, DEFAULT_GROUPING_SEPARATOR,
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One input row as strings. `None` means the source row had no such field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub date: Option<String>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
}

impl RawRow {
    /// Convenience constructor for a row where every field is present.
    pub fn new(date: &str, symbol: &str, side: &str, quantity: &str, price: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            symbol: Some(symbol.to_string()),
            side: Some(side.to_string()),
            quantity: Some(quantity.to_string()),
            price: Some(price.to_string()),
        }
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("date", self.date.as_deref()),
            ("symbol", self.symbol.as_deref()),
            ("side", self.side.as_deref()),
            ("quantity", self.quantity.as_deref()),
            ("price", self.price.as_deref()),
        ]
    }
}

/// Knobs for the parser; normally built from the `parser` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// `chrono` format strings, tried in order.
    pub date_formats: Vec<String>,
    pub grouping_separator: char,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            grouping_separator: DEFAULT_GROUPING_SEPARATOR,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Category of a rejected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidDate,
    InvalidSide,
    InvalidNumber,
    MissingField,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidDate => "invalid_date",
            RejectReason::InvalidSide => "invalid_side",
            RejectReason::InvalidNumber => "invalid_number",
            RejectReason::MissingField => "missing_field",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row that did not become a transaction.
///
/// `row` is the 1-based data row number (the header is not counted).
/// `value` is the offending raw text; for `missing_field` it is the field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub row: usize,
    pub reason: RejectReason,
    pub value: String,
}

/// Result of parsing a batch of rows.
///
/// `transactions` keep input order; `seq` is the zero-based row index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    pub rejections: Vec<Rejection>,
}

impl ParseOutcome {
    pub fn rows_read(&self) -> usize {
        self.transactions.len() + self.rejections.len()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse every row; never fails as a whole.
pub fn parse<I>(rows: I, opts: &ParseOptions) -> ParseOutcome
where
    I: IntoIterator<Item = RawRow>,
{
    let mut out = ParseOutcome::default();

    for (idx, raw) in rows.into_iter().enumerate() {
        match parse_row(idx, &raw, opts) {
            Ok(tx) => out.transactions.push(tx),
            Err(rej) => {
                debug!(
                    row = rej.row,
                    reason = rej.reason.as_str(),
                    value = %rej.value,
                    "row rejected"
                );
                out.rejections.push(rej);
            }
        }
    }

    out
}

/// Parse a single row. `idx` is the zero-based row position.
pub fn parse_row(idx: usize, raw: &RawRow, opts: &ParseOptions) -> Result<Transaction, Rejection> {
    let row = idx + 1;
    let reject = |reason: RejectReason, value: &str| Rejection {
        row,
        reason,
        value: value.to_string(),
    };

    for (name, value) in raw.fields() {
        if value.map_or(true, |v| v.trim().is_empty()) {
            return Err(reject(RejectReason::MissingField, name));
        }
    }

    // Presence checked above.
    let date_s = raw.date.as_deref().unwrap_or_default();
    let symbol_s = raw.symbol.as_deref().unwrap_or_default();
    let side_s = raw.side.as_deref().unwrap_or_default();
    let qty_s = raw.quantity.as_deref().unwrap_or_default();
    let price_s = raw.price.as_deref().unwrap_or_default();

    let date = parse_date(date_s, &opts.date_formats)
        .ok_or_else(|| reject(RejectReason::InvalidDate, date_s))?;

    let side = Side::parse(side_s).ok_or_else(|| reject(RejectReason::InvalidSide, side_s))?;

    let qty = parse_qty(qty_s, opts.grouping_separator)
        .map_err(|_| reject(RejectReason::InvalidNumber, qty_s))?;

    let price = parse_price(price_s, opts.grouping_separator)
        .map_err(|_| reject(RejectReason::InvalidNumber, price_s))?;

    let symbol = symbol_s.trim().to_ascii_uppercase();

    Ok(Transaction::new(idx, date, symbol, side, qty, price))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

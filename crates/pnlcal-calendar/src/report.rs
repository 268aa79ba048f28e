//! Report pipeline: parsed rows → FIFO matching → daily map.
//!
//! Filters:
//! - `symbol` is applied to transactions before matching, so other symbols
//!   never touch the book.
//! - `from` / `to` (inclusive) are applied after matching to realized events
//!   and warnings by their sell date. Matching always sees full history, so a
//!   SELL inside the range still consumes lots opened before it.
//!
//! Journal entries are merged after matching. They follow the date range;
//! a symbol-scoped report leaves them out since they carry no symbol.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use pnlcal_config::AppConfig;
use pnlcal_ingest::{IngestSummary, JournalOutcome, ParseOptions, ParseOutcome, Rejection};
use pnlcal_portfolio::{
    aggregate, group_for_matching, match_fifo, DailyPnl, JournalEntry, MatchOutcome, Micros,
    OpenLotQueue, Qty, RealizedEvent, UnmatchedWarning,
};
use serde::Serialize;
use tracing::info;

use crate::ReportError;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Compared case-insensitively; symbols are upper-cased at parse time.
    pub symbol: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn validate(&self) -> Result<(), ReportError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ReportError::InvalidRange { from, to });
            }
        }
        Ok(())
    }

    pub fn matches_symbol(&self, symbol: &str) -> bool {
        self.symbol
            .as_deref()
            .map_or(true, |s| s.trim().eq_ignore_ascii_case(symbol))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything one run produces. Diagnostics travel with the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarReport {
    pub summary: IngestSummary,
    pub rejections: Vec<Rejection>,
    pub realized: Vec<RealizedEvent>,
    pub warnings: Vec<UnmatchedWarning>,
    pub daily: DailyPnl,
    pub total: Micros,
    pub open_lots: BTreeMap<String, OpenLotQueue>,
    pub journal: Vec<JournalEntry>,
    pub journal_rejections: Vec<Rejection>,
}

/// One row of the open-lots listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenLotRow {
    pub symbol: String,
    pub open_date: NaiveDate,
    pub remaining: Qty,
    pub unit_cost: Micros,
    pub cost: Micros,
}

/// Everything a run set aside instead of turning into P&L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostics<'a> {
    pub warnings: &'a [UnmatchedWarning],
    pub rejections: &'a [Rejection],
    pub journal_rejections: &'a [Rejection],
}

impl CalendarReport {
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics {
            warnings: &self.warnings,
            rejections: &self.rejections,
            journal_rejections: &self.journal_rejections,
        }
    }

    /// Open lots flattened, by symbol then FIFO order.
    pub fn open_lot_rows(&self) -> Vec<OpenLotRow> {
        self.open_lots
            .iter()
            .flat_map(|(symbol, q)| {
                q.iter().map(move |lot| OpenLotRow {
                    symbol: symbol.clone(),
                    open_date: lot.open_date,
                    remaining: lot.remaining,
                    unit_cost: lot.unit_cost,
                    cost: lot.open_cost(),
                })
            })
            .collect()
    }

    /// Remaining cost basis per symbol.
    pub fn open_cost_by_symbol(&self) -> BTreeMap<String, Micros> {
        self.open_lots
            .iter()
            .map(|(s, q)| (s.clone(), q.open_cost()))
            .collect()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.rejections.is_empty()
            || !self.warnings.is_empty()
            || !self.journal_rejections.is_empty()
    }

    /// Fold a parsed journal into the daily map and total.
    pub fn merge_journal(&mut self, journal: JournalOutcome, filter: &ReportFilter) {
        let JournalOutcome {
            entries,
            rejections,
        } = journal;
        let entries: Vec<JournalEntry> = if filter.symbol.is_some() {
            Vec::new()
        } else {
            entries
                .into_iter()
                .filter(|e| filter.contains(e.date))
                .collect()
        };

        self.daily.add_journal(&entries);
        self.total = self.daily.total();
        info!(
            entries = entries.len(),
            rejected = rejections.len(),
            total = %self.total,
            "journal merged"
        );
        self.journal.extend(entries);
        self.journal_rejections.extend(rejections);
    }
}

/// Build a report from an already parsed batch.
pub fn build_report(
    outcome: ParseOutcome,
    summary: IngestSummary,
    filter: &ReportFilter,
) -> Result<CalendarReport, ReportError> {
    filter.validate()?;

    let ParseOutcome {
        transactions,
        rejections,
    } = outcome;

    let by_symbol = group_for_matching(
        transactions
            .into_iter()
            .filter(|t| filter.matches_symbol(&t.symbol)),
    );

    let MatchOutcome {
        realized,
        warnings,
        open_lots,
    } = match_fifo(&by_symbol);

    let realized: Vec<RealizedEvent> = realized
        .into_iter()
        .filter(|e| filter.contains(e.date))
        .collect();
    let warnings: Vec<UnmatchedWarning> = warnings
        .into_iter()
        .filter(|w| filter.contains(w.date))
        .collect();

    let daily = aggregate(&realized);
    let total = daily.total();

    info!(
        symbols = by_symbol.len(),
        events = realized.len(),
        days = daily.len(),
        warnings = warnings.len(),
        total = %total,
        "report built"
    );

    Ok(CalendarReport {
        summary,
        rejections,
        realized,
        warnings,
        daily,
        total,
        open_lots,
        journal: Vec::new(),
        journal_rejections: Vec::new(),
    })
}

/// Parser options from the `parser` config section.
pub fn parse_options(cfg: &AppConfig) -> ParseOptions {
    ParseOptions {
        date_formats: cfg.parser.date_formats.clone(),
        grouping_separator: cfg.parser.grouping_char(),
    }
}

pub fn report_from_csv_str(
    src: &str,
    cfg: &AppConfig,
    filter: &ReportFilter,
) -> Result<CalendarReport, ReportError> {
    let (outcome, summary) = pnlcal_ingest::ingest_str(src, &parse_options(cfg))?;
    build_report(outcome, summary, filter)
}

pub fn report_from_csv_file(
    path: &Path,
    cfg: &AppConfig,
    filter: &ReportFilter,
) -> Result<CalendarReport, ReportError> {
    let (outcome, summary) = pnlcal_ingest::ingest_file(path, &parse_options(cfg))?;
    build_report(outcome, summary, filter)
}

pub fn journal_from_csv_str(src: &str, cfg: &AppConfig) -> Result<JournalOutcome, ReportError> {
    Ok(pnlcal_ingest::ingest_journal_str(src, &parse_options(cfg))?)
}

pub fn journal_from_csv_file(path: &Path, cfg: &AppConfig) -> Result<JournalOutcome, ReportError> {
    Ok(pnlcal_ingest::ingest_journal_file(path, &parse_options(cfg))?)
}

//! pnlcal-calendar
//!
//! End-to-end pipeline from parsed rows to the per-day calendar.
//! - `report`: filter → match → aggregate, with rejections and warnings kept
//!   next to the numbers; journal entries merged into the daily map
//! - `grid`: month projection of the daily map for calendar display
//! - `export`: daily P&L as CSV
//!
//! No I/O beyond what callers hand in (`&str`, `Path`, `io::Write`).

pub mod export;
pub mod grid;
pub mod report;

use chrono::NaiveDate;
use thiserror::Error;

pub use export::write_daily_csv;
pub use grid::{month_grid, parse_year_month, weekday_labels, DayCell, MonthGrid};
pub use pnlcal_config::WeekStart;
pub use pnlcal_ingest::{JournalOutcome, Rejection};
pub use report::{
    build_report, journal_from_csv_file, journal_from_csv_str, parse_options,
    report_from_csv_file, report_from_csv_str, CalendarReport, Diagnostics, OpenLotRow,
    ReportFilter,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid date range: from {from} is after to {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error(transparent)]
    Ingest(#[from] pnlcal_ingest::CsvIngestError),
}

//! pnlcal-ingest
//!
//! Transaction input boundary.
//! - `ingest_csv`: CSV text → raw string rows (header contract, quoting)
//! - `normalizer`: decimal strings → fixed-point, date strings → `NaiveDate`
//! - `parser`: raw rows → `Transaction`s plus categorized rejections
//! - `summary`: counts and ranges for one ingest run
//! - `journal`: hand-entered `date,buy,sell` rows, same rejection reasons
//!
//! Rows never fail the batch; only structural problems (unreadable file,
//! missing header column) are returned as `Err`.

pub mod ingest_csv;
pub mod journal;
pub mod normalizer;
pub mod parser;
pub mod summary;

pub use ingest_csv::{read_csv, read_csv_file, read_csv_str, CsvIngestError, REQUIRED_COLUMNS};
pub use journal::{
    ingest_journal_file, ingest_journal_str, parse_journal, read_journal, JournalOutcome,
    JournalRow, JOURNAL_COLUMNS,
};
pub use normalizer::{NumberError, DEFAULT_DATE_FORMATS, DEFAULT_GROUPING_SEPARATOR};
pub use parser::{parse, ParseOptions, ParseOutcome, RawRow, RejectReason, Rejection};
pub use summary::{summarize, IngestSummary};

/// Read, parse and summarize a CSV file in one call.
pub fn ingest_file(
    path: &std::path::Path,
    opts: &ParseOptions,
) -> Result<(ParseOutcome, IngestSummary), CsvIngestError> {
    Ok(finish(read_csv_file(path)?, opts))
}

/// Same as [`ingest_file`] for in-memory CSV text.
pub fn ingest_str(
    src: &str,
    opts: &ParseOptions,
) -> Result<(ParseOutcome, IngestSummary), CsvIngestError> {
    Ok(finish(read_csv_str(src)?, opts))
}

fn finish(rows: Vec<RawRow>, opts: &ParseOptions) -> (ParseOutcome, IngestSummary) {
    let outcome = parse(rows, opts);
    let summary = summarize(&outcome);
    tracing::info!(
        rows_read = summary.rows_read,
        rows_ok = summary.rows_ok,
        rows_rejected = summary.rows_rejected,
        "ingest complete"
    );
    (outcome, summary)
}

//! CSV reading for transaction files.
//!
//! This is the **read** side only: it turns CSV text into [`RawRow`]s and
//! leaves validation to [`crate::parser`].
//!
//! ## CSV column contract (case-insensitive, order-independent)
//!
//! | Column     | Example      | Notes                                  |
//! |------------|--------------|----------------------------------------|
//! | `date`     | `2024-05-01` | Formats are configurable               |
//! | `symbol`   | `AAPL`       | Trimmed and upper-cased by the parser  |
//! | `side`     | `buy`        | `BUY` / `SELL`, any case               |
//! | `quantity` | `"12,000"`   | Quote fields that contain the grouping |
//! | `price`    | `182.34`     | Decimal string; no floats              |
//!
//! Extra columns are ignored. Short rows are kept; their missing fields are
//! `None` and the parser rejects them as `missing_field`.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::RawRow;

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "symbol", "side", "quantity", "price"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Structural failures. Bad rows are never reported here.
#[derive(Debug, Error)]
pub enum CsvIngestError {
    #[error("open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv missing required header column: '{0}'")]
    MissingHeader(String),
    #[error("csv read error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read all rows from the CSV file at `path`.
pub fn read_csv_file(path: &Path) -> Result<Vec<RawRow>, CsvIngestError> {
    let file = std::fs::File::open(path).map_err(|source| CsvIngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Read rows from a string slice.
pub fn read_csv_str(src: &str) -> Result<Vec<RawRow>, CsvIngestError> {
    read_csv(src.as_bytes())
}

/// Read rows from any reader. A header row is required.
///
/// Blank lines are skipped. Non-UTF-8 bytes are replaced rather than failing
/// the file, so the affected row is rejected by the parser instead.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, CsvIngestError> {
    read_table(reader, &REQUIRED_COLUMNS, |get| RawRow {
        date: get("date"),
        symbol: get("symbol"),
        side: get("side"),
        quantity: get("quantity"),
        price: get("price"),
    })
}

/// Shared reader loop: header index over `required`, then one `build` call
/// per record. `get` looks a field up by lower-case column name.
pub(crate) fn read_table<R, T, F>(
    reader: R,
    required: &[&str],
    mut build: F,
) -> Result<Vec<T>, CsvIngestError>
where
    R: Read,
    F: FnMut(&dyn Fn(&str) -> Option<String>) -> T,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let col_idx = build_col_index(&headers, required)?;

    let mut out = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        let get = |name: &str| -> Option<String> {
            let i = col_idx.get(name)?;
            record
                .get(*i)
                .map(|b| String::from_utf8_lossy(b).into_owned())
        };
        out.push(build(&get));
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a case-insensitive column-name → index map from the header record.
///
/// When a column name repeats, the first occurrence wins.
fn build_col_index(
    headers: &csv::ByteRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>, CsvIngestError> {
    let mut idx: HashMap<String, usize> = HashMap::new();
    for (i, col) in headers.iter().enumerate() {
        let name = String::from_utf8_lossy(col)
            .trim()
            .trim_start_matches('\u{feff}')
            .to_ascii_lowercase();
        idx.entry(name).or_insert(i);
    }

    for req in required {
        if !idx.contains_key(*req) {
            return Err(CsvIngestError::MissingHeader(req.to_string()));
        }
    }

    Ok(idx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Canonical number and date normalization for transaction rows.
//!
//! Converts locale-formatted decimal strings (`"12,000"`, `"1,234.56"`) into
//! 1e-6 fixed-point integers and date strings into `NaiveDate`.
//!
//! It does **not**:
//! - read files (that is `ingest_csv.rs`)
//! - decide row acceptance (that is `parser.rs`)
//!
//! No floating-point is used at any stage.

use chrono::NaiveDate;
use pnlcal_portfolio::{Micros, Qty, SCALE, SCALE_DIGITS};
use thiserror::Error;

/// Date formats tried in order when the caller supplies none.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Grouping separator stripped from numbers when the caller supplies none.
pub const DEFAULT_GROUPING_SEPARATOR: char = ',';

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a numeric field could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("number is empty")]
    Empty,
    #[error("not a decimal number: '{raw}'")]
    Invalid { raw: String },
    #[error("more than {SCALE_DIGITS} decimal places: '{raw}'")]
    TooManyDecimalPlaces { raw: String },
    #[error("number out of range: '{raw}'")]
    OutOfRange { raw: String },
    #[error("quantity must be > 0: '{raw}'")]
    NonPositiveQty { raw: String },
    #[error("price must be >= 0: '{raw}'")]
    NegativePrice { raw: String },
}

// ---------------------------------------------------------------------------
// Decimal conversion
// ---------------------------------------------------------------------------

/// Convert a decimal string to a raw 1e-6 fixed-point integer.
///
/// Rules:
/// - Surrounding whitespace is ignored.
/// - Every `grouping` character is stripped first (`"12,000"` → `12000`).
/// - Accepts an optional leading `+` or `-`.
/// - `.` is the only decimal point; at most one is allowed (`"12.000.5"` is
///   rejected).
/// - At most 6 fractional digits (would otherwise require rounding).
/// - Anything else (letters, `NaN`, `inf`, exponents) is rejected.
pub fn decimal_to_raw(s: &str, grouping: char) -> Result<i64, NumberError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Empty);
    }
    let invalid = || NumberError::Invalid {
        raw: trimmed.to_string(),
    };

    let stripped: String = trimmed.chars().filter(|c| *c != grouping).collect();

    let (negative, digits) = if let Some(rest) = stripped.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = stripped.strip_prefix('+') {
        (false, rest)
    } else {
        (false, stripped.as_str())
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    // A second '.' lands in frac_part and fails here.
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    if frac_part.len() > SCALE_DIGITS {
        return Err(NumberError::TooManyDecimalPlaces {
            raw: trimmed.to_string(),
        });
    }

    let out_of_range = || NumberError::OutOfRange {
        raw: trimmed.to_string(),
    };

    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<i64>().map_err(|_| out_of_range())?
    };

    let frac_val: i64 = if frac_part.is_empty() {
        0
    } else {
        let pad = SCALE_DIGITS - frac_part.len();
        let parsed: i64 = frac_part.parse().map_err(|_| invalid())?;
        parsed * 10_i64.pow(pad as u32)
    };

    let raw = int_val
        .checked_mul(SCALE)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or_else(out_of_range)?;

    Ok(if negative { -raw } else { raw })
}

/// Parse a quantity; must be strictly positive.
pub fn parse_qty(s: &str, grouping: char) -> Result<Qty, NumberError> {
    let raw = decimal_to_raw(s, grouping)?;
    if raw <= 0 {
        return Err(NumberError::NonPositiveQty {
            raw: s.trim().to_string(),
        });
    }
    Ok(Qty::new(raw))
}

/// Parse a unit price; zero is allowed, negative is not.
pub fn parse_price(s: &str, grouping: char) -> Result<Micros, NumberError> {
    let raw = decimal_to_raw(s, grouping)?;
    if raw < 0 {
        return Err(NumberError::NegativePrice {
            raw: s.trim().to_string(),
        });
    }
    Ok(Micros::new(raw))
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a calendar date, trying each `formats` entry in order.
///
/// An empty `formats` slice falls back to [`DEFAULT_DATE_FORMATS`].
pub fn parse_date<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if formats.is_empty() {
        return DEFAULT_DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok());
    }
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f.as_ref()).ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const G: char = DEFAULT_GROUPING_SEPARATOR;

    #[test]
    fn whole_number() {
        assert_eq!(decimal_to_raw("100", G).unwrap(), 100_000_000);
    }

    #[test]
    fn two_decimal_places() {
        assert_eq!(decimal_to_raw("182.34", G).unwrap(), 182_340_000);
    }

    #[test]
    fn six_decimal_places() {
        assert_eq!(decimal_to_raw("1.123456", G).unwrap(), 1_123_456);
    }

    #[test]
    fn seven_decimal_places_rejected() {
        assert!(matches!(
            decimal_to_raw("1.1234567", G),
            Err(NumberError::TooManyDecimalPlaces { .. })
        ));
    }

    #[test]
    fn grouping_separator_stripped() {
        assert_eq!(decimal_to_raw("12,000", G).unwrap(), 12_000_000_000);
        assert_eq!(decimal_to_raw("1,234.56", G).unwrap(), 1_234_560_000);
        assert_eq!(decimal_to_raw(" 1,000,000 ", G).unwrap(), 1_000_000_000_000);
    }

    #[test]
    fn custom_grouping_separator() {
        assert_eq!(decimal_to_raw("12 000.5", ' ').unwrap(), 12_000_500_000);
        assert_eq!(decimal_to_raw("12_000", '_').unwrap(), 12_000_000_000);
        // ',' is not special when another separator is configured
        assert!(decimal_to_raw("12,000", '_').is_err());
    }

    #[test]
    fn two_decimal_points_rejected() {
        assert_eq!(
            decimal_to_raw("12.000.5", G),
            Err(NumberError::Invalid {
                raw: "12.000.5".to_string()
            })
        );
    }

    #[test]
    fn leading_and_trailing_dot() {
        assert_eq!(decimal_to_raw(".5", G).unwrap(), 500_000);
        assert_eq!(decimal_to_raw("5.", G).unwrap(), 5_000_000);
        assert!(decimal_to_raw(".", G).is_err());
    }

    #[test]
    fn signs() {
        assert_eq!(decimal_to_raw("-2.5", G).unwrap(), -2_500_000);
        assert_eq!(decimal_to_raw("+2.5", G).unwrap(), 2_500_000);
        assert!(decimal_to_raw("-", G).is_err());
    }

    #[test]
    fn non_finite_and_garbage_rejected() {
        for s in ["NaN", "inf", "-inf", "1e5", "abc", "12a", "0x10"] {
            assert!(
                matches!(decimal_to_raw(s, G), Err(NumberError::Invalid { .. })),
                "expected Invalid for '{s}'"
            );
        }
        assert_eq!(decimal_to_raw("   ", G), Err(NumberError::Empty));
    }

    #[test]
    fn overflow_is_out_of_range() {
        assert!(matches!(
            decimal_to_raw("99999999999999999999", G),
            Err(NumberError::OutOfRange { .. })
        ));
        assert!(matches!(
            decimal_to_raw("9999999999999", G),
            Err(NumberError::OutOfRange { .. })
        ));
    }

    #[test]
    fn qty_must_be_positive() {
        assert_eq!(parse_qty("3", G).unwrap(), Qty::from_units(3));
        assert!(matches!(parse_qty("0", G), Err(NumberError::NonPositiveQty { .. })));
        assert!(matches!(parse_qty("-1", G), Err(NumberError::NonPositiveQty { .. })));
    }

    #[test]
    fn price_may_be_zero_not_negative() {
        assert_eq!(parse_price("0", G).unwrap(), Micros::ZERO);
        assert!(matches!(parse_price("-0.01", G), Err(NumberError::NegativePrice { .. })));
    }

    #[test]
    fn date_default_formats() {
        let none: [&str; 0] = [];
        let want = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09", &none), Some(want));
        assert_eq!(parse_date("2024/03/09", &none), Some(want));
        assert_eq!(parse_date(" 2024-03-09 ", &none), Some(want));
        assert_eq!(parse_date("2024-02-30", &none), None);
        assert_eq!(parse_date("03/09/2024", &none), None);
        assert_eq!(parse_date("", &none), None);
    }

    #[test]
    fn date_custom_formats() {
        let formats = vec!["%d.%m.%Y".to_string()];
        assert_eq!(
            parse_date("09.03.2024", &formats),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(parse_date("2024-03-09", &formats), None);
    }
}

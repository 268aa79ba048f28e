//! Fixed-point amounts for matching and aggregation.
//!
//! # Motivation
//!
//! Every number that flows through the engine (share quantity, unit price,
//! cost basis, proceeds, gain) is a decimal read from text. Floats would
//! accumulate drift across thousands of partial matches, so both quantities
//! and money use a 1e-6 fixed-point representation stored as `i64`.
//!
//! Two newtypes keep the two kinds apart at compile time:
//! - [`Micros`]: money and per-unit prices. 1 currency unit = 1_000_000.
//! - [`Qty`]: instrument quantity. 1 share = 1_000_000.
//!
//! Neither has a `From<i64>` impl; construction is always deliberate.
//!
//! # Arithmetic
//!
//! - `Add`, `Sub`, `Neg`, `AddAssign`, `SubAssign` are closed over each type.
//! - [`Micros::notional`] multiplies a price by a quantity in `i128`, rounds
//!   half away from zero back to 1e-6, and saturates at the `i64` bounds.
//!   Saturation only triggers for notionals above ~9.2e12, far outside any
//!   realistic position.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Serialize, Serializer};

/// Fixed-point scale shared by [`Micros`] and [`Qty`].
pub const SCALE: i64 = 1_000_000;

/// Number of fractional digits representable at [`SCALE`].
pub const SCALE_DIGITS: usize = 6;

// ---------------------------------------------------------------------------
// Micros newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount (or per-unit price) at 1e-6 scale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);
    pub const MIN: Micros = Micros(i64::MIN);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Whole currency units, e.g. `Micros::from_units(150)` is 150.000000.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Micros(units * SCALE)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    /// `price × qty`, rounded half away from zero to 1e-6 and saturated.
    pub fn notional(price: Micros, qty: Qty) -> Micros {
        let prod = (price.0 as i128) * (qty.0 as i128);
        Micros(clamp_i128(div_round_half_away(prod, SCALE as i128)))
    }

    /// Render with `decimals` fractional digits (0..=6), rounding half away
    /// from zero. Used for display only; arithmetic stays at full scale.
    pub fn format_decimals(self, decimals: u8) -> String {
        format_fixed(self.0, decimals)
    }
}

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Micros {
    #[inline]
    fn sub_assign(&mut self, rhs: Micros) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Micros {
    fn sum<I: Iterator<Item = Micros>>(iter: I) -> Micros {
        iter.fold(Micros::ZERO, Micros::saturating_add)
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, SCALE_DIGITS as u8))
    }
}

impl Serialize for Micros {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Qty newtype
// ---------------------------------------------------------------------------

/// An instrument quantity at 1e-6 scale. Fractional shares are allowed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qty(i64);

impl Qty {
    pub const ZERO: Qty = Qty(0);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Qty(raw)
    }

    /// Whole shares, e.g. `Qty::from_units(10)`.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Qty(units * SCALE)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Qty {
    type Output = Qty;
    #[inline]
    fn add(self, rhs: Qty) -> Qty {
        Qty(self.0 + rhs.0)
    }
}

impl Sub for Qty {
    type Output = Qty;
    #[inline]
    fn sub(self, rhs: Qty) -> Qty {
        Qty(self.0 - rhs.0)
    }
}

impl AddAssign for Qty {
    #[inline]
    fn add_assign(&mut self, rhs: Qty) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Qty {
    #[inline]
    fn sub_assign(&mut self, rhs: Qty) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Qty {
    fn sum<I: Iterator<Item = Qty>>(iter: I) -> Qty {
        iter.fold(Qty::ZERO, |a, b| Qty(a.0.saturating_add(b.0)))
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_trimmed(self.0))
    }
}

impl Serialize for Qty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clamp_i128(x: i128) -> i64 {
    if x > i64::MAX as i128 {
        i64::MAX
    } else if x < i64::MIN as i128 {
        i64::MIN
    } else {
        x as i64
    }
}

fn div_round_half_away(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    let q = num / den;
    let r = num % den;
    match (r.abs() * 2).cmp(&den) {
        Ordering::Less => q,
        _ => q + num.signum(),
    }
}

fn format_fixed(raw: i64, decimals: u8) -> String {
    let decimals = (decimals as usize).min(SCALE_DIGITS);
    let drop = 10_i128.pow((SCALE_DIGITS - decimals) as u32);
    let scaled = div_round_half_away(raw as i128, drop);
    let unit = 10_i128.pow(decimals as u32);

    let sign = if scaled < 0 { "-" } else { "" };
    let abs = scaled.abs();
    let whole = abs / unit;
    if decimals == 0 {
        return format!("{sign}{whole}");
    }
    let frac = abs % unit;
    format!("{sign}{whole}.{frac:0width$}", width = decimals)
}

/// Quantities print without trailing zeros: `15`, `2.5`, `0.000001`.
fn format_trimmed(raw: i64) -> String {
    let s = format_fixed(raw, SCALE_DIGITS as u8);
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

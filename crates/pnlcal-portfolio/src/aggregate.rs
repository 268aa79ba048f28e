//! Daily realized P&L aggregation.
//!
//! Folds realized events into one entry per sell date. The fold is a plain
//! sum per key, so the result does not depend on event order. Only dates
//! with at least one event get an entry.
//!
//! Journal entries are added on top with [`DailyPnl::add_journal`]. They
//! count toward `gain` but are tallied apart from lot matches.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::fixedpoint::Micros;
use crate::types::{JournalEntry, RealizedEvent};

/// Realized P&L for one calendar day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DayPnl {
    /// Lot-match gains plus journal profit on this date.
    pub gain: Micros,
    /// Number of realized events (lot matches) on this date.
    pub events: usize,
    /// Per-symbol lot-match subtotals. With `journal_gain` they add up to
    /// `gain`.
    pub by_symbol: BTreeMap<String, Micros>,
    pub journal_gain: Micros,
    /// Number of journal entries on this date; never counted in `events`.
    pub journal_entries: usize,
}

impl DayPnl {
    /// Gain from lot matches alone.
    pub fn realized_gain(&self) -> Micros {
        self.gain.saturating_sub(self.journal_gain)
    }
}

/// Date → realized P&L, sorted by date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailyPnl {
    days: BTreeMap<NaiveDate, DayPnl>,
}

/// Sum realized gains per sell date across all symbols.
pub fn aggregate<'a, I>(events: I) -> DailyPnl
where
    I: IntoIterator<Item = &'a RealizedEvent>,
{
    let mut days: BTreeMap<NaiveDate, DayPnl> = BTreeMap::new();
    for e in events {
        let day = days.entry(e.date).or_default();
        day.gain = day.gain.saturating_add(e.gain);
        day.events += 1;
        let sym = day.by_symbol.entry(e.symbol.clone()).or_default();
        *sym = sym.saturating_add(e.gain);
    }
    DailyPnl { days }
}

impl DailyPnl {
    /// Fold journal entries in. Dates with no lot match gain a key.
    pub fn add_journal<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a JournalEntry>,
    {
        for e in entries {
            let day = self.days.entry(e.date).or_default();
            day.gain = day.gain.saturating_add(e.profit);
            day.journal_gain = day.journal_gain.saturating_add(e.profit);
            day.journal_entries += 1;
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayPnl> {
        self.days.get(&date)
    }

    /// Realized gain on `date`, or `None` when nothing was realized.
    pub fn gain_on(&self, date: NaiveDate) -> Option<Micros> {
        self.days.get(&date).map(|d| d.gain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayPnl)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    pub fn total(&self) -> Micros {
        self.days.values().map(|d| d.gain).sum()
    }

    /// Sum over `from..=to`.
    pub fn total_between(&self, from: NaiveDate, to: NaiveDate) -> Micros {
        if from > to {
            return Micros::ZERO;
        }
        self.days.range(from..=to).map(|(_, d)| d.gain).sum()
    }

    /// Sum over one calendar month.
    pub fn month_total(&self, year: i32, month: u32) -> Micros {
        self.days
            .iter()
            .filter(|(d, _)| d.year() == year && d.month() == month)
            .map(|(_, d)| d.gain)
            .sum()
    }
}

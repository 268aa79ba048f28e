//! Month grid for calendar display.
//!
//! Deterministic, pure logic. The grid starts on the configured first weekday
//! and has only as many weeks as the month needs (4 to 6); there is no fixed
//! six-week layout. Leading and trailing cells from neighbouring months are
//! present for shape but never carry P&L.

use chrono::{Datelike, Days, NaiveDate};
use pnlcal_config::WeekStart;
use pnlcal_portfolio::{DailyPnl, Micros};
use serde::Serialize;

use crate::ReportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    /// Realized P&L; `None` when nothing was realized or the cell is outside
    /// the month.
    pub pnl: Option<Micros>,
    pub events: usize,
    pub journal_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    /// Each inner vector has exactly 7 cells.
    pub weeks: Vec<Vec<DayCell>>,
    pub total: Micros,
    /// Days in the month with a realized event or a journal entry.
    pub active_days: usize,
}

/// Short weekday names in grid column order.
pub fn weekday_labels(week_start: WeekStart) -> [&'static str; 7] {
    match week_start {
        WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    }
}

/// Parse `YYYY-MM`.
pub fn parse_year_month(s: &str) -> Result<(i32, u32), ReportError> {
    let bad = || ReportError::InvalidMonth(s.to_string());
    let (y, m) = s.trim().split_once('-').ok_or_else(bad)?;
    if y.len() != 4 || m.len() != 2 {
        return Err(bad());
    }
    let year: i32 = y.parse().map_err(|_| bad())?;
    let month: u32 = m.parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)?;
    Ok((year, month))
}

/// Project `daily` onto the grid of one month.
pub fn month_grid(
    daily: &DailyPnl,
    year: i32,
    month: u32,
    week_start: WeekStart,
) -> Result<MonthGrid, ReportError> {
    let bad = || ReportError::InvalidMonth(format!("{year:04}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(bad)?;

    let lead = match week_start {
        WeekStart::Sunday => first.weekday().num_days_from_sunday(),
        WeekStart::Monday => first.weekday().num_days_from_monday(),
    };
    let mut cursor = first
        .checked_sub_days(Days::new(u64::from(lead)))
        .ok_or_else(bad)?;

    let mut weeks: Vec<Vec<DayCell>> = Vec::new();
    let mut active_days = 0;
    while cursor <= last {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            let in_month = cursor.year() == year && cursor.month() == month;
            let day = if in_month { daily.get(cursor) } else { None };
            if day.is_some() {
                active_days += 1;
            }
            week.push(DayCell {
                date: cursor,
                in_month,
                pnl: day.map(|d| d.gain),
                events: day.map_or(0, |d| d.events),
                journal_entries: day.map_or(0, |d| d.journal_entries),
            });
            cursor = cursor.succ_opt().ok_or_else(bad)?;
        }
        weeks.push(week);
    }

    Ok(MonthGrid {
        year,
        month,
        week_start,
        weeks,
        total: daily.month_total(year, month),
        active_days,
    })
}

impl MonthGrid {
    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.weeks.iter().flatten().find(|c| c.date == date)
    }

    /// Plain-text rendering: a header row, one row per week, then the total.
    /// Cells outside the month are blank.
    pub fn render_text(&self, decimals: u8) -> String {
        let width = 12;
        let mut out = format!("{:04}-{:02}\n", self.year, self.month);

        for label in weekday_labels(self.week_start) {
            out.push_str(&format!("{label:>width$}"));
        }
        out.push('\n');

        for week in &self.weeks {
            let mut days = String::new();
            let mut pnls = String::new();
            for c in week {
                if c.in_month {
                    days.push_str(&format!("{:>width$}", c.date.day()));
                    let p = c.pnl.map(|v| v.format_decimals(decimals)).unwrap_or_default();
                    pnls.push_str(&format!("{p:>width$}"));
                } else {
                    days.push_str(&" ".repeat(width));
                    pnls.push_str(&" ".repeat(width));
                }
            }
            out.push_str(days.trim_end());
            out.push('\n');
            let pnls = pnls.trim_end();
            if !pnls.is_empty() {
                out.push_str(pnls);
                out.push('\n');
            }
        }

        out.push_str(&format!(
            "month total: {} ({} active day(s))\n",
            self.total.format_decimals(decimals),
            self.active_days
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnlcal_portfolio::{aggregate, JournalEntry, RealizedEvent, Qty};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event(date: NaiveDate, gain: i64) -> RealizedEvent {
        RealizedEvent::new(
            date,
            "AAPL",
            date,
            Qty::from_units(1),
            Micros::ZERO,
            Micros::from_units(gain),
        )
    }

    #[test]
    fn parse_year_month_variants() {
        assert_eq!(parse_year_month("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_year_month(" 1999-12 ").unwrap(), (1999, 12));
        for bad in ["2024-13", "2024-3", "24-03", "2024/03", "2024-00", "march"] {
            assert!(parse_year_month(bad).is_err(), "'{bad}'");
        }
    }

    #[test]
    fn week_count_depends_on_month_shape() {
        let empty = DailyPnl::default();
        // Feb 2015 starts on Sunday and has 28 days: exactly 4 weeks.
        assert_eq!(month_grid(&empty, 2015, 2, WeekStart::Sunday).unwrap().weeks.len(), 4);
        // Same month, Monday start: Sunday the 1st sits in the last column.
        assert_eq!(month_grid(&empty, 2015, 2, WeekStart::Monday).unwrap().weeks.len(), 5);
        // Mar 2024 starts on Friday and has 31 days: 6 weeks with Sunday start.
        assert_eq!(month_grid(&empty, 2024, 3, WeekStart::Sunday).unwrap().weeks.len(), 6);
    }

    #[test]
    fn first_column_matches_week_start() {
        let empty = DailyPnl::default();
        let sun = month_grid(&empty, 2024, 5, WeekStart::Sunday).unwrap();
        // 2024-05-01 is a Wednesday
        assert_eq!(sun.weeks[0][0].date, d(2024, 4, 28));
        assert_eq!(sun.weeks[0][3].date, d(2024, 5, 1));
        assert!(!sun.weeks[0][0].in_month);

        let mon = month_grid(&empty, 2024, 5, WeekStart::Monday).unwrap();
        assert_eq!(mon.weeks[0][0].date, d(2024, 4, 29));
        assert_eq!(mon.weeks[0][2].date, d(2024, 5, 1));

        for week in sun.weeks.iter().chain(mon.weeks.iter()) {
            assert_eq!(week.len(), 7);
        }
    }

    #[test]
    fn pnl_only_on_in_month_cells() {
        let events = vec![
            event(d(2024, 4, 30), 50),
            event(d(2024, 5, 2), 10),
            event(d(2024, 5, 2), -4),
            event(d(2024, 5, 31), 7),
        ];
        let daily = aggregate(&events);
        let grid = month_grid(&daily, 2024, 5, WeekStart::Sunday).unwrap();

        assert_eq!(grid.cell(d(2024, 4, 30)).unwrap().pnl, None);
        let c = grid.cell(d(2024, 5, 2)).unwrap();
        assert_eq!(c.pnl, Some(Micros::from_units(6)));
        assert_eq!(c.events, 2);
        assert_eq!(grid.cell(d(2024, 5, 3)).unwrap().pnl, None);
        assert_eq!(grid.total, Micros::from_units(13));
        assert_eq!(grid.active_days, 2);
    }

    #[test]
    fn journal_only_day_is_active() {
        let mut daily = aggregate(&[event(d(2024, 5, 2), 10)]);
        daily.add_journal(&[JournalEntry::new(
            1,
            d(2024, 5, 9),
            Micros::from_units(100),
            Micros::from_units(125),
        )]);
        let grid = month_grid(&daily, 2024, 5, WeekStart::Sunday).unwrap();

        let c = grid.cell(d(2024, 5, 9)).unwrap();
        assert_eq!(c.pnl, Some(Micros::from_units(25)));
        assert_eq!(c.events, 0);
        assert_eq!(c.journal_entries, 1);
        assert_eq!(grid.active_days, 2);
        assert_eq!(grid.total, Micros::from_units(35));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let grid = month_grid(&DailyPnl::default(), 2024, 12, WeekStart::Sunday).unwrap();
        let last_week = grid.weeks.last().unwrap();
        assert_eq!(last_week[6].date, d(2025, 1, 4));
        assert!(grid.cell(d(2024, 12, 31)).unwrap().in_month);
    }

    #[test]
    fn invalid_month_rejected() {
        assert!(matches!(
            month_grid(&DailyPnl::default(), 2024, 13, WeekStart::Sunday),
            Err(ReportError::InvalidMonth(_))
        ));
    }

    #[test]
    fn render_text_shows_days_and_total() {
        let daily = aggregate(&[event(d(2024, 5, 2), 10)]);
        let text = month_grid(&daily, 2024, 5, WeekStart::Monday)
            .unwrap()
            .render_text(2);
        assert!(text.starts_with("2024-05\n"));
        assert!(text.contains("Mon"));
        assert!(text.contains("10.00"));
        assert!(text.contains("month total: 10.00 (1 active day(s))"));
    }
}

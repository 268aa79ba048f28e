//! Daily P&L export as CSV (`date,gain,events`).

use std::io;

use chrono::NaiveDate;
use pnlcal_portfolio::DailyPnl;
use serde::Serialize;

#[derive(Serialize)]
struct DailyRow {
    date: NaiveDate,
    gain: String,
    events: usize,
}

/// Write one row per day in the map (lot matches or journal entries),
/// oldest first. `decimals` controls how
/// `gain` is rounded for display.
pub fn write_daily_csv<W: io::Write>(
    daily: &DailyPnl,
    decimals: u8,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if daily.is_empty() {
        wtr.write_record(["date", "gain", "events"])?;
    }
    for (date, day) in daily.iter() {
        wtr.serialize(DailyRow {
            date: *date,
            gain: day.gain.format_decimals(decimals),
            events: day.events,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

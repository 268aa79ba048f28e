//! Scenario: journal entries merged beside FIFO results.
//!
//! # Invariants under test
//!
//! 1. Journal profit (sell - buy) lands on its day and in the total.
//! 2. Journal entries are counted apart from lot matches and never touch
//!    the lot queues.
//! 3. Bad journal rows are rejected with the transaction reasons and
//!    reported beside the transaction rejections; good rows still count.
//! 4. The date range applies to journal entries; a symbol filter drops them.

use chrono::NaiveDate;
use pnlcal_calendar::{
    journal_from_csv_str, month_grid, report_from_csv_str, ReportError, ReportFilter, WeekStart,
};
use pnlcal_config::AppConfig;
use pnlcal_ingest::{CsvIngestError, RejectReason};
use pnlcal_portfolio::{Micros, Qty};

const TRADES: &str = "\
date,symbol,side,quantity,price
2024-05-01,AAPL,BUY,10,100
2024-05-02,AAPL,SELL,4,110
";

const JOURNAL: &str = "\
date,buy,sell
2024-05-02,1000,1200
2024-05-03,\"2,000\",1500
2024-05-03,abc,10
2024-13-01,1,2
2024-06-10,100,175
";

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn report(filter: &ReportFilter) -> pnlcal_calendar::CalendarReport {
    let cfg = AppConfig::default();
    let mut report = report_from_csv_str(TRADES, &cfg, filter).unwrap();
    let journal = journal_from_csv_str(JOURNAL, &cfg).unwrap();
    report.merge_journal(journal, filter);
    report
}

#[test]
fn scenario_journal_adds_to_daily_map() {
    let report = report(&ReportFilter::default());

    // 05-02: lot match 40 plus journal 200
    let day2 = report.daily.get(d(5, 2)).unwrap();
    assert_eq!(day2.gain, Micros::from_units(240));
    assert_eq!(day2.events, 1);
    assert_eq!(day2.journal_entries, 1);
    assert_eq!(day2.realized_gain(), Micros::from_units(40));

    // 05-03: journal only, a loss
    let day3 = report.daily.get(d(5, 3)).unwrap();
    assert_eq!(day3.gain, Micros::from_units(-500));
    assert_eq!(day3.events, 0);

    assert_eq!(report.total, Micros::from_units(40 + 200 - 500 + 75));
    assert_eq!(report.journal.len(), 3);

    // lot queues only see transactions
    assert_eq!(report.realized.len(), 1);
    assert_eq!(report.open_lot_rows()[0].remaining, Qty::from_units(6));

    let may = month_grid(&report.daily, 2024, 5, WeekStart::Sunday).unwrap();
    assert_eq!(may.total, Micros::from_units(-260));
    assert_eq!(may.active_days, 2);
}

#[test]
fn scenario_journal_rejections_are_reported() {
    let report = report(&ReportFilter::default());

    let got: Vec<_> = report
        .journal_rejections
        .iter()
        .map(|r| (r.row, r.reason, r.value.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (3, RejectReason::InvalidNumber, "abc"),
            (4, RejectReason::InvalidDate, "2024-13-01"),
        ]
    );
    assert!(report.rejections.is_empty());
    assert!(report.has_diagnostics());

    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["journal_rejections"][0]["reason"], "invalid_number");
    assert_eq!(v["daily"]["2024-05-02"]["journal_entries"], 1);
}

#[test]
fn scenario_filters_apply_to_journal() {
    let ranged = report(&ReportFilter {
        from: Some(d(6, 1)),
        ..Default::default()
    });
    assert_eq!(ranged.journal.len(), 1);
    assert_eq!(ranged.total, Micros::from_units(75));

    let scoped = report(&ReportFilter {
        symbol: Some("AAPL".to_string()),
        ..Default::default()
    });
    assert!(scoped.journal.is_empty());
    assert_eq!(scoped.total, Micros::from_units(40));
    // rejections still surface
    assert_eq!(scoped.journal_rejections.len(), 2);
}

#[test]
fn scenario_journal_without_sell_column_fails() {
    let err = journal_from_csv_str("date,buy\n2024-05-01,1\n", &AppConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Ingest(CsvIngestError::MissingHeader(ref c)) if c == "sell"
    ));
}

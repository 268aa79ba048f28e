//! Scenario: CSV text all the way to a month grid.
//!
//! # Invariants under test
//!
//! 1. A SELL spanning two lots shows up as one calendar day, summed.
//! 2. Over-sell is a warning next to the numbers; it never fails the run.
//! 3. Rejected rows are surfaced, and the remaining rows still drive P&L.
//! 4. The symbol filter runs before matching; the date filter only trims
//!    realized events and warnings.
//! 5. Open lots survive the date filter untouched.

use chrono::NaiveDate;
use pnlcal_calendar::{
    month_grid, report_from_csv_str, write_daily_csv, ReportError, ReportFilter, WeekStart,
};
use pnlcal_config::AppConfig;
use pnlcal_ingest::RejectReason;
use pnlcal_portfolio::{Micros, Qty};

const TRADES: &str = "\
date,symbol,side,quantity,price
2024-04-01,7203,BUY,10,100
2024-04-02,7203,BUY,10,200
2024-04-10,7203,SELL,15,300
2024-04-03,AAPL,BUY,5,100
2024-04-10,AAPL,hold,1,1
2024-04-22,AAPL,SELL,8,300
2024-05-06,7203,SELL,\"2\",\"1,000\"
";

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

#[test]
fn scenario_full_run_with_diagnostics() {
    let report = report_from_csv_str(TRADES, &AppConfig::default(), &ReportFilter::default())
        .unwrap();

    // 7203: 2000 + 500 on 04-10; AAPL: 1000 on 04-22 with 3 unmatched
    assert_eq!(report.daily.gain_on(d(4, 10)), Some(Micros::from_units(2_500)));
    assert_eq!(report.daily.get(d(4, 10)).unwrap().events, 2);
    assert_eq!(report.daily.gain_on(d(4, 22)), Some(Micros::from_units(1_000)));
    // 2 × (1000 − 200)
    assert_eq!(report.daily.gain_on(d(5, 6)), Some(Micros::from_units(1_600)));
    assert_eq!(report.total, Micros::from_units(5_100));

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].symbol, "AAPL");
    assert_eq!(report.warnings[0].qty_unmatched, Qty::from_units(3));

    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].row, 5);
    assert_eq!(report.rejections[0].reason, RejectReason::InvalidSide);
    assert!(report.has_diagnostics());

    let lots = report.open_lot_rows();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].symbol, "7203");
    assert_eq!(lots[0].remaining, Qty::from_units(3));
    assert_eq!(lots[0].cost, Micros::from_units(600));

    let april = month_grid(&report.daily, 2024, 4, WeekStart::Sunday).unwrap();
    assert_eq!(april.total, Micros::from_units(3_500));
    assert_eq!(april.active_days, 2);
    let may = month_grid(&report.daily, 2024, 5, WeekStart::Sunday).unwrap();
    assert_eq!(may.total, Micros::from_units(1_600));
}

#[test]
fn scenario_symbol_filter_applies_before_matching() {
    let filter = ReportFilter {
        symbol: Some("aapl".to_string()),
        ..Default::default()
    };
    let report = report_from_csv_str(TRADES, &AppConfig::default(), &filter).unwrap();

    assert_eq!(report.total, Micros::from_units(1_000));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.open_lots.is_empty());
    assert!(report.realized.iter().all(|e| e.symbol == "AAPL"));
    // row-level diagnostics are not filtered
    assert_eq!(report.rejections.len(), 1);
}

#[test]
fn scenario_date_filter_trims_events_not_history() {
    let filter = ReportFilter {
        from: Some(d(5, 1)),
        to: Some(d(5, 31)),
        ..Default::default()
    };
    let report = report_from_csv_str(TRADES, &AppConfig::default(), &filter).unwrap();

    // May's SELL still consumes the April lot at 200.
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.total, Micros::from_units(1_600));
    assert!(report.warnings.is_empty());
    assert_eq!(report.open_lot_rows()[0].remaining, Qty::from_units(3));
}

#[test]
fn scenario_config_drives_parsing() {
    let csv = "date,symbol,side,quantity,price\n\
               01.03.2024,X,BUY,1 000,10\n\
               02.03.2024,X,SELL,1 000,12.5\n";
    let mut cfg = AppConfig::default();
    cfg.parser.date_formats = vec!["%d.%m.%Y".to_string()];
    cfg.parser.grouping_separator = " ".to_string();

    let report = report_from_csv_str(csv, &cfg, &ReportFilter::default()).unwrap();
    assert!(report.rejections.is_empty());
    assert_eq!(
        report.daily.gain_on(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
        Some(Micros::from_units(2_500))
    );
}

#[test]
fn scenario_export_matches_daily_map() {
    let report = report_from_csv_str(TRADES, &AppConfig::default(), &ReportFilter::default())
        .unwrap();
    let mut buf = Vec::new();
    write_daily_csv(&report.daily, 2, &mut buf).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "date,gain,events\n\
         2024-04-10,2500.00,2\n\
         2024-04-22,1000.00,1\n\
         2024-05-06,1600.00,1\n"
    );
}

#[test]
fn scenario_structural_errors_are_err() {
    let err = report_from_csv_str(
        "when,symbol,side,quantity,price\n",
        &AppConfig::default(),
        &ReportFilter::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::Ingest(_)));
}

#[test]
fn scenario_report_serializes_to_json() {
    let report = report_from_csv_str(TRADES, &AppConfig::default(), &ReportFilter::default())
        .unwrap();
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["total"], "5100.000000");
    assert_eq!(v["daily"]["2024-04-10"]["gain"], "2500.000000");
    assert_eq!(v["rejections"][0]["reason"], "invalid_side");
    assert_eq!(v["warnings"][0]["qty_unmatched"], "3");
    assert_eq!(v["summary"]["rows_rejected"], 1);
}

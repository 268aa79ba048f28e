//! `pnlcal report`, `pnlcal lots` and `pnlcal export`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pnlcal_calendar::{write_daily_csv, Diagnostics, OpenLotRow};
use pnlcal_portfolio::Micros;
use serde::Serialize;

use super::{load_report, print_diagnostics};
use crate::{DailyArgs, InputArgs, OutputFormat};

/// Execute `pnlcal report`.
pub fn run_report(input: &InputArgs, daily: &DailyArgs, format: OutputFormat) -> Result<()> {
    let (report, cfg, config_hash) = load_report(input, daily)?;

    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&report).context("serialize report json failed")?;
        println!("{json}");
        return Ok(());
    }

    let dp = cfg.report.decimals;
    if let Some(h) = config_hash {
        println!("config_hash={h}");
    }
    let s = &report.summary;
    println!(
        "rows_read={} rows_ok={} rows_rejected={}",
        s.rows_read, s.rows_ok, s.rows_rejected
    );
    for (date, day) in report.daily.iter() {
        if day.journal_entries == 0 {
            println!(
                "day={} gain={} events={}",
                date,
                day.gain.format_decimals(dp),
                day.events
            );
        } else {
            println!(
                "day={} gain={} events={} journal_entries={} journal_gain={}",
                date,
                day.gain.format_decimals(dp),
                day.events,
                day.journal_entries,
                day.journal_gain.format_decimals(dp)
            );
        }
    }
    println!(
        "total={} days={} events={}",
        report.total.format_decimals(dp),
        report.daily.len(),
        report.realized.len()
    );
    print_diagnostics(report.diagnostics());
    Ok(())
}

#[derive(Serialize)]
struct LotsOutput<'a> {
    lots: Vec<OpenLotRow>,
    open_cost_by_symbol: BTreeMap<String, Micros>,
    #[serde(flatten)]
    diagnostics: Diagnostics<'a>,
}

/// Execute `pnlcal lots`. Open lots are never date-filtered, so this command
/// takes no range or journal.
pub fn run_lots(input: &InputArgs, format: OutputFormat) -> Result<()> {
    let (report, cfg, _) = load_report(input, &DailyArgs::default())?;
    let out = LotsOutput {
        lots: report.open_lot_rows(),
        open_cost_by_symbol: report.open_cost_by_symbol(),
        diagnostics: report.diagnostics(),
    };

    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&out).context("serialize lots json failed")?;
        println!("{json}");
        return Ok(());
    }

    let dp = cfg.report.decimals;
    for lot in &out.lots {
        println!(
            "lot symbol={} open_date={} remaining={} unit_cost={} cost={}",
            lot.symbol,
            lot.open_date,
            lot.remaining,
            lot.unit_cost.format_decimals(dp),
            lot.cost.format_decimals(dp)
        );
    }
    for (symbol, cost) in &out.open_cost_by_symbol {
        println!("open_cost symbol={} cost={}", symbol, cost.format_decimals(dp));
    }
    if out.lots.is_empty() {
        println!("open_lots=0");
    }
    print_diagnostics(out.diagnostics);
    Ok(())
}

/// Execute `pnlcal export`.
pub fn run_export(input: &InputArgs, daily: &DailyArgs, output: &Path) -> Result<()> {
    let (report, cfg, _) = load_report(input, daily)?;

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("create export dir failed: {}", dir.display()))?;
    }
    let file = fs::File::create(output)
        .with_context(|| format!("create export file failed: {}", output.display()))?;
    write_daily_csv(&report.daily, cfg.report.decimals, file)
        .with_context(|| format!("write export failed: {}", output.display()))?;

    println!(
        "export_ok=true path={} days={}",
        output.display(),
        report.daily.len()
    );
    print_diagnostics(report.diagnostics());
    Ok(())
}

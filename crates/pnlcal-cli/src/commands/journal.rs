//! `pnlcal journal`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pnlcal_calendar::{journal_from_csv_file, Rejection};
use pnlcal_portfolio::{JournalEntry, Micros};
use serde::Serialize;

use super::load_settings;
use crate::OutputFormat;

#[derive(Serialize, Default)]
struct JournalDay<'a> {
    profit: Micros,
    entries: Vec<&'a JournalEntry>,
}

#[derive(Serialize)]
struct JournalOutput<'a> {
    days: BTreeMap<NaiveDate, JournalDay<'a>>,
    total: Micros,
    rejections: &'a [Rejection],
}

/// Execute `pnlcal journal`: entries grouped per day, oldest day first.
pub fn run_journal(
    path: &Path,
    config_paths: &[PathBuf],
    date: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    let (cfg, _) = load_settings(config_paths)?;
    let journal = journal_from_csv_file(path, &cfg)
        .with_context(|| format!("journal failed for {}", path.display()))?;

    let mut days: BTreeMap<NaiveDate, JournalDay<'_>> = BTreeMap::new();
    for e in journal
        .entries
        .iter()
        .filter(|e| date.map_or(true, |d| e.date == d))
    {
        let day = days.entry(e.date).or_default();
        day.profit = day.profit.saturating_add(e.profit);
        day.entries.push(e);
    }
    let total: Micros = days.values().map(|d| d.profit).sum();

    if format == OutputFormat::Json {
        let out = JournalOutput {
            days,
            total,
            rejections: &journal.rejections,
        };
        let json = serde_json::to_string_pretty(&out).context("serialize journal json failed")?;
        println!("{json}");
        return Ok(());
    }

    let dp = cfg.report.decimals;
    for (d, day) in &days {
        println!(
            "day={} profit={} entries={}",
            d,
            day.profit.format_decimals(dp),
            day.entries.len()
        );
        for e in &day.entries {
            println!(
                "entry row={} buy={} sell={} profit={}",
                e.row,
                e.buy.format_decimals(dp),
                e.sell.format_decimals(dp),
                e.profit.format_decimals(dp)
            );
        }
    }
    println!("total={} days={}", total.format_decimals(dp), days.len());
    for r in &journal.rejections {
        println!(
            "rejected source=journal row={} reason={} value={:?}",
            r.row, r.reason, r.value
        );
    }
    Ok(())
}

//! Command handler modules for the `pnlcal` binary.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod calendar;
pub mod journal;
pub mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use pnlcal_calendar::{
    journal_from_csv_file, report_from_csv_file, CalendarReport, Diagnostics, ReportFilter,
};
use pnlcal_config::{
    load_layered_yaml, report_unused_keys, AppConfig, LoadedConfig, UnusedKeyPolicy,
};

use crate::{DailyArgs, InputArgs};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Typed config from `--config` layers; defaults when none are given.
/// Unused keys are logged, never fatal here.
pub fn load_settings(paths: &[PathBuf]) -> Result<(AppConfig, Option<LoadedConfig>)> {
    if paths.is_empty() {
        return Ok((AppConfig::default(), None));
    }
    let loaded = load_layered_yaml(paths).context("config load failed")?;
    report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    let cfg = loaded.settings().context("config invalid")?;
    Ok((cfg, Some(loaded)))
}

/// Read, parse, match and aggregate the `--input` file, then merge the
/// `--journal` file when one is given.
pub fn load_report(
    input: &InputArgs,
    daily: &DailyArgs,
) -> Result<(CalendarReport, AppConfig, Option<String>)> {
    let (cfg, loaded) = load_settings(&input.config_paths)?;
    let filter = ReportFilter {
        symbol: input.symbol.clone(),
        from: daily.from,
        to: daily.to,
    };
    let mut report = report_from_csv_file(&input.input, &cfg, &filter)
        .with_context(|| format!("report failed for {}", input.input.display()))?;
    if let Some(path) = &daily.journal {
        let journal = journal_from_csv_file(path, &cfg)
            .with_context(|| format!("journal failed for {}", path.display()))?;
        report.merge_journal(journal, &filter);
    }
    Ok((report, cfg, loaded.map(|l| l.config_hash)))
}

/// Rejections and over-sell warnings, one line each.
pub fn print_diagnostics(diag: Diagnostics<'_>) {
    for w in diag.warnings {
        println!(
            "warning=unmatched_sell date={} symbol={} qty_unmatched={}",
            w.date, w.symbol, w.qty_unmatched
        );
    }
    for r in diag.rejections {
        println!(
            "rejected row={} reason={} value={:?}",
            r.row, r.reason, r.value
        );
    }
    for r in diag.journal_rejections {
        println!(
            "rejected source=journal row={} reason={} value={:?}",
            r.row, r.reason, r.value
        );
    }
}

/// Execute `pnlcal config-hash`.
pub fn config_hash(paths: &[PathBuf], strict: bool) -> Result<()> {
    let loaded = load_layered_yaml(paths).context("config load failed")?;
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = report_unused_keys(&loaded.config_json, policy)?;
    loaded.settings().context("config invalid")?;

    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    for p in &unused.unused_leaf_pointers {
        println!("unused_key={p}");
    }
    Ok(())
}

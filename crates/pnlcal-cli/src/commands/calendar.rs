//! `pnlcal calendar`.

use anyhow::{Context, Result};
use pnlcal_calendar::{month_grid, parse_year_month, Diagnostics, MonthGrid};
use serde::Serialize;

use super::{load_report, print_diagnostics};
use crate::{DailyArgs, InputArgs, OutputFormat};

#[derive(Serialize)]
struct CalendarOutput<'a> {
    grid: MonthGrid,
    #[serde(flatten)]
    diagnostics: Diagnostics<'a>,
}

/// Execute `pnlcal calendar`: month grid from the daily map.
pub fn run_calendar(
    input: &InputArgs,
    daily: &DailyArgs,
    month: &str,
    format: OutputFormat,
) -> Result<()> {
    let (year, month) = parse_year_month(month)?;
    let (report, cfg, _) = load_report(input, daily)?;
    let grid = month_grid(&report.daily, year, month, cfg.calendar.week_start)?;

    if format == OutputFormat::Json {
        let out = CalendarOutput {
            grid,
            diagnostics: report.diagnostics(),
        };
        let json = serde_json::to_string_pretty(&out).context("serialize calendar json failed")?;
        println!("{json}");
        return Ok(());
    }

    print!("{}", grid.render_text(cfg.report.decimals));
    print_diagnostics(report.diagnostics());
    Ok(())
}

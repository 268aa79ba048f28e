use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "pnlcal")]
#[command(about = "FIFO realized P&L per day, calendar style", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily realized P&L with totals, warnings and rejected rows
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        daily: DailyArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Month grid with per-day P&L and the month total
    Calendar {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        daily: DailyArgs,

        /// Month to show (YYYY-MM)
        #[arg(long)]
        month: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Remaining open lots per symbol
    Lots {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write daily P&L as CSV (date,gain,events)
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        daily: DailyArgs,

        /// Destination CSV path
        #[arg(long)]
        output: PathBuf,
    },

    /// List journal entries per day with their profit
    Journal {
        /// Journal CSV (date,buy,sell)
        #[arg(long)]
        journal: PathBuf,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,

        /// Only this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides...)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Fail when the config has keys nothing reads
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

/// Arguments shared by every command that reads a transactions file.
#[derive(Args, Clone)]
pub struct InputArgs {
    /// Transactions CSV (date,symbol,side,quantity,price)
    #[arg(long)]
    pub input: PathBuf,

    /// Layered config paths in merge order
    #[arg(long = "config")]
    pub config_paths: Vec<PathBuf>,

    /// Only this symbol (applied before matching)
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Options that shape the daily map; open lots ignore them.
#[derive(Args, Clone, Default)]
pub struct DailyArgs {
    /// Journal CSV (date,buy,sell) merged into the daily P&L
    #[arg(long)]
    pub journal: Option<PathBuf>,

    /// First sell or journal date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last sell or journal date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if missing.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report {
            input,
            daily,
            format,
        } => commands::report::run_report(&input, &daily, format),
        Commands::Calendar {
            input,
            daily,
            month,
            format,
        } => commands::calendar::run_calendar(&input, &daily, &month, format),
        Commands::Lots { input, format } => commands::report::run_lots(&input, format),
        Commands::Export {
            input,
            daily,
            output,
        } => commands::report::run_export(&input, &daily, &output),
        Commands::Journal {
            journal,
            config_paths,
            date,
            format,
        } => commands::journal::run_journal(&journal, &config_paths, date, format),
        Commands::ConfigHash { paths, strict } => commands::config_hash(&paths, strict),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

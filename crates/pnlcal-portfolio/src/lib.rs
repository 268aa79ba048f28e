//! pnlcal-portfolio
//!
//! FIFO lot matching and daily realized P&L.
//! - Per-symbol open-lot queues (arena + cursor)
//! - SELLs consume the oldest lots first; over-sells are reported, never shorted
//! - Realized events keyed by sell date, folded into a daily map
//! - Journal entries (manual buy/sell per day) folded in beside them
//! - Pure deterministic logic (no IO, no time, no shared state)

mod accounting;
mod aggregate;
mod fixedpoint;
mod ordering;
mod queue;
mod types;

pub mod book;

pub use accounting::{apply_transaction, match_fifo, MatchOutcome};
pub use aggregate::{aggregate, DailyPnl, DayPnl};
pub use book::{BookError, FifoBook};
pub use fixedpoint::{Micros, Qty, SCALE, SCALE_DIGITS};
pub use ordering::{group_for_matching, sort_canonical, BySymbol};
pub use queue::OpenLotQueue;
pub use types::{JournalEntry, Lot, RealizedEvent, Side, Transaction, UnmatchedWarning};

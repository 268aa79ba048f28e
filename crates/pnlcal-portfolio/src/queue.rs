//! Per-symbol open-lot queue.
//!
//! Lots live in an append-only arena (`Vec<Lot>`) and a `head` cursor marks
//! the oldest lot that still has quantity. Consuming the front lot advances
//! the cursor instead of shifting the vector, so a long run of SELLs costs
//! O(1) per closed lot. Closed lots behind the cursor are reclaimed in bulk
//! once they make up at least half of the arena.
//!
//! Invariant: every lot at or after `head` has `remaining > 0`, and they are
//! in BUY order. Only the front lot is ever reduced.

use serde::{Serialize, Serializer};

use crate::fixedpoint::{Micros, Qty};
use crate::types::Lot;

/// Below this many closed lots the arena is never compacted.
const COMPACT_MIN_CLOSED: usize = 64;

#[derive(Clone, Debug, Default)]
pub struct OpenLotQueue {
    lots: Vec<Lot>,
    head: usize,
}

impl OpenLotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly opened lot at the back.
    pub fn push(&mut self, lot: Lot) {
        debug_assert!(lot.remaining.is_positive(), "pushed lot must be open");
        self.lots.push(lot);
    }

    /// Oldest open lot, if any.
    pub fn front(&self) -> Option<&Lot> {
        self.lots.get(self.head)
    }

    pub(crate) fn front_mut(&mut self) -> Option<&mut Lot> {
        self.lots.get_mut(self.head)
    }

    /// Drop the front lot. The caller must have reduced it to zero.
    pub(crate) fn pop_closed_front(&mut self) {
        debug_assert!(
            self.front().map(Lot::is_closed).unwrap_or(false),
            "only a fully consumed front lot may be popped"
        );
        self.head += 1;
        self.maybe_compact();
    }

    fn maybe_compact(&mut self) {
        if self.head == self.lots.len() {
            self.lots.clear();
            self.head = 0;
        } else if self.head >= COMPACT_MIN_CLOSED && self.head * 2 >= self.lots.len() {
            self.lots.drain(..self.head);
            self.head = 0;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head >= self.lots.len()
    }

    /// Number of open lots.
    pub fn len(&self) -> usize {
        self.lots.len() - self.head
    }

    /// Open lots, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Lot> {
        self.lots[self.head..].iter()
    }

    /// Total open quantity across all lots.
    pub fn open_qty(&self) -> Qty {
        self.iter().map(|l| l.remaining).sum()
    }

    /// Total cost basis still carried by open lots.
    pub fn open_cost(&self) -> Micros {
        self.iter().map(Lot::open_cost).sum()
    }

    pub fn into_lots(mut self) -> Vec<Lot> {
        self.lots.drain(..self.head);
        self.lots
    }
}

impl PartialEq for OpenLotQueue {
    fn eq(&self, other: &Self) -> bool {
        self.lots[self.head..] == other.lots[other.head..]
    }
}

impl Eq for OpenLotQueue {}

impl Serialize for OpenLotQueue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lot(day: u32, qty: i64) -> Lot {
        Lot {
            symbol: "AAPL".to_string(),
            open_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            remaining: Qty::from_units(qty),
            unit_cost: Micros::from_units(100),
        }
    }

    fn close_front(q: &mut OpenLotQueue) {
        q.front_mut().unwrap().remaining = Qty::ZERO;
        q.pop_closed_front();
    }

    #[test]
    fn front_is_oldest_lot() {
        let mut q = OpenLotQueue::new();
        q.push(lot(1, 10));
        q.push(lot(2, 5));
        assert_eq!(q.front().unwrap().open_date.to_string(), "2024-01-01");
        assert_eq!(q.len(), 2);
        assert_eq!(q.open_qty(), Qty::from_units(15));
    }

    #[test]
    fn popping_advances_cursor_in_order() {
        let mut q = OpenLotQueue::new();
        q.push(lot(1, 10));
        q.push(lot(2, 5));
        close_front(&mut q);
        assert_eq!(q.len(), 1);
        assert_eq!(q.front().unwrap().open_date.to_string(), "2024-01-02");
        close_front(&mut q);
        assert!(q.is_empty());
        assert!(q.front().is_none());
    }

    #[test]
    fn compaction_preserves_open_lots() {
        let mut q = OpenLotQueue::new();
        for day in 1..=28 {
            for _ in 0..5 {
                q.push(lot(day, 1));
            }
        }
        // close 100 of 140 lots -> arena is compacted along the way
        for _ in 0..100 {
            close_front(&mut q);
        }
        assert_eq!(q.len(), 40);
        assert_eq!(q.front().unwrap().open_date.to_string(), "2024-01-21");
        let lots = q.into_lots();
        assert_eq!(lots.len(), 40);
    }

    #[test]
    fn equality_ignores_consumed_history() {
        let mut a = OpenLotQueue::new();
        a.push(lot(1, 10));
        a.push(lot(2, 5));
        close_front(&mut a);

        let mut b = OpenLotQueue::new();
        b.push(lot(2, 5));
        assert_eq!(a, b);
    }
}

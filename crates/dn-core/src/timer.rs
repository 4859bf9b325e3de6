//! `PhaseTimer` — per-category elapsed-time accumulator.
//!
//! A timer is *punched* at every lifecycle transition with the category the
//! owner is entering (or `None` when it stops being tracked).  The interval
//! since the previous punch is credited to the category that was current
//! before the punch.
//!
//! ```text
//! punch(t0, Some(A))   current = A
//! punch(t1, Some(B))   A += t1 - t0, current = B
//! punch(t2, None)      B += t2 - t1, current = none
//! ```
//!
//! While every punch except possibly the last names a category, the sum of
//! all per-category totals equals `last_punch - first_punch`.
//!
//! Bookkeeping only: nothing in the simulation reads a timer to make a
//! decision, except the single-parcel courier policy which ranks parcels by
//! their waiting time.

use std::collections::BTreeMap;

use crate::Tick;

/// Accumulates ticks spent per category `C`.
#[derive(Clone, Debug)]
pub struct PhaseTimer<C: Copy + Ord> {
    timings: BTreeMap<C, u64>,
    current: Option<C>,
    first:   Option<Tick>,
    last:    Option<Tick>,
}

impl<C: Copy + Ord> Default for PhaseTimer<C> {
    fn default() -> Self {
        Self {
            timings: BTreeMap::new(),
            current: None,
            first:   None,
            last:    None,
        }
    }
}

impl<C: Copy + Ord> PhaseTimer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the open interval (if any) and enter `category`.
    pub fn punch(&mut self, now: Tick, category: Option<C>) {
        if let (Some(current), Some(last)) = (self.current, self.last) {
            *self.timings.entry(current).or_insert(0) += now.since(last);
        }
        self.first.get_or_insert(now);
        self.last = Some(now);
        self.current = category;
    }

    /// Ticks credited to `category` by closed intervals.
    pub fn get(&self, category: C) -> u64 {
        self.timings.get(&category).copied().unwrap_or(0)
    }

    /// Sum of all closed intervals.
    pub fn total(&self) -> u64 {
        self.timings.values().sum()
    }

    /// Like [`total`](Self::total), plus the interval still open at `now`.
    pub fn total_at(&self, now: Tick) -> u64 {
        match (self.current, self.last) {
            (Some(_), Some(last)) => self.total() + now.since(last),
            _ => self.total(),
        }
    }

    /// The category currently accumulating, if any.
    pub fn current(&self) -> Option<C> {
        self.current
    }

    pub fn first_punch(&self) -> Option<Tick> {
        self.first
    }

    pub fn last_punch(&self) -> Option<Tick> {
        self.last
    }
}

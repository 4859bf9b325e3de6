//! `WakeQueue` — pending wake-ups ordered by `(tick, sequence)`.
//!
//! Every push takes the next value of a monotonically increasing sequence
//! counter.  Entries for the same tick therefore pop in push order, which is
//! what makes same-instant resumption FIFO and runs reproducible.
//!
//! `BinaryHeap` gives O(log n) push and pop; `Reverse` turns Rust's max-heap
//! into the min-heap the clock needs.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use dn_core::{EventId, ProcessId, Tick};

/// What happens when an entry comes due.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Wake {
    /// Process the event: resume its waiters, re-check its conditions.
    Fire(EventId),
    /// Resume a sleeping process.
    Resume(ProcessId),
}

#[derive(Debug)]
struct Entry {
    at:   Tick,
    seq:  u64,
    wake: Wake,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

/// A min-priority queue of `(tick, wake)` entries with FIFO tie-break.
#[derive(Default)]
pub struct WakeQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    seq:  u64,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `wake` at `at`.
    pub fn push(&mut self, at: Tick, wake: Wake) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Reverse(Entry { at, seq, wake }));
    }

    /// Tick of the earliest entry, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.heap.peek().map(|Reverse(e)| e.at)
    }

    /// Remove and return the earliest entry.
    pub fn pop(&mut self) -> Option<(Tick, Wake)> {
        self.heap.pop().map(|Reverse(e)| (e.at, e.wake))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

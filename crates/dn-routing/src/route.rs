//! `Route` — one truck's fixed circular stop sequence.
//!
//! The optimizer returns `[depot, s1, …, sk]`.  The route stores it rotated
//! one step left, `[s1, …, sk, depot]`, so that the head is always the next
//! stop to drive to and the truck (which starts at the depot) begins with
//! `s1`.  Each [`advance`](Route::advance) pops the head and pushes it to the
//! back.

use std::collections::{BTreeSet, VecDeque};

use dn_core::{MoverId, StorageId};

#[derive(Clone, Debug)]
pub struct Route {
    pub truck:  MoverId,
    pub depot:  StorageId,
    stops:      VecDeque<StorageId>,
    /// Every stop except the depot.
    peripheral: BTreeSet<StorageId>,
}

impl Route {
    /// Build from an optimizer sequence beginning at the depot.
    pub fn new(truck: MoverId, depot: StorageId, sequence: impl IntoIterator<Item = StorageId>) -> Self {
        let mut stops: VecDeque<StorageId> = sequence.into_iter().collect();
        if stops.len() > 1 {
            stops.rotate_left(1);
        }
        let peripheral = stops.iter().copied().filter(|&s| s != depot).collect();
        Self { truck, depot, stops, peripheral }
    }

    /// The next stop, rotating the route.  `None` for a degenerate
    /// single-stop route, which never moves.
    pub fn advance(&mut self) -> Option<StorageId> {
        if self.stops.len() <= 1 {
            return None;
        }
        let target = self.stops[0];
        self.stops.rotate_left(1);
        Some(target)
    }

    /// The stop the next `advance` will return.
    pub fn peek(&self) -> Option<StorageId> {
        self.stops.front().copied()
    }

    pub fn contains(&self, stop: StorageId) -> bool {
        self.stops.contains(&stop)
    }

    pub fn is_peripheral(&self, stop: StorageId) -> bool {
        self.peripheral.contains(&stop)
    }

    pub fn peripheral(&self) -> &BTreeSet<StorageId> {
        &self.peripheral
    }

    /// Stops in driving order, starting with the next one.
    pub fn stops(&self) -> impl Iterator<Item = StorageId> + '_ {
        self.stops.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// More than one stop, the depot exactly once.
    pub fn is_well_formed(&self) -> bool {
        self.stops.len() > 1 && self.stops.iter().filter(|&&s| s == self.depot).count() == 1
    }
}

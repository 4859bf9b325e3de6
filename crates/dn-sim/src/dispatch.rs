//! The request queue shared by both dispatcher kinds, and the task a
//! dispatcher hands to a mover.

use std::collections::VecDeque;

use dn_core::{EventId, MoverId, ParcelId, StorageId};
use dn_kernel::Kernel;

use crate::mover::{DispatcherRef, Mover};
use crate::Sim;

/// Drive to `target`, picking up `load` before leaving and dropping off
/// `unload` on arrival.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Task {
    pub target: StorageId,
    pub load:   Vec<ParcelId>,
    pub unload: Vec<ParcelId>,
}

impl Task {
    /// Travel only.
    pub fn go_to(target: StorageId) -> Self {
        Self { target, load: Vec::new(), unload: Vec::new() }
    }
}

/// FIFO of movers waiting for a task, with a "movers waiting" signal.
///
/// `movers_waiting` is triggered whenever the queue becomes non-empty and
/// rearmed whenever it becomes empty.
#[derive(Clone, Debug)]
pub struct DispatchQueue {
    requests:           VecDeque<MoverId>,
    pub movers_waiting: EventId,
}

impl DispatchQueue {
    pub fn new(kernel: &mut Kernel) -> Self {
        Self { requests: VecDeque::new(), movers_waiting: kernel.event() }
    }

    pub fn push(&mut self, kernel: &mut Kernel, mover: MoverId) {
        self.requests.push_back(mover);
        kernel.succeed(self.movers_waiting);
    }

    /// The first loaded mover in the queue, else the first one.
    pub fn pop(&mut self, kernel: &mut Kernel, movers: &[Mover]) -> Option<MoverId> {
        let at = self
            .requests
            .iter()
            .position(|m| movers[m.index()].is_loaded())
            .unwrap_or(0);
        let mover = self.requests.remove(at)?;
        if self.requests.is_empty() {
            self.movers_waiting = kernel.rearm(self.movers_waiting);
        }
        Some(mover)
    }

    pub fn iter(&self) -> impl Iterator<Item = MoverId> + '_ {
        self.requests.iter().copied()
    }

    pub fn contains(&self, mover: MoverId) -> bool {
        self.requests.contains(&mover)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Sim {
    /// Register `mover` as idle with its dispatcher.
    pub(crate) fn enqueue_mover(&mut self, mover: MoverId) {
        match self.movers[mover.index()].dispatcher {
            DispatcherRef::Courier(d) => self.enqueue_courier(d, mover),
            DispatcherRef::Truck => {
                self.truck_dispatcher.queue.push(&mut self.kernel, mover);
            }
        }
    }
}

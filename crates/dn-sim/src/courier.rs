//! Per-warehouse courier dispatcher.
//!
//! One dispatcher per warehouse owns that warehouse's couriers, a queue of
//! idle ones and the set of storages with outstanding pickup demand.  Its
//! process wakes once both an idle courier and demand are present, pops one
//! courier (loaded first) and asks the configured [`CourierPolicy`] for a
//! task.  No task means the courier goes back into the queue.
//!
//! # Demand signal
//!
//! `demand` is triggered by every pickup request and by every courier that
//! requests dispatch while it still has work where it stands: parcels in the
//! hold, a sender holding parcels, or its warehouse holding last-mile parcels.
//! It is rearmed only once no pickup request is left and no queued courier
//! has such work.
//!
//! [`CourierPolicy`]: crate::CourierPolicy

use std::collections::BTreeSet;

use log::debug;

use dn_core::{DispatcherId, EventId, MoverId, ProcessId, StorageId};
use dn_kernel::Kernel;

use crate::dispatch::DispatchQueue;
use crate::storage::StorageKind;
use crate::{Sim, SimResult};

#[derive(Clone, Debug)]
pub struct CourierDispatcher {
    pub id:              DispatcherId,
    pub warehouse:       StorageId,
    pub couriers:        Vec<MoverId>,
    pub queue:           DispatchQueue,
    pub demand:          EventId,
    /// Storages a courier should visit: senders, and the warehouse itself
    /// while it holds last-mile parcels.
    pub pickup_requests: BTreeSet<StorageId>,
    pub process:         ProcessId,
    /// The `movers_waiting ∧ demand` condition being waited on.
    cycle:               Option<EventId>,
}

impl CourierDispatcher {
    pub(crate) fn new(kernel: &mut Kernel, id: DispatcherId, warehouse: StorageId, process: ProcessId) -> Self {
        Self {
            id,
            warehouse,
            couriers: Vec::new(),
            queue: DispatchQueue::new(kernel),
            demand: kernel.event(),
            pickup_requests: BTreeSet::new(),
            process,
            cycle: None,
        }
    }
}

impl Sim {
    /// Record that a parcel at `holder` needs a courier from `warehouse`'s
    /// dispatcher.
    pub fn request_pickup(&mut self, warehouse: StorageId, holder: StorageId) {
        let StorageKind::Warehouse { dispatcher } = self.storages[warehouse.index()].kind else {
            return;
        };
        let d = &mut self.courier_dispatchers[dispatcher.index()];
        d.pickup_requests.insert(holder);
        self.kernel.succeed(d.demand);
        debug!("{}: {dispatcher} pickup requested at {holder}", self.kernel.now());
    }

    pub(crate) fn enqueue_courier(&mut self, dispatcher: DispatcherId, courier: MoverId) {
        let has_work = self.courier_has_work(courier);
        let d = &mut self.courier_dispatchers[dispatcher.index()];
        d.queue.push(&mut self.kernel, courier);
        if has_work {
            self.kernel.succeed(d.demand);
        }
    }

    /// Loaded, standing at a sender that still holds parcels, or standing at
    /// the warehouse while parcels there wait for a courier.
    fn courier_has_work(&self, courier: MoverId) -> bool {
        let m = &self.movers[courier.index()];
        let here = &self.storages[m.current.index()];
        m.is_loaded()
            || (here.is_sender() && !here.parcels.is_empty())
            || (here.is_warehouse() && here.parcels.iter().any(|&p| self.is_awaiting_courier(p)))
    }

    /// Couriers of `dispatcher` currently driving to `target`.
    pub fn couriers_heading_to(&self, dispatcher: DispatcherId, target: StorageId) -> usize {
        self.courier_dispatchers[dispatcher.index()]
            .couriers
            .iter()
            .filter(|c| self.movers[c.index()].target == Some(target))
            .count()
    }

    pub(crate) fn resume_courier_dispatcher(&mut self, id: DispatcherId) -> SimResult<()> {
        let i = id.index();
        if let Some(cycle) = self.courier_dispatchers[i].cycle.take() {
            self.kernel.retire(cycle);
            let d = &mut self.courier_dispatchers[i];
            if let Some(courier) = d.queue.pop(&mut self.kernel, &self.movers) {
                self.assign_courier_task(id, courier)?;
            }
        }
        let d = &mut self.courier_dispatchers[i];
        let cycle = self.kernel.all_of(&[d.queue.movers_waiting, d.demand])?;
        d.cycle = Some(cycle);
        let pid = d.process;
        if !self.kernel.wait(pid, cycle)? {
            // A condition is processed only after it fires, never on creation.
            self.kernel.sleep(pid, 0.0)?;
        }
        Ok(())
    }

    fn assign_courier_task(&mut self, id: DispatcherId, courier: MoverId) -> SimResult<()> {
        match self.courier_policy.courier_task(self, id, courier) {
            Some(task) => {
                let target = task.target;
                self.accept_task(courier, task)?;
                let d = &mut self.courier_dispatchers[id.index()];
                if target != d.warehouse {
                    d.pickup_requests.remove(&target);
                }
            }
            None => {
                debug!("{}: {id} has nothing for {courier}", self.kernel.now());
                let d = &mut self.courier_dispatchers[id.index()];
                d.queue.push(&mut self.kernel, courier);
            }
        }
        self.patch_pickup_requests(id);
        Ok(())
    }

    /// Drop the warehouse from the requests once it has nothing left or
    /// enough couriers are on their way, and rearm demand once nothing is
    /// left to do.
    fn patch_pickup_requests(&mut self, id: DispatcherId) {
        let wh = self.courier_dispatchers[id.index()].warehouse;
        if self.courier_dispatchers[id.index()].pickup_requests.contains(&wh) {
            let awaiting = self.parcels_awaiting_couriers(wh);
            let needed = self.courier_policy.couriers_needed_for_warehouse_pickup(self, id);
            if awaiting.is_empty() || needed <= self.couriers_heading_to(id, wh) {
                self.courier_dispatchers[id.index()].pickup_requests.remove(&wh);
            }
        }

        let d = &self.courier_dispatchers[id.index()];
        let idle = d.pickup_requests.is_empty() && !d.queue.iter().any(|c| self.courier_has_work(c));
        if idle && self.kernel.is_triggered(d.demand) {
            let d = &mut self.courier_dispatchers[id.index()];
            d.demand = self.kernel.rearm(d.demand);
        }
    }
}

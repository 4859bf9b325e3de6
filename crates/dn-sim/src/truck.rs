//! Fleet-wide truck dispatcher.
//!
//! Each truck is bound to one fixed cyclic [`Route`].  Whenever a truck asks
//! for a task the dispatcher advances its route by one stop and computes
//! what moves with it:
//!
//! | Leaving            | Load                                                  |
//! |--------------------|-------------------------------------------------------|
//! | the depot          | depot parcels waiting for a truck whose last-mile warehouse is on this route |
//! | a peripheral stop  | every parcel there waiting for a truck                |
//!
//! | Arriving at        | Unload                                                |
//! |--------------------|-------------------------------------------------------|
//! | the depot          | everything whose last-mile warehouse is not a peripheral stop of this route |
//! | a peripheral stop  | everything whose last-mile warehouse is that stop     |
//!
//! A route whose next stop is where the truck already stands issues an empty
//! task; a single-stop route never moves its truck.

use std::collections::BTreeSet;

use log::debug;

use dn_core::{MoverId, ParcelId, ProcessId, StorageId};
use dn_routing::Route;

use crate::dispatch::{DispatchQueue, Task};
use crate::{Sim, SimResult};

#[derive(Clone, Debug)]
pub struct TruckDispatcher {
    pub depot:   StorageId,
    pub trucks:  Vec<MoverId>,
    /// One per truck, in truck order.
    pub routes:  Vec<Route>,
    pub queue:   DispatchQueue,
    pub process: ProcessId,
}

impl TruckDispatcher {
    pub fn route_of(&self, truck: MoverId) -> Option<&Route> {
        self.routes.iter().find(|r| r.truck == truck)
    }

    pub fn route_of_mut(&mut self, truck: MoverId) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| r.truck == truck)
    }
}

impl Sim {
    pub(crate) fn resume_truck_dispatcher(&mut self) -> SimResult<()> {
        loop {
            let td = &mut self.truck_dispatcher;
            if let Some(truck) = td.queue.pop(&mut self.kernel, &self.movers) {
                self.assign_truck_task(truck)?;
                continue;
            }
            let (pid, ev) = (td.process, td.queue.movers_waiting);
            if self.kernel.wait(pid, ev)? {
                return Ok(());
            }
        }
    }

    pub(crate) fn assign_truck_task(&mut self, truck: MoverId) -> SimResult<()> {
        let now = self.kernel.now();
        let Some(route) = self.truck_dispatcher.route_of_mut(truck) else {
            debug!("{now}: {truck} has no route, parked");
            return Ok(());
        };
        let Some(target) = route.advance() else {
            debug!("{now}: {truck} on a single-stop route, parked");
            return Ok(());
        };

        let td = &self.truck_dispatcher;
        let (depot, Some(route)) = (td.depot, td.route_of(truck)) else {
            return Ok(());
        };
        let m = &self.movers[truck.index()];
        let here = m.current;
        let task = if target == here {
            debug!("{now}: {truck} told to stay at {here}");
            Task::go_to(target)
        } else {
            let last_mile = |p: &ParcelId| self.parcels[p.index()].last_mile_wh;

            let load: BTreeSet<ParcelId> = if here == depot {
                self.parcels_awaiting_trucks(here)
                    .into_iter()
                    .filter(|p| route.is_peripheral(last_mile(p)))
                    .collect()
            } else {
                self.parcels_awaiting_trucks(here)
            };
            let resulting: BTreeSet<ParcelId> = load.union(&m.hold).copied().collect();
            let unload = resulting
                .into_iter()
                .filter(|p| {
                    if target == depot {
                        !route.is_peripheral(last_mile(p))
                    } else {
                        last_mile(p) == target
                    }
                })
                .collect();
            Task { target, load: load.into_iter().collect(), unload }
        };
        self.accept_task(truck, task)
    }
}

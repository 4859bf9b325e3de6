//! Courier dispatch policies.
//!
//! A [`CourierPolicy`] is consulted by a courier dispatcher each time it pops
//! an idle courier.  It reads the simulation and returns the courier's next
//! [`Task`], or `None` to leave the courier waiting for another cycle.
//!
//! | Policy                 | Load per trip | Warehouse pickup                  |
//! |------------------------|---------------|-----------------------------------|
//! | [`SingleParcelPolicy`] | one parcel    | longest-waiting parcel; closer idle couriers veto |
//! | [`MultiParcelPolicy`]  | any number    | every parcel waiting at the warehouse |

use std::collections::BTreeSet;

use dn_core::{DispatcherId, MoverId, ParcelId, StorageId};

use crate::dispatch::Task;
use crate::storage::StorageKind;
use crate::Sim;

/// Pluggable courier dispatch strategy.
///
/// Implementations are stateless decision functions over the simulation and
/// must be `Send + Sync` so one policy object can be shared across the runs
/// of a parameter sweep.
pub trait CourierPolicy: Send + Sync {
    /// Short label for reports.
    fn name(&self) -> &'static str;

    /// The next task for `courier`, idle in `dispatcher`'s queue.
    fn courier_task(&self, sim: &Sim, dispatcher: DispatcherId, courier: MoverId) -> Option<Task>;

    /// How many couriers the dispatcher's warehouse needs for its waiting
    /// last-mile parcels.
    fn couriers_needed_for_warehouse_pickup(&self, sim: &Sim, dispatcher: DispatcherId) -> usize;
}

// ── SingleParcelPolicy ────────────────────────────────────────────────────────

/// One parcel per trip.
///
/// ```text
/// at a sender           → carry its parcel to the warehouse
///                         (straight to the addressee if it stays local)
/// at the warehouse with
///   parcels waiting      → carry the longest-waiting one to its addressee
/// otherwise              → drive empty to the closest pickup request,
///                         unless an idle courier in the queue is strictly
///                         closer to it and stands somewhere else
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct SingleParcelPolicy;

impl CourierPolicy for SingleParcelPolicy {
    fn name(&self) -> &'static str {
        "single_parcel"
    }

    fn courier_task(&self, sim: &Sim, dispatcher: DispatcherId, courier: MoverId) -> Option<Task> {
        let d = &sim.courier_dispatchers[dispatcher.index()];
        let m = &sim.movers[courier.index()];
        let here = &sim.storages[m.current.index()];

        if here.is_sender() {
            let parcels: Vec<ParcelId> = here.parcels.iter().copied().collect();
            let target = match parcels.first().map(|p| &sim.parcels[p.index()]) {
                Some(p) if p.is_same_warehouse() => p.addressee,
                _ => d.warehouse,
            };
            return Some(Task { target, load: parcels.clone(), unload: parcels });
        }

        if m.current == d.warehouse {
            let now = sim.kernel.now();
            let longest = sim
                .parcels_awaiting_couriers(d.warehouse)
                .into_iter()
                .max_by(|&a, &b| {
                    let (ta, tb) = (
                        sim.parcels[a.index()].timer.total_at(now),
                        sim.parcels[b.index()].timer.total_at(now),
                    );
                    ta.cmp(&tb).then(b.cmp(&a))
                });
            if let Some(p) = longest {
                return Some(Task {
                    target: sim.parcels[p.index()].addressee,
                    load:   vec![p],
                    unload: vec![p],
                });
            }
        }

        let target = sim.closest_storage(m.pos, d.pickup_requests.iter().copied())?;
        if !d.queue.is_empty() {
            let at = sim.storages[target.index()].pos;
            let mut closest = (courier, m.pos.distance(at));
            for c in d.queue.iter() {
                let dist = sim.movers[c.index()].pos.distance(at);
                if dist < closest.1 {
                    closest = (c, dist);
                }
            }
            let (other, _) = closest;
            if other != courier && sim.movers[other.index()].current != m.current {
                return None;
            }
        }
        Some(Task::go_to(target))
    }

    fn couriers_needed_for_warehouse_pickup(&self, sim: &Sim, dispatcher: DispatcherId) -> usize {
        let wh = sim.courier_dispatchers[dispatcher.index()].warehouse;
        sim.parcels_awaiting_couriers(wh).len()
    }
}

// ── MultiParcelPolicy ─────────────────────────────────────────────────────────

/// Any number of parcels per trip.
///
/// The courier loads whatever it can where it stands (every waiting parcel
/// at the warehouse, the sender's parcel at a sender), then drives to the
/// closest of:
///
/// - every pending pickup request,
/// - the warehouse, if it will carry first-mile parcels bound for trucks,
/// - the addressee of every local parcel it will carry.
///
/// On arrival it unloads the first-mile parcels at the warehouse, or the one
/// parcel addressed to the addressee.
#[derive(Copy, Clone, Debug, Default)]
pub struct MultiParcelPolicy;

impl MultiParcelPolicy {
    fn load(sim: &Sim, warehouse: StorageId, at: StorageId) -> BTreeSet<ParcelId> {
        let here = &sim.storages[at.index()];
        if at == warehouse {
            sim.parcels_awaiting_couriers(warehouse)
        } else if here.is_sender() {
            here.parcels.clone()
        } else {
            BTreeSet::new()
        }
    }
}

impl CourierPolicy for MultiParcelPolicy {
    fn name(&self) -> &'static str {
        "multi_parcel"
    }

    fn courier_task(&self, sim: &Sim, dispatcher: DispatcherId, courier: MoverId) -> Option<Task> {
        let d = &sim.courier_dispatchers[dispatcher.index()];
        let m = &sim.movers[courier.index()];
        let wh = d.warehouse;

        let to_load = Self::load(sim, wh, m.current);
        let planned: BTreeSet<ParcelId> = m.hold.union(&to_load).copied().collect();
        let outbound = |p: &ParcelId| {
            let p = &sim.parcels[p.index()];
            p.first_mile_wh == wh && !p.is_same_warehouse()
        };

        let mut targets = d.pickup_requests.clone();
        if planned.iter().any(outbound) {
            targets.insert(wh);
        }
        targets.extend(
            planned
                .iter()
                .map(|p| &sim.parcels[p.index()])
                .filter(|p| p.last_mile_wh == wh)
                .map(|p| p.addressee),
        );

        let target = sim.closest_storage(m.pos, targets)?;
        let unload: Vec<ParcelId> = match sim.storages[target.index()].kind {
            StorageKind::Warehouse { .. } => planned.iter().copied().filter(outbound).collect(),
            StorageKind::Addressee { parcel } if planned.contains(&parcel) => vec![parcel],
            _ => Vec::new(),
        };
        Some(Task { target, load: to_load.into_iter().collect(), unload })
    }

    fn couriers_needed_for_warehouse_pickup(&self, sim: &Sim, dispatcher: DispatcherId) -> usize {
        let wh = sim.courier_dispatchers[dispatcher.index()].warehouse;
        usize::from(!sim.parcels_awaiting_couriers(wh).is_empty())
    }
}

//! Parcels and their lifecycle automaton.
//!
//! # Lifecycle
//!
//! ```text
//! Created → AwaitFirstCourier → AwaitFirstPickup → FirstMileCarried
//!   ├─ same warehouse ─────────────────────────────────────→ DirectDelivered
//!   └─ AwaitWarehouseDropoff → AwaitTruckAssign → AwaitTruckPickup → TruckCarried
//!          ↑___________ intermediate warehouse ___________________|
//!                              last-mile warehouse → AwaitLastCourier
//!          → AwaitLastPickup → LastMileCarried → Delivered
//! ```
//!
//! The automaton runs as a kernel process ([`Sim::resume_parcel`]) that
//! suspends on one of the parcel's events at a time.  Other agents move it
//! forward only through three triggers:
//!
//! | Trigger            | Raised by                  | Event succeeded              |
//! |--------------------|----------------------------|------------------------------|
//! | `parcel_assign`    | `Sim::accept_task`         | `assignment`                 |
//! | `parcel_pickup`    | `Sim::storage_pickup`      | by holder: sender → first-mile pickup, last-mile wh → last-mile pickup, else truck pickup |
//! | `parcel_dropoff`   | `Sim::storage_dropoff`     | by holder: first-mile wh → first-mile dropoff, addressee → last-mile dropoff, else truck dropoff |
//!
//! The truck loop rearms `assignment`, `truck_pickup` and `truck_dropoff` on
//! every lap so they can be waited on again.

use std::collections::BTreeSet;

use log::debug;

use dn_core::{EventId, MoverId, ParcelId, PhaseTimer, Point, ProcessId, StorageId, Tick};

use crate::sim::Actor;
use crate::storage::{Storage, StorageKind};
use crate::{Sim, SimError, SimResult};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Who has custody of a parcel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Holder {
    Storage(StorageId),
    Mover(MoverId),
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ParcelPhase {
    Created,
    AwaitFirstCourier,
    AwaitFirstPickup,
    FirstMileCarried,
    AwaitWarehouseDropoff,
    AwaitTruckAssign,
    AwaitTruckPickup,
    TruckCarried,
    AwaitLastCourier,
    AwaitLastPickup,
    LastMileCarried,
    /// Terminal, same-warehouse parcels.
    DirectDelivered,
    /// Terminal, parcels relayed through warehouses.
    Delivered,
}

impl ParcelPhase {
    pub fn is_delivered(self) -> bool {
        matches!(self, ParcelPhase::DirectDelivered | ParcelPhase::Delivered)
    }
}

/// Where a parcel's time goes, for reporting.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ParcelTimer {
    AwaitCourier,
    AwaitTruck,
    MoveCourier,
    MoveTruck,
}

/// The events a parcel's process waits on.
#[derive(Copy, Clone, Debug)]
pub struct ParcelEvents {
    pub assignment:         EventId,
    pub first_mile_pickup:  EventId,
    pub first_mile_dropoff: EventId,
    pub truck_pickup:       EventId,
    pub truck_dropoff:      EventId,
    pub last_mile_pickup:   EventId,
    pub last_mile_dropoff:  EventId,
}

/// What the parcel process is waiting for.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ParcelStep {
    Start,
    FirstAssignment,
    FirstPickup,
    WarehouseDropoff,
    TruckLap,
    TruckAssignment,
    TruckPickup,
    TruckDropoff,
    LastAssignment,
    LastPickup,
    LastDropoff,
    Done,
}

#[derive(Clone, Debug)]
pub struct Parcel {
    pub id:            ParcelId,
    pub sender:        StorageId,
    pub addressee:     StorageId,
    pub first_mile_wh: StorageId,
    pub last_mile_wh:  StorageId,
    pub holder:        Holder,
    pub pos:           Point,
    /// Straight-line sender → addressee distance, km.
    pub direct_dist:   f64,
    pub created_at:    Tick,
    pub delivered_at:  Option<Tick>,
    pub phase:         ParcelPhase,
    pub phase_log:     Vec<(Tick, ParcelPhase)>,
    pub timer:         PhaseTimer<ParcelTimer>,
    pub events:        ParcelEvents,
    pub process:       ProcessId,
    pub(crate) step:   ParcelStep,
}

impl Parcel {
    /// First- and last-mile warehouse coincide: no truck leg.
    pub fn is_same_warehouse(&self) -> bool {
        self.first_mile_wh == self.last_mile_wh
    }

    pub fn is_delivered(&self) -> bool {
        self.phase.is_delivered()
    }

    fn enter(&mut self, now: Tick, phase: ParcelPhase) {
        self.phase = phase;
        self.phase_log.push((now, phase));
    }
}

// ── Creation ──────────────────────────────────────────────────────────────────

impl Sim {
    /// Create a parcel travelling from `sender_pos` to `addressee_pos`, with
    /// its sender and addressee, and start its lifecycle process.
    pub fn create_parcel(&mut self, sender_pos: Point, addressee_pos: Point) -> SimResult<ParcelId> {
        let first_mile_wh = self.nearest_warehouse(sender_pos)?;
        let last_mile_wh = self.nearest_warehouse(addressee_pos)?;
        if first_mile_wh == last_mile_wh && !self.config.allow_same_wh_parcels {
            return Err(SimError::SameWarehouseParcel { warehouse: first_mile_wh });
        }

        let id = ParcelId(self.parcels.len() as u32);
        let sender = StorageId(self.storages.len() as u32);
        let addressee = StorageId(sender.0 + 1);
        self.storages.push(Storage {
            id:      sender,
            kind:    StorageKind::Sender { parcel: id },
            pos:     sender_pos,
            parcels: BTreeSet::from([id]),
        });
        self.storages.push(Storage {
            id:      addressee,
            kind:    StorageKind::Addressee { parcel: id },
            pos:     addressee_pos,
            parcels: BTreeSet::new(),
        });

        let k = &mut self.kernel;
        let events = ParcelEvents {
            assignment:         k.event(),
            first_mile_pickup:  k.event(),
            first_mile_dropoff: k.event(),
            truck_pickup:       k.event(),
            truck_dropoff:      k.event(),
            last_mile_pickup:   k.event(),
            last_mile_dropoff:  k.event(),
        };
        let now = k.now();
        let process = self.spawn(Actor::Parcel(id));

        self.parcels.push(Parcel {
            id,
            sender,
            addressee,
            first_mile_wh,
            last_mile_wh,
            holder: Holder::Storage(sender),
            pos: sender_pos,
            direct_dist: sender_pos.distance(addressee_pos),
            created_at: now,
            delivered_at: None,
            phase: ParcelPhase::Created,
            phase_log: vec![(now, ParcelPhase::Created)],
            timer: PhaseTimer::new(),
            events,
            process,
            step: ParcelStep::Start,
        });
        debug!(
            "{now}: {id} created at {sender_pos}, to {addressee_pos} via {first_mile_wh} → {last_mile_wh}"
        );
        Ok(id)
    }

    fn nearest_warehouse(&self, pos: Point) -> SimResult<StorageId> {
        self.warehouse_index
            .nearest(pos)
            .map(|i| self.warehouses[i])
            .ok_or_else(|| SimError::Config("no warehouses to resolve parcels against".into()))
    }

    // ── Triggers ──────────────────────────────────────────────────────────

    /// A dispatcher granted this parcel to a mover.
    pub fn parcel_assign(&mut self, parcel: ParcelId) {
        let ev = self.parcels[parcel.index()].events.assignment;
        self.kernel.succeed(ev);
    }

    /// A mover is taking custody.  Called while `holder` is still the
    /// storage the parcel leaves.
    pub fn parcel_pickup(&mut self, parcel: ParcelId, _mover: MoverId) {
        let now = self.kernel.now();
        let p = &mut self.parcels[parcel.index()];
        let (ev, category) = match p.holder {
            Holder::Storage(s) if s == p.sender => (p.events.first_mile_pickup, ParcelTimer::MoveCourier),
            Holder::Storage(s) if s == p.last_mile_wh => (p.events.last_mile_pickup, ParcelTimer::MoveCourier),
            _ => (p.events.truck_pickup, ParcelTimer::MoveTruck),
        };
        p.timer.punch(now, Some(category));
        self.kernel.succeed(ev);
    }

    /// A storage accepted custody.  Called after `holder` was set to it.
    pub fn parcel_dropoff(&mut self, parcel: ParcelId) {
        let now = self.kernel.now();
        let p = &mut self.parcels[parcel.index()];
        let (ev, category) = match p.holder {
            Holder::Storage(s) if s == p.first_mile_wh => (p.events.first_mile_dropoff, Some(ParcelTimer::AwaitTruck)),
            Holder::Storage(s) if s == p.addressee => (p.events.last_mile_dropoff, None),
            Holder::Storage(s) if s == p.last_mile_wh => (p.events.truck_dropoff, Some(ParcelTimer::AwaitCourier)),
            _ => (p.events.truck_dropoff, Some(ParcelTimer::AwaitTruck)),
        };
        p.timer.punch(now, category);
        self.kernel.succeed(ev);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// At its sender or last-mile warehouse and not yet granted to a courier.
    pub fn is_awaiting_courier(&self, parcel: ParcelId) -> bool {
        let p = &self.parcels[parcel.index()];
        matches!(p.holder, Holder::Storage(s) if s == p.sender || s == p.last_mile_wh)
            && !self.kernel.is_triggered(p.events.assignment)
    }

    /// At a warehouse other than its last-mile one and not yet granted to a
    /// truck.
    pub fn is_awaiting_truck(&self, parcel: ParcelId) -> bool {
        let p = &self.parcels[parcel.index()];
        matches!(p.holder,
            Holder::Storage(s) if s != p.last_mile_wh && self.storages[s.index()].is_warehouse())
            && !self.kernel.is_triggered(p.events.assignment)
    }

    // ── Process ───────────────────────────────────────────────────────────

    /// Advance the parcel automaton until it suspends on its next event.
    pub(crate) fn resume_parcel(&mut self, id: ParcelId) -> SimResult<()> {
        let i = id.index();
        let pid = self.parcels[i].process;
        loop {
            let now = self.kernel.now();
            let p = &mut self.parcels[i];
            let step = p.step;
            let (next, wait_on) = match step {
                ParcelStep::Start => {
                    let (holder_wh, sender) = (p.first_mile_wh, p.sender);
                    p.timer.punch(now, Some(ParcelTimer::AwaitCourier));
                    p.enter(now, ParcelPhase::AwaitFirstCourier);
                    p.events.assignment = self.kernel.rearm(p.events.assignment);
                    let ev = p.events.assignment;
                    self.request_pickup(holder_wh, sender);
                    (ParcelStep::FirstAssignment, ev)
                }
                ParcelStep::FirstAssignment => {
                    p.enter(now, ParcelPhase::AwaitFirstPickup);
                    (ParcelStep::FirstPickup, p.events.first_mile_pickup)
                }
                ParcelStep::FirstPickup => {
                    p.enter(now, ParcelPhase::FirstMileCarried);
                    if p.is_same_warehouse() {
                        (ParcelStep::LastDropoff, p.events.last_mile_dropoff)
                    } else {
                        p.enter(now, ParcelPhase::AwaitWarehouseDropoff);
                        (ParcelStep::WarehouseDropoff, p.events.first_mile_dropoff)
                    }
                }
                ParcelStep::WarehouseDropoff | ParcelStep::TruckLap => {
                    let k = &mut self.kernel;
                    p.events.assignment = k.rearm(p.events.assignment);
                    p.events.truck_pickup = k.rearm(p.events.truck_pickup);
                    p.events.truck_dropoff = k.rearm(p.events.truck_dropoff);
                    p.enter(now, ParcelPhase::AwaitTruckAssign);
                    (ParcelStep::TruckAssignment, p.events.assignment)
                }
                ParcelStep::TruckAssignment => {
                    p.enter(now, ParcelPhase::AwaitTruckPickup);
                    (ParcelStep::TruckPickup, p.events.truck_pickup)
                }
                ParcelStep::TruckPickup => {
                    p.enter(now, ParcelPhase::TruckCarried);
                    (ParcelStep::TruckDropoff, p.events.truck_dropoff)
                }
                ParcelStep::TruckDropoff => {
                    if p.holder != Holder::Storage(p.last_mile_wh) {
                        debug!("{now}: {id} relayed at {:?}", p.holder);
                        p.step = ParcelStep::TruckLap;
                        continue;
                    }
                    let last_wh = p.last_mile_wh;
                    p.timer.punch(now, Some(ParcelTimer::AwaitCourier));
                    p.enter(now, ParcelPhase::AwaitLastCourier);
                    p.events.assignment = self.kernel.rearm(p.events.assignment);
                    let ev = p.events.assignment;
                    self.request_pickup(last_wh, last_wh);
                    (ParcelStep::LastAssignment, ev)
                }
                ParcelStep::LastAssignment => {
                    p.enter(now, ParcelPhase::AwaitLastPickup);
                    (ParcelStep::LastPickup, p.events.last_mile_pickup)
                }
                ParcelStep::LastPickup => {
                    p.enter(now, ParcelPhase::LastMileCarried);
                    (ParcelStep::LastDropoff, p.events.last_mile_dropoff)
                }
                ParcelStep::LastDropoff => {
                    let phase = if p.is_same_warehouse() {
                        ParcelPhase::DirectDelivered
                    } else {
                        ParcelPhase::Delivered
                    };
                    p.enter(now, phase);
                    p.delivered_at = Some(now);
                    p.step = ParcelStep::Done;
                    debug!("{now}: {id} delivered");
                    return Ok(());
                }
                ParcelStep::Done => return Ok(()),
            };
            self.parcels[i].step = next;
            if self.kernel.wait(pid, wait_on)? {
                return Ok(());
            }
        }
    }
}

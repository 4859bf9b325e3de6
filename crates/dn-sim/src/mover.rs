//! Movers: couriers and trucks.
//!
//! # Cycle
//!
//! ```text
//! Requesting ─► AwaitingTask ─► Loading(i) ─► Traveling ─► Unloading(i) ─┐
//!     ▲                                                                  │
//!     └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Requesting**: register with the dispatcher, suspend on `await_dispatch`.
//! - **Loading**: for each parcel of `to_load`, wait the storage's pickup
//!   time, then take custody.  Serial, so durations add up.
//! - **Traveling**: wait `distance / speed`, then move the mover and every
//!   carried parcel to the target and add the distance to the odometer.
//! - **Unloading**: for each parcel of `to_unload`, wait the storage's
//!   dropoff time, then hand it over.
//!
//! Each phase punches the mover's [`PhaseTimer`].

use std::collections::BTreeSet;

use log::debug;

use dn_core::{
    DispatcherId, EventId, MoverId, MoverKind, Operation, ParcelId, PhaseTimer, Point, ProcessId,
    StorageId,
};

use crate::dispatch::Task;
use crate::{Sim, SimError, SimResult};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Which dispatcher a mover requests tasks from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DispatcherRef {
    Courier(DispatcherId),
    Truck,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MoverTimer {
    AwaitDispatchEmpty,
    AwaitDispatchLoaded,
    Loading,
    Unloading,
    MoveLoaded,
    MoveEmpty,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) enum MoverStep {
    Requesting,
    AwaitingTask,
    /// About to pick up `to_load[i]`.
    Loading(usize),
    /// Pickup time of `to_load[i]` has elapsed.
    PickingUp(usize),
    Departing,
    Traveling { distance_km: f64 },
    /// About to drop off `to_unload[i]`.
    Unloading(usize),
    /// Dropoff time of `to_unload[i]` has elapsed.
    DroppingOff(usize),
}

#[derive(Clone, Debug)]
pub struct Mover {
    pub id:             MoverId,
    pub kind:           MoverKind,
    /// km/h.
    pub speed:          f64,
    pub pos:            Point,
    /// Last storage visited.
    pub current:        StorageId,
    /// Destination of the task in flight.
    pub target:         Option<StorageId>,
    pub hold:           BTreeSet<ParcelId>,
    pub to_load:        Vec<ParcelId>,
    pub to_unload:      Vec<ParcelId>,
    pub odometer_km:    f64,
    pub timer:          PhaseTimer<MoverTimer>,
    pub dispatcher:     DispatcherRef,
    pub await_dispatch: EventId,
    pub process:        ProcessId,
    pub(crate) step:    MoverStep,
}

impl Mover {
    pub fn is_loaded(&self) -> bool {
        !self.hold.is_empty()
    }
}

// ── Mover operations ──────────────────────────────────────────────────────────

impl Sim {
    /// Hand `task` to `mover` and wake it.
    ///
    /// Every load-set parcel is marked as assigned.  Ids that do not name a
    /// storage or parcel are a dispatch bug and fail the run.
    pub fn accept_task(&mut self, mover: MoverId, task: Task) -> SimResult<()> {
        if task.target.index() >= self.storages.len() {
            return Err(SimError::InvalidTask {
                mover,
                reason: format!("target {} is not a storage", task.target),
            });
        }
        if let Some(bad) = task
            .load
            .iter()
            .chain(&task.unload)
            .find(|p| p.index() >= self.parcels.len())
        {
            return Err(SimError::InvalidTask { mover, reason: format!("{bad} is not a parcel") });
        }

        for &p in &task.load {
            self.parcel_assign(p);
        }
        let m = &mut self.movers[mover.index()];
        debug!(
            "{}: {mover} ordered to load {:?} at {}, go to {} and unload {:?}",
            self.kernel.now(),
            task.load,
            m.current,
            task.target,
            task.unload
        );
        m.target = Some(task.target);
        m.to_load = task.load;
        m.to_unload = task.unload;
        self.kernel.succeed(m.await_dispatch);
        Ok(())
    }

    /// Advance the mover's cycle until it suspends.
    pub(crate) fn resume_mover(&mut self, id: MoverId) -> SimResult<()> {
        let i = id.index();
        let pid = self.movers[i].process;
        loop {
            let now = self.kernel.now();
            let step = self.movers[i].step;
            match step {
                MoverStep::Requesting => {
                    let m = &mut self.movers[i];
                    let category = if m.is_loaded() {
                        MoverTimer::AwaitDispatchLoaded
                    } else {
                        MoverTimer::AwaitDispatchEmpty
                    };
                    m.timer.punch(now, Some(category));
                    m.await_dispatch = self.kernel.rearm(m.await_dispatch);
                    m.step = MoverStep::AwaitingTask;
                    let ev = m.await_dispatch;
                    self.enqueue_mover(id);
                    if self.kernel.wait(pid, ev)? {
                        return Ok(());
                    }
                }
                MoverStep::AwaitingTask => {
                    let m = &mut self.movers[i];
                    m.timer.punch(now, Some(MoverTimer::Loading));
                    m.step = MoverStep::Loading(0);
                }
                MoverStep::Loading(n) => {
                    let m = &self.movers[i];
                    if n >= m.to_load.len() {
                        self.movers[i].step = MoverStep::Departing;
                        continue;
                    }
                    let hours = self.storages[m.current.index()].operation_time(
                        Operation::Pickup,
                        m.kind,
                        &self.config,
                    )?;
                    self.movers[i].step = MoverStep::PickingUp(n);
                    self.kernel.sleep(pid, hours)?;
                    return Ok(());
                }
                MoverStep::PickingUp(n) => {
                    let m = &self.movers[i];
                    let (storage, parcel) = (m.current, m.to_load[n]);
                    self.storage_pickup(storage, parcel, id)?;
                    self.movers[i].step = MoverStep::Loading(n + 1);
                }
                MoverStep::Departing => {
                    let m = &mut self.movers[i];
                    let target = m.target.ok_or_else(|| SimError::InvalidTask {
                        mover:  id,
                        reason: "no target to travel to".into(),
                    })?;
                    let distance_km = m.pos.distance(self.storages[target.index()].pos);
                    let category = if m.is_loaded() { MoverTimer::MoveLoaded } else { MoverTimer::MoveEmpty };
                    m.timer.punch(now, Some(category));
                    m.step = MoverStep::Traveling { distance_km };
                    let hours = distance_km / m.speed;
                    debug!("{now}: {id} heading to {target}, {distance_km:.1} km, {hours:.2} h");
                    self.kernel.sleep(pid, hours)?;
                    return Ok(());
                }
                MoverStep::Traveling { distance_km } => {
                    let m = &mut self.movers[i];
                    let Some(target) = m.target.take() else {
                        return Err(SimError::InvalidTask { mover: id, reason: "target vanished".into() });
                    };
                    let pos = self.storages[target.index()].pos;
                    m.pos = pos;
                    m.current = target;
                    m.odometer_km += distance_km;
                    for p in &m.hold {
                        self.parcels[p.index()].pos = pos;
                    }
                    m.timer.punch(now, Some(MoverTimer::Unloading));
                    m.step = MoverStep::Unloading(0);
                }
                MoverStep::Unloading(n) => {
                    let m = &self.movers[i];
                    if n >= m.to_unload.len() {
                        let m = &mut self.movers[i];
                        m.to_load.clear();
                        m.to_unload.clear();
                        m.step = MoverStep::Requesting;
                        continue;
                    }
                    let hours = self.storages[m.current.index()].operation_time(
                        Operation::Dropoff,
                        m.kind,
                        &self.config,
                    )?;
                    self.movers[i].step = MoverStep::DroppingOff(n);
                    self.kernel.sleep(pid, hours)?;
                    return Ok(());
                }
                MoverStep::DroppingOff(n) => {
                    let m = &self.movers[i];
                    let (storage, parcel) = (m.current, m.to_unload[n]);
                    self.storage_dropoff(storage, parcel, id)?;
                    self.movers[i].step = MoverStep::Unloading(n + 1);
                }
            }
        }
    }
}

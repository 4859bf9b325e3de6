//! The `Sim` struct and its run loop.

use log::info;

use dn_core::{DeliveryConfig, DispatcherId, MoverId, MoverKind, ParcelId, ProcessId, SimRng, StorageId, Tick};
use dn_kernel::Kernel;
use dn_routing::WarehouseIndex;

use crate::courier::CourierDispatcher;
use crate::generator::ParcelGenerator;
use crate::mover::Mover;
use crate::parcel::Parcel;
use crate::policy::CourierPolicy;
use crate::storage::Storage;
use crate::truck::TruckDispatcher;
use crate::{Metrics, SimObserver, SimResult};

/// What a kernel process drives.  Indexed by [`ProcessId`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Actor {
    Generator,
    Parcel(ParcelId),
    Mover(MoverId),
    CourierDispatcher(DispatcherId),
    TruckDispatcher,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The delivery-network simulation.
///
/// Owns every storage, mover and parcel in arenas indexed by their ids, plus
/// the kernel that orders their processes.  Agents refer to each other by id
/// only.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Immutable run parameters.
    pub config: DeliveryConfig,

    /// Clock, events and process wake-ups.
    pub kernel: Kernel,

    /// Demand generator's random stream.
    pub rng: SimRng,

    /// Warehouses first, then a sender and an addressee per parcel.
    pub storages: Vec<Storage>,

    /// Warehouse storages, in builder order.
    pub warehouses: Vec<StorageId>,

    /// Nearest-warehouse lookup; positions in `warehouses` order.
    pub warehouse_index: WarehouseIndex,

    /// The warehouse every truck route starts from.
    pub depot: StorageId,

    /// Couriers and trucks.
    pub movers: Vec<Mover>,

    pub parcels: Vec<Parcel>,

    /// One per warehouse, in `warehouses` order.
    pub courier_dispatchers: Vec<CourierDispatcher>,

    pub truck_dispatcher: TruckDispatcher,

    /// `None` when parcels are only injected with [`Sim::create_parcel`].
    pub generator: Option<ParcelGenerator>,

    pub courier_policy: Box<dyn CourierPolicy>,

    /// Label of the optimizer that built the truck routes.
    pub optimizer_name: &'static str,

    pub(crate) actors: Vec<Actor>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run to the configured horizon, reporting to `observer`, and return
    /// the end-of-run summary.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Metrics> {
        let horizon = self.config.horizon()?;
        let interval = self.config.monitoring_interval_ticks()?;
        info!(
            "running to {horizon}: {} warehouse(s), {} mover(s), policy {}",
            self.warehouses.len(),
            self.movers.len(),
            self.courier_policy.name()
        );

        loop {
            let now = self.kernel.now();
            observer.on_snapshot(now, self);
            if now >= horizon {
                break;
            }
            self.run_until(horizon.min(now + interval))?;
        }
        observer.on_sim_end(self);

        let results = self.post_results();
        info!(
            "finished at {}: {} of {} parcel(s) delivered",
            self.kernel.now(),
            self.delivered().count(),
            self.parcels.len()
        );
        Ok(results)
    }

    /// Resume every process due strictly before `deadline`; the clock is
    /// left at `deadline`.
    pub fn run_until(&mut self, deadline: Tick) -> SimResult<()> {
        while let Some(pid) = self.kernel.next_ready(deadline) {
            self.resume(pid)?;
        }
        Ok(())
    }

    /// Run for `hours` past the current instant.
    pub fn run_for(&mut self, hours: f64) -> SimResult<()> {
        let deadline = self.kernel.now() + dn_core::ticks_for_hours(hours)?;
        self.run_until(deadline)
    }

    pub fn now(&self) -> Tick {
        self.kernel.now()
    }

    pub fn couriers(&self) -> impl Iterator<Item = &Mover> + '_ {
        self.movers.iter().filter(|m| m.kind == MoverKind::Courier)
    }

    pub fn trucks(&self) -> impl Iterator<Item = &Mover> + '_ {
        self.movers.iter().filter(|m| m.kind == MoverKind::Truck)
    }

    pub fn delivered(&self) -> impl Iterator<Item = &Parcel> + '_ {
        self.parcels.iter().filter(|p| p.is_delivered())
    }

    // ── Process dispatch ──────────────────────────────────────────────────

    pub(crate) fn spawn(&mut self, actor: Actor) -> ProcessId {
        let pid = self.kernel.spawn();
        self.actors.push(actor);
        pid
    }

    fn resume(&mut self, pid: ProcessId) -> SimResult<()> {
        match self.actors[pid.index()] {
            Actor::Generator => self.resume_generator(),
            Actor::Parcel(id) => self.resume_parcel(id),
            Actor::Mover(id) => self.resume_mover(id),
            Actor::CourierDispatcher(id) => self.resume_courier_dispatcher(id),
            Actor::TruckDispatcher => self.resume_truck_dispatcher(),
        }
    }
}

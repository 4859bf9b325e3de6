//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use log::{info, warn};

use dn_core::{
    DeliveryConfig, DispatcherId, MoverId, MoverKind, PhaseTimer, Point, ProcessId, SimRng, StorageId,
};
use dn_kernel::Kernel;
use dn_routing::{Route, RouteOptimizer, RoutingProblem, SavingsOptimizer, WarehouseIndex};

use crate::courier::CourierDispatcher;
use crate::dispatch::DispatchQueue;
use crate::generator::ParcelGenerator;
use crate::mover::{DispatcherRef, Mover, MoverStep};
use crate::policy::{CourierPolicy, MultiParcelPolicy};
use crate::sim::Actor;
use crate::storage::{Storage, StorageKind};
use crate::truck::TruckDispatcher;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`DeliveryConfig`]: fleet sizes, speeds, durations, horizon, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                          |
/// |-------------------------|--------------------------------------------------|
/// | `.warehouses(v)`        | one at the centre, the rest on a ring at 0.6 R   |
/// | `.courier_policy(p)`    | [`MultiParcelPolicy`]                            |
/// | `.optimizer(o)`         | [`SavingsOptimizer`]                             |
/// | `.parcel_generator(b)`  | `true`                                           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(DeliveryConfig::default())
///     .courier_policy(Box::new(SingleParcelPolicy))
///     .build()?;
/// let results = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     DeliveryConfig,
    warehouses: Option<Vec<Point>>,
    policy:     Option<Box<dyn CourierPolicy>>,
    optimizer:  Option<Box<dyn RouteOptimizer>>,
    generator:  bool,
}

impl SimBuilder {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            config,
            warehouses: None,
            policy:     None,
            optimizer:  None,
            generator:  true,
        }
    }

    /// Explicit warehouse positions.  The one closest to the origin becomes
    /// the depot.
    pub fn warehouses(mut self, positions: Vec<Point>) -> Self {
        self.warehouses = Some(positions);
        self
    }

    pub fn courier_policy(mut self, policy: Box<dyn CourierPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn optimizer(mut self, optimizer: Box<dyn RouteOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Whether to run the random parcel generator.  With `false`, parcels
    /// enter only through [`Sim::create_parcel`].
    pub fn parcel_generator(mut self, enabled: bool) -> Self {
        self.generator = enabled;
        self
    }

    /// Validate inputs, compute truck routes, spawn every agent and return
    /// a ready-to-run [`Sim`].
    ///
    /// Routing runs before any agent exists: an infeasible fleet fails here.
    pub fn build(self) -> SimResult<Sim> {
        let config = self.config;
        config.validate()?;

        let positions = self.warehouses.unwrap_or_else(|| default_layout(&config));
        if positions.is_empty() {
            return Err(SimError::Config("at least one warehouse is required".into()));
        }
        if let Some(p) = positions.iter().find(|p| !p.within_radius(config.city_radius_km)) {
            warn!("warehouse at {p} lies outside the city radius {} km", config.city_radius_km);
        }
        let depot_index = positions
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map_or(0, |(i, _)| i);

        // ── Truck routes ──────────────────────────────────────────────────
        let optimizer = self.optimizer.unwrap_or_else(|| Box::new(SavingsOptimizer));
        let trucks = config.trucks_number;
        let sequences = if trucks > 0 {
            let problem = RoutingProblem::from_points(&positions, trucks, depot_index, config.max_route_len_km);
            let routes = optimizer.solve(&problem)?;
            if routes.len() != trucks {
                return Err(SimError::RouteCount { expected: trucks, got: routes.len() });
            }
            routes
        } else {
            if positions.len() > 1 {
                warn!("{} warehouses but no trucks: cross-warehouse parcels will never arrive", positions.len());
            }
            Vec::new()
        };

        // ── Skeleton ──────────────────────────────────────────────────────
        let mut kernel = Kernel::new();
        let truck_queue = DispatchQueue::new(&mut kernel);
        let warehouses: Vec<StorageId> = (0..positions.len()).map(|i| StorageId(i as u32)).collect();
        let depot = warehouses[depot_index];
        let storages = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| Storage {
                id: StorageId(i as u32),
                kind: StorageKind::Warehouse { dispatcher: DispatcherId(i as u32) },
                pos,
                parcels: BTreeSet::new(),
            })
            .collect();

        let mut sim = Sim {
            rng: SimRng::new(config.seed),
            warehouse_index: WarehouseIndex::new(&positions),
            config,
            kernel,
            storages,
            warehouses,
            depot,
            movers: Vec::new(),
            parcels: Vec::new(),
            courier_dispatchers: Vec::new(),
            truck_dispatcher: TruckDispatcher {
                depot,
                trucks: Vec::new(),
                routes: Vec::new(),
                queue: truck_queue,
                process: ProcessId::INVALID,
            },
            generator: None,
            courier_policy: self.policy.unwrap_or_else(|| Box::new(MultiParcelPolicy)),
            optimizer_name: optimizer.name(),
            actors: Vec::new(),
        };

        // ── Agents, in resumption order ───────────────────────────────────
        if self.generator {
            let process = sim.spawn(Actor::Generator);
            sim.generator = Some(ParcelGenerator { process });
        }

        for (i, &wh) in sim.warehouses.clone().iter().enumerate() {
            let d = DispatcherId(i as u32);
            let process = sim.spawn(Actor::CourierDispatcher(d));
            let dispatcher = CourierDispatcher::new(&mut sim.kernel, d, wh, process);
            sim.courier_dispatchers.push(dispatcher);
            for _ in 0..sim.config.couriers_per_warehouse {
                let speed = sim.config.courier_speed_kmh;
                let c = add_mover(&mut sim, MoverKind::Courier, speed, wh, DispatcherRef::Courier(d));
                sim.courier_dispatchers[i].couriers.push(c);
            }
        }

        sim.truck_dispatcher.process = sim.spawn(Actor::TruckDispatcher);
        for (k, sequence) in sequences.into_iter().enumerate() {
            let speed = sim.config.truck_speed_kmh;
            let truck = add_mover(&mut sim, MoverKind::Truck, speed, depot, DispatcherRef::Truck);
            let stops: Vec<StorageId> = sequence.into_iter().map(|n| sim.warehouses[n]).collect();
            let route = Route::new(truck, depot, stops);
            info!(
                "route {k} for {truck}: {}",
                route.stops().map(|s| s.to_string()).collect::<Vec<_>>().join(" → ")
            );
            sim.truck_dispatcher.trucks.push(truck);
            sim.truck_dispatcher.routes.push(route);
        }

        info!(
            "built {} warehouse(s), depot {depot}, {} courier(s), {} truck(s), routes by {}",
            sim.warehouses.len(),
            sim.couriers().count(),
            sim.truck_dispatcher.trucks.len(),
            sim.optimizer_name
        );
        Ok(sim)
    }
}

fn add_mover(sim: &mut Sim, kind: MoverKind, speed: f64, at: StorageId, dispatcher: DispatcherRef) -> MoverId {
    let id = MoverId(sim.movers.len() as u32);
    let await_dispatch = sim.kernel.event();
    let process = sim.spawn(Actor::Mover(id));
    sim.movers.push(Mover {
        id,
        kind,
        speed,
        pos: sim.storages[at.index()].pos,
        current: at,
        target: None,
        hold: BTreeSet::new(),
        to_load: Vec::new(),
        to_unload: Vec::new(),
        odometer_km: 0.0,
        timer: PhaseTimer::new(),
        dispatcher,
        await_dispatch,
        process,
        step: MoverStep::Requesting,
    });
    id
}

/// One warehouse at the centre and the rest evenly spaced on a ring at
/// 0.6 × the city radius.
pub fn default_layout(config: &DeliveryConfig) -> Vec<Point> {
    let n = config.warehouses_number;
    let ring = 0.6 * config.city_radius_km;
    let mut positions = Vec::with_capacity(n);
    if n > 0 {
        positions.push(Point::ORIGIN);
    }
    for k in 0..n.saturating_sub(1) {
        let angle = TAU * k as f64 / (n - 1) as f64;
        positions.push(Point::new(ring * angle.cos(), ring * angle.sin()));
    }
    positions
}

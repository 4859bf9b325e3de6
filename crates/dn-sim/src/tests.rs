//! Integration tests for dn-sim.

use dn_core::{DeliveryConfig, MoverId, ParcelId, Point, StorageId, Tick};

use crate::{CourierPolicy, Holder, MultiParcelPolicy, ParcelPhase, Sim, SimBuilder, SingleParcelPolicy};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One courier per warehouse at 10 km/h, every operation 0.1 h, no trucks,
/// no random demand.
fn test_config() -> DeliveryConfig {
    DeliveryConfig {
        simulation_time_hrs:                24.0,
        warehouses_number:                  1,
        couriers_per_warehouse:             1,
        trucks_number:                      0,
        courier_speed_kmh:                  10.0,
        truck_speed_kmh:                    40.0,
        courier_warehouse_pickup_time_hrs:  0.1,
        courier_warehouse_deposit_time_hrs: 0.1,
        courier_sender_pickup_time_hrs:     0.1,
        courier_addressee_deposit_time_hrs: 0.1,
        parcel_truck_load_unload_time_hrs:  0.005,
        ..DeliveryConfig::default()
    }
}

fn single_warehouse(policy: Box<dyn CourierPolicy>) -> Sim {
    SimBuilder::new(test_config())
        .warehouses(vec![Point::ORIGIN])
        .courier_policy(policy)
        .parcel_generator(false)
        .build()
        .unwrap()
}

/// Depot at the origin, a second warehouse 8 km east, one truck.
fn two_warehouses(policy: Box<dyn CourierPolicy>) -> Sim {
    let config = DeliveryConfig { trucks_number: 1, warehouses_number: 2, ..test_config() };
    SimBuilder::new(config)
        .warehouses(vec![Point::ORIGIN, Point::new(8.0, 0.0)])
        .courier_policy(policy)
        .parcel_generator(false)
        .build()
        .unwrap()
}

fn hours(h: f64) -> Tick {
    Tick::from_hours(h).unwrap()
}

fn entered(sim: &Sim, p: ParcelId, phase: ParcelPhase) -> bool {
    sim.parcels[p.index()].phase_log.iter().any(|&(_, ph)| ph == phase)
}

/// Every parcel is held by exactly one storage or mover, and its `holder`
/// says which.
fn assert_custody(sim: &Sim) {
    for p in &sim.parcels {
        let in_storages: Vec<StorageId> = sim
            .storages
            .iter()
            .filter(|s| s.parcels.contains(&p.id))
            .map(|s| s.id)
            .collect();
        let in_movers: Vec<MoverId> = sim
            .movers
            .iter()
            .filter(|m| m.hold.contains(&p.id))
            .map(|m| m.id)
            .collect();
        assert_eq!(in_storages.len() + in_movers.len(), 1, "{} held {in_storages:?} {in_movers:?}", p.id);
        match p.holder {
            Holder::Storage(s) => assert_eq!(in_storages, vec![s]),
            Holder::Mover(m) => assert_eq!(in_movers, vec![m]),
        }
    }
}

// ── Direct delivery ───────────────────────────────────────────────────────────

#[cfg(test)]
mod direct_delivery {
    use super::*;

    /// Sender 2 km out, addressee 3 km further: 0.2 h drive, 0.1 h pickup,
    /// 0.3 h drive, 0.1 h deposit.
    fn check_scenario(mut sim: Sim) {
        let p = sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        sim.run_until(hours(2.0)).unwrap();

        let parcel = &sim.parcels[p.index()];
        assert_eq!(parcel.phase, ParcelPhase::DirectDelivered);
        assert_eq!(parcel.delivered_at, Some(Tick(2520)));
        assert_eq!(parcel.holder, Holder::Storage(parcel.addressee));
        assert_eq!(parcel.pos, Point::new(5.0, 0.0));

        let courier = sim.couriers().next().unwrap();
        assert!((courier.odometer_km - 5.0).abs() < 1e-9);
        assert!(courier.hold.is_empty());
        assert_custody(&sim);
    }

    #[test]
    fn single_parcel_policy() {
        check_scenario(single_warehouse(Box::new(SingleParcelPolicy)));
    }

    #[test]
    fn multi_parcel_policy() {
        check_scenario(single_warehouse(Box::new(MultiParcelPolicy)));
    }

    #[test]
    fn same_warehouse_parcel_skips_trucks() {
        let mut sim = two_warehouses(Box::new(MultiParcelPolicy));
        let p = sim.create_parcel(Point::new(9.0, 1.0), Point::new(7.0, -1.0)).unwrap();
        assert!(sim.parcels[p.index()].is_same_warehouse());
        sim.run_until(hours(3.0)).unwrap();

        assert_eq!(sim.parcels[p.index()].phase, ParcelPhase::DirectDelivered);
        assert!(!entered(&sim, p, ParcelPhase::AwaitWarehouseDropoff));
        assert!(!entered(&sim, p, ParcelPhase::TruckCarried));
        assert_eq!(sim.parcels[p.index()].timer.get(crate::ParcelTimer::AwaitTruck), 0);
    }

    #[test]
    fn phase_log_is_ordered() {
        let mut sim = single_warehouse(Box::new(SingleParcelPolicy));
        let p = sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        assert!(sim.storages[sim.parcels[p.index()].addressee.index()].is_addressee());
        sim.run_for(1.0).unwrap();
        sim.run_for(1.0).unwrap();
        assert_eq!(sim.now(), hours(2.0));
        let phases: Vec<ParcelPhase> = sim.parcels[p.index()].phase_log.iter().map(|&(_, ph)| ph).collect();
        assert_eq!(
            phases,
            vec![
                ParcelPhase::Created,
                ParcelPhase::AwaitFirstCourier,
                ParcelPhase::AwaitFirstPickup,
                ParcelPhase::FirstMileCarried,
                ParcelPhase::DirectDelivered,
            ]
        );
        let log = &sim.parcels[p.index()].phase_log;
        assert!(log.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}

// ── Truck relay ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod truck_relay {
    use super::*;

    #[test]
    fn parcel_crosses_warehouses_by_truck() {
        for policy in [Box::new(SingleParcelPolicy) as Box<dyn CourierPolicy>, Box::new(MultiParcelPolicy)] {
            let mut sim = two_warehouses(policy);
            assert_eq!(sim.depot, StorageId(0));

            // Sender next to the east warehouse, addressee next to the depot.
            let p = sim.create_parcel(Point::new(9.0, 0.0), Point::new(-1.0, 0.0)).unwrap();
            assert_eq!(sim.parcels[p.index()].first_mile_wh, StorageId(1));
            assert_eq!(sim.parcels[p.index()].last_mile_wh, StorageId(0));

            sim.run_until(hours(4.0)).unwrap();

            let parcel = &sim.parcels[p.index()];
            assert_eq!(parcel.phase, ParcelPhase::Delivered);
            assert!(entered(&sim, p, ParcelPhase::AwaitWarehouseDropoff));
            assert!(entered(&sim, p, ParcelPhase::TruckCarried));
            assert!(entered(&sim, p, ParcelPhase::AwaitLastCourier));
            assert!(parcel.timer.get(crate::ParcelTimer::MoveTruck) > 0);
            assert!(parcel.timer.get(crate::ParcelTimer::AwaitTruck) > 0);
            assert_custody(&sim);

            let truck = sim.trucks().next().unwrap();
            assert!(truck.odometer_km >= 16.0);
        }
    }

    /// Three warehouses in a line with the depot in the middle.  The route
    /// limit keeps each outer warehouse on its own route, so a parcel from
    /// east to west changes trucks at the depot.
    #[test]
    fn parcel_relayed_through_depot() {
        let config = DeliveryConfig {
            trucks_number: 2,
            warehouses_number: 3,
            max_route_len_km: 17.0,
            ..test_config()
        };
        let mut sim = SimBuilder::new(config)
            .warehouses(vec![Point::ORIGIN, Point::new(8.0, 0.0), Point::new(-8.0, 0.0)])
            .courier_policy(Box::new(MultiParcelPolicy))
            .parcel_generator(false)
            .build()
            .unwrap();
        assert_eq!(sim.depot, StorageId(0));
        assert_eq!(sim.truck_dispatcher.routes.len(), 2);
        for route in &sim.truck_dispatcher.routes {
            assert!(route.is_well_formed());
            assert!(!route.is_peripheral(StorageId(0)));
            assert!(route.is_peripheral(StorageId(1)) != route.is_peripheral(StorageId(2)));
        }

        let p = sim.create_parcel(Point::new(9.0, 0.0), Point::new(-9.0, 0.0)).unwrap();
        assert_eq!(sim.parcels[p.index()].first_mile_wh, StorageId(1));
        assert_eq!(sim.parcels[p.index()].last_mile_wh, StorageId(2));

        let mut held_at_depot = false;
        for step in 1..=16 {
            sim.run_until(hours(0.25 * step as f64)).unwrap();
            assert_custody(&sim);
            held_at_depot |= sim.parcels[p.index()].holder == Holder::Storage(StorageId(0));
        }
        assert!(held_at_depot);

        let parcel = &sim.parcels[p.index()];
        assert_eq!(parcel.phase, ParcelPhase::Delivered);
        assert_eq!(parcel.holder, Holder::Storage(parcel.addressee));
        let phases = |phase| parcel.phase_log.iter().filter(|&&(_, ph)| ph == phase).count();
        // One leg per truck: the east truck never takes the parcel back out
        // of the depot, the west truck drops it at its last-mile warehouse.
        assert_eq!(phases(ParcelPhase::TruckCarried), 2);
        assert!(phases(ParcelPhase::AwaitTruckAssign) >= 2);
        assert!(parcel.timer.get(crate::ParcelTimer::AwaitTruck) > 0);
        assert!(parcel.timer.get(crate::ParcelTimer::MoveTruck) > 0);
        for truck in sim.trucks() {
            assert!(truck.odometer_km >= 16.0, "{}", truck.id);
            assert!(truck.hold.is_empty());
        }
    }

    #[test]
    fn dispatch_to_current_stop_moves_nothing() {
        let mut sim = two_warehouses(Box::new(MultiParcelPolicy));
        let truck = sim.trucks().next().unwrap().id;
        assert_eq!(truck, MoverId(2));
        sim.movers[truck.index()].current = StorageId(1);

        sim.assign_truck_task(truck).unwrap();

        let m = &sim.movers[truck.index()];
        assert_eq!(m.target, Some(StorageId(1)));
        assert!(m.to_load.is_empty());
        assert!(m.to_unload.is_empty());
        assert!(sim.kernel.is_triggered(m.await_dispatch));
        let route = sim.truck_dispatcher.route_of(truck).unwrap();
        assert_eq!(route.peek(), Some(StorageId(0)));
    }

    #[test]
    fn route_starts_away_from_depot() {
        let sim = two_warehouses(Box::new(MultiParcelPolicy));
        let route = &sim.truck_dispatcher.routes[0];
        assert!(route.is_well_formed());
        assert_eq!(route.peek(), Some(StorageId(1)));
        assert!(route.is_peripheral(StorageId(1)));
        assert!(!route.is_peripheral(StorageId(0)));
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch {
    use super::*;
    use crate::dispatch::{DispatchQueue, Task};

    #[test]
    fn loaded_movers_first_fifo_within_class() {
        let config = DeliveryConfig { couriers_per_warehouse: 6, ..test_config() };
        let mut sim = SimBuilder::new(config)
            .warehouses(vec![Point::ORIGIN])
            .parcel_generator(false)
            .build()
            .unwrap();

        // Loaded: 1, 3, 4.  Empty: 0, 2, 5.
        for m in [1, 3, 4] {
            sim.movers[m].hold.insert(ParcelId(100 + m as u32));
        }
        let mut q = DispatchQueue::new(&mut sim.kernel);
        for m in 0..6 {
            q.push(&mut sim.kernel, MoverId(m));
        }
        assert!(sim.kernel.is_triggered(q.movers_waiting));

        let order: Vec<u32> = std::iter::from_fn(|| q.pop(&mut sim.kernel, &sim.movers))
            .map(|m| m.0)
            .collect();
        assert_eq!(order, vec![1, 3, 4, 0, 2, 5]);
        assert!(q.is_empty());
        assert!(!sim.kernel.is_triggered(q.movers_waiting));
    }

    #[test]
    fn closer_idle_courier_vetoes_request() {
        let config = DeliveryConfig { couriers_per_warehouse: 2, ..test_config() };
        let mut sim = SimBuilder::new(config)
            .warehouses(vec![Point::ORIGIN])
            .parcel_generator(false)
            .build()
            .unwrap();
        let (a, b) = (MoverId(0), MoverId(1));
        let p = sim.create_parcel(Point::new(5.0, 0.0), Point::new(4.0, 0.0)).unwrap();
        let (sender, addressee) = (sim.parcels[p.index()].sender, sim.parcels[p.index()].addressee);

        // `b` stands at the addressee, 1 km from the sender; `a` is at the
        // warehouse, 5 km away.
        sim.movers[b.index()].current = addressee;
        sim.movers[b.index()].pos = Point::new(4.0, 0.0);
        sim.courier_dispatchers[0].pickup_requests.insert(sender);

        let d = sim.courier_dispatchers[0].id;
        sim.courier_dispatchers[0].queue.push(&mut sim.kernel, b);
        assert_eq!(SingleParcelPolicy.courier_task(&sim, d, a), None);

        let mut q = DispatchQueue::new(&mut sim.kernel);
        q.push(&mut sim.kernel, a);
        sim.courier_dispatchers[0].queue = q;
        assert_eq!(SingleParcelPolicy.courier_task(&sim, d, b), Some(Task::go_to(sender)));
    }

    #[test]
    fn multi_parcel_unloads_only_at_matching_stop() {
        let mut sim = two_warehouses(Box::new(MultiParcelPolicy));
        let local = sim.create_parcel(Point::new(1.0, 0.0), Point::new(0.0, 2.0)).unwrap();
        let outbound = sim.create_parcel(Point::new(1.0, 0.0), Point::new(9.0, 0.0)).unwrap();
        let courier = MoverId(0);
        assert_eq!(sim.movers[courier.index()].current, StorageId(0));
        sim.movers[courier.index()].hold.extend([local, outbound]);
        for p in [local, outbound] {
            let sender = sim.parcels[p.index()].sender;
            sim.storages[sender.index()].parcels.remove(&p);
            sim.parcels[p.index()].holder = Holder::Mover(courier);
        }

        let d = sim.courier_dispatchers[0].id;
        let task = MultiParcelPolicy.courier_task(&sim, d, courier).unwrap();
        // The warehouse is where the courier stands: closest target.
        assert_eq!(task.target, StorageId(0));
        assert_eq!(task.unload, vec![outbound]);
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod errors {
    use dn_core::{DnError, MoverKind, Operation};
    use dn_routing::RoutingError;

    use super::*;
    use crate::{SimError, Task};

    #[test]
    fn pickup_of_absent_parcel_fails() {
        let mut sim = single_warehouse(Box::new(MultiParcelPolicy));
        let p = sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        let err = sim.storage_pickup(StorageId(0), p, MoverId(0)).unwrap_err();
        assert!(matches!(err, SimError::ParcelNotHeld { parcel, storage, .. }
            if parcel == p && storage == StorageId(0)));
    }

    #[test]
    fn dropoff_of_uncarried_parcel_fails() {
        let mut sim = single_warehouse(Box::new(MultiParcelPolicy));
        let p = sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        let err = sim.storage_dropoff(StorageId(0), p, MoverId(0)).unwrap_err();
        assert!(matches!(err, SimError::NotCarried { .. }));
    }

    #[test]
    fn trucks_do_not_serve_customers() {
        let mut sim = single_warehouse(Box::new(MultiParcelPolicy));
        let p = sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        let sender = &sim.storages[sim.parcels[p.index()].sender.index()];
        let err = sender.operation_time(Operation::Pickup, MoverKind::Truck, &sim.config).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedOperation { mover_kind: MoverKind::Truck, .. }));
        let wh = &sim.storages[0];
        assert_eq!(wh.operation_time(Operation::Dropoff, MoverKind::Truck, &sim.config).unwrap(), 0.005);
    }

    #[test]
    fn task_naming_unknown_storage_fails() {
        let mut sim = single_warehouse(Box::new(MultiParcelPolicy));
        let err = sim.accept_task(MoverId(0), Task::go_to(StorageId(999))).unwrap_err();
        assert!(matches!(err, SimError::InvalidTask { .. }));
        let task = Task { target: StorageId(0), load: vec![ParcelId(7)], unload: Vec::new() };
        assert!(matches!(sim.accept_task(MoverId(0), task), Err(SimError::InvalidTask { .. })));
    }

    #[test]
    fn infeasible_routes_fail_the_build() {
        let config = DeliveryConfig { trucks_number: 1, max_route_len_km: 10.0, ..test_config() };
        let result = SimBuilder::new(config)
            .warehouses(vec![Point::ORIGIN, Point::new(8.0, 0.0)])
            .build();
        assert!(matches!(result, Err(SimError::Routing(RoutingError::Infeasible { .. }))));
    }

    #[test]
    fn same_warehouse_parcel_rejected_when_disabled() {
        let config = DeliveryConfig { allow_same_wh_parcels: false, ..test_config() };
        let mut sim = SimBuilder::new(config)
            .warehouses(vec![Point::ORIGIN])
            .parcel_generator(false)
            .build()
            .unwrap();
        let err = sim.create_parcel(Point::new(1.0, 0.0), Point::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, SimError::SameWarehouseParcel { warehouse } if warehouse == StorageId(0)));
        assert!(sim.parcels.is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DeliveryConfig { courier_sender_pickup_time_hrs: -0.1, ..test_config() };
        let result = SimBuilder::new(config).build();
        assert!(matches!(result, Err(SimError::Core(DnError::NegativeDuration(_)))));

        let result = SimBuilder::new(test_config()).warehouses(Vec::new()).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Generated runs ────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use super::*;
    use crate::{MetricsLog, MoverTimer, NoopObserver};

    fn city(policy: Box<dyn CourierPolicy>, seed: u64) -> Sim {
        let config = DeliveryConfig {
            seed,
            simulation_time_hrs: 6.0,
            monitoring_interval_hrs: 0.5,
            warehouses_number: 3,
            couriers_per_warehouse: 3,
            trucks_number: 1,
            courier_speed_kmh: 15.0,
            parcel_interval_hrs: 0.1,
            ..DeliveryConfig::default()
        };
        SimBuilder::new(config).courier_policy(policy).build().unwrap()
    }

    #[test]
    fn custody_is_conserved() {
        let mut sim = city(Box::new(MultiParcelPolicy), 7);
        for step in 1..=12 {
            sim.run_until(hours(0.5 * step as f64)).unwrap();
            assert_custody(&sim);
        }
        assert!(sim.parcels.len() >= 50);
        assert!(sim.delivered().count() > 0);
    }

    #[test]
    fn runs_are_deterministic() {
        let policies: [fn() -> Box<dyn CourierPolicy>; 2] =
            [|| Box::new(SingleParcelPolicy), || Box::new(MultiParcelPolicy)];
        for make in policies {
            let a = city(make(), 11).run(&mut NoopObserver).unwrap();
            let b = city(make(), 11).run(&mut NoopObserver).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn snapshots_and_results() {
        let mut sim = city(Box::new(SingleParcelPolicy), 3);
        let mut log = MetricsLog::default();
        let results = sim.run(&mut log).unwrap();

        // t = 0, every half hour, and the horizon.
        assert_eq!(log.snapshots.len(), 13);
        assert_eq!(log.snapshots[0].get("time"), Some(0.0));
        assert_eq!(log.snapshots[12].get("time"), Some(6.0));
        assert_eq!(sim.now(), hours(6.0));

        assert_eq!(results.get_label("ver_disp_courier"), Some("single_parcel"));
        assert_eq!(results.get_label("ver_disp_truck"), Some("savings"));
        assert!(results.get("parcels_delivered_total").unwrap() > 0.0);
        let total = results.get("unit_costs_couriers").unwrap()
            + results.get("unit_costs_wh").unwrap()
            + results.get("unit_costs_trucks").unwrap()
            + results.get("unit_costs_fuel").unwrap();
        assert!((results.get("unit_costs_total").unwrap() - total).abs() < 1e-9);
        let share = results.get("courier_time_move_loaded").unwrap();
        assert!((0.0..=1.0).contains(&share));
    }

    #[test]
    fn free_couriers_counts_queued_couriers() {
        let mut sim = single_warehouse(Box::new(SingleParcelPolicy));
        sim.create_parcel(Point::new(2.0, 0.0), Point::new(5.0, 0.0)).unwrap();

        // Driving empty to the sender: no parcel on board, but not free.
        sim.run_until(hours(0.1)).unwrap();
        assert!(sim.couriers().next().unwrap().hold.is_empty());
        assert_eq!(sim.post_metrics().get("free_couriers"), Some(0.0));

        sim.run_until(hours(3.0)).unwrap();
        assert_eq!(sim.post_metrics().get("free_couriers"), Some(1.0));
    }

    #[test]
    fn mover_timers_add_up() {
        let mut sim = city(Box::new(MultiParcelPolicy), 5);
        sim.run_until(hours(4.0)).unwrap();
        let categories = [
            MoverTimer::AwaitDispatchEmpty,
            MoverTimer::AwaitDispatchLoaded,
            MoverTimer::Loading,
            MoverTimer::Unloading,
            MoverTimer::MoveEmpty,
            MoverTimer::MoveLoaded,
        ];
        for m in &sim.movers {
            let sum: u64 = categories.iter().map(|&c| m.timer.get(c)).sum();
            let (Some(first), Some(last)) = (m.timer.first_punch(), m.timer.last_punch()) else {
                panic!("{} never punched", m.id);
            };
            assert_eq!(sum, last.since(first), "{}", m.id);
        }
        for p in sim.delivered() {
            let span = p.delivered_at.unwrap().since(p.created_at);
            assert_eq!(p.timer.total(), span, "{}", p.id);
        }
    }
}

//! Run metrics: periodic snapshots and the end-of-run summary.
//!
//! Both hooks are read-only over the simulation.
//!
//! | Hook                    | Keys                                                        |
//! |-------------------------|-------------------------------------------------------------|
//! | parcels                 | `parcels_generated`, `parcels_direct_dist_total`, `parcels_delivered_total`, `parcels_delivered_direct_dist_total`, `parcel_time_*` (hours, mean over delivered parcels) |
//! | couriers                | `free_couriers`, `odo_courier_total`, `parcels_in_hold_wh_*`, `parcels_in_hold_courier_*` |
//! | trucks                  | `trucks_empty`, `parcels_in_hold_wh_central`, `parcels_in_hold_truck_*`, `odo_truck_total` |
//! | results only            | `unit_costs_*`, `travel_efficiency_parcels_delivered`, `courier_time_*` (share of the horizon) |
//!
//! Totals of distances and costs are truncated to whole units.  A courier is
//! free while it sits in its dispatcher's queue, not merely while its hold is
//! empty.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;

use dn_core::time::hours;

use crate::mover::MoverTimer;
use crate::parcel::ParcelTimer;
use crate::Sim;

/// Ordered name → value map, plus a few text labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    values: BTreeMap<&'static str, f64>,
    labels: BTreeMap<&'static str, &'static str>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: f64) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn label(&mut self, key: &'static str, value: &'static str) {
        self.labels.insert(key, value);
    }

    pub fn get_label(&self, key: &str) -> Option<&'static str> {
        self.labels.get(key).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    /// Sum of every value whose key starts with `prefix`.
    pub fn sum_prefixed(&self, prefix: &str) -> f64 {
        self.values
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v)
            .sum()
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.labels {
            writeln!(f, "{k:<40} {v}")?;
        }
        for (k, v) in &self.values {
            writeln!(f, "{k:<40} {v:.3}")?;
        }
        Ok(())
    }
}

const COURIER_TIME_KEYS: [(&str, MoverTimer); 6] = [
    ("courier_time_await_dispatch_empty", MoverTimer::AwaitDispatchEmpty),
    ("courier_time_await_dispatch_loaded", MoverTimer::AwaitDispatchLoaded),
    ("courier_time_loading", MoverTimer::Loading),
    ("courier_time_unloading", MoverTimer::Unloading),
    ("courier_time_move_empty", MoverTimer::MoveEmpty),
    ("courier_time_move_loaded", MoverTimer::MoveLoaded),
];

const PARCEL_TIME_KEYS: [(&str, ParcelTimer); 4] = [
    ("parcel_time_await_courier", ParcelTimer::AwaitCourier),
    ("parcel_time_await_truck", ParcelTimer::AwaitTruck),
    ("parcel_time_move_courier", ParcelTimer::MoveCourier),
    ("parcel_time_move_truck", ParcelTimer::MoveTruck),
];

impl Sim {
    /// Snapshot of the current state.
    pub fn post_metrics(&self) -> Metrics {
        let mut m = Metrics::new();
        m.set("time", self.kernel.now().as_hours());
        self.post_parcel_metrics(&mut m);
        self.post_courier_metrics(&mut m);
        self.post_truck_metrics(&mut m);
        m
    }

    /// Final snapshot plus cost and efficiency rollups.
    pub fn post_results(&self) -> Metrics {
        let mut m = self.post_metrics();
        let cfg = &self.config;
        m.label("ver_disp_courier", self.courier_policy.name());
        m.label("ver_disp_truck", self.optimizer_name);

        let delivered = m.get("parcels_delivered_total").unwrap_or(0.0);
        let odo_truck = m.get("odo_truck_total").unwrap_or(0.0);
        let couriers = self.couriers().count();
        if delivered > 0.0 {
            let per_unit = self.kernel.now().as_hours() / cfg.hrs_per_mon / delivered;
            let warehouses = self.warehouses.len() as f64;
            let trucks = self.truck_dispatcher.trucks.len() as f64;
            m.set("unit_costs_couriers", (cfg.courier_cost_per_mon * couriers as f64 * per_unit).trunc());
            m.set("unit_costs_wh", (cfg.warehouse_cost_per_mon * warehouses * per_unit).trunc());
            m.set("unit_costs_trucks", (cfg.truck_cost_per_mon * trucks * per_unit).trunc());
            let fuel = cfg.fuel_usage_l_per_100_km * odo_truck / 100.0 * cfg.fuel_cost_per_litre;
            m.set("unit_costs_fuel", (fuel / delivered).trunc());
        } else {
            warn!("no parcels delivered by {}, unit costs skipped", self.kernel.now());
        }

        let odo_total = odo_truck + m.get("odo_courier_total").unwrap_or(0.0);
        if odo_total > 0.0 {
            let direct = m.get("parcels_delivered_direct_dist_total").unwrap_or(0.0);
            m.set("travel_efficiency_parcels_delivered", direct / odo_total);
        }

        if couriers > 0 {
            let denom = couriers as f64 * cfg.simulation_time_hrs;
            for (key, category) in COURIER_TIME_KEYS {
                let ticks: u64 = self.couriers().map(|c| c.timer.get(category)).sum();
                m.set(key, hours(ticks) / denom);
            }
        }

        let total = m.sum_prefixed("unit_costs_");
        m.set("unit_costs_total", total);
        m
    }

    fn post_parcel_metrics(&self, m: &mut Metrics) {
        m.set("parcels_generated", self.parcels.len() as f64);
        let direct: f64 = self.parcels.iter().map(|p| p.direct_dist).sum();
        m.set("parcels_direct_dist_total", direct.trunc());

        let delivered: Vec<_> = self.parcels.iter().filter(|p| p.is_delivered()).collect();
        m.set("parcels_delivered_total", delivered.len() as f64);
        let direct: f64 = delivered.iter().map(|p| p.direct_dist).sum();
        m.set("parcels_delivered_direct_dist_total", direct.trunc());

        if delivered.is_empty() {
            return;
        }
        let n = delivered.len() as f64;
        let total: u64 = delivered.iter().map(|p| p.timer.total()).sum();
        m.set("parcel_time_total", hours(total) / n);
        for (key, category) in PARCEL_TIME_KEYS {
            let ticks: u64 = delivered.iter().map(|p| p.timer.get(category)).sum();
            m.set(key, hours(ticks) / n);
        }
    }

    fn post_courier_metrics(&self, m: &mut Metrics) {
        let waiting: usize = self.courier_dispatchers.iter().map(|d| d.queue.len()).sum();
        m.set("free_couriers", waiting as f64);
        let odo: f64 = self.couriers().map(|c| c.odometer_km).sum();
        m.set("odo_courier_total", odo.trunc());

        let held: Vec<usize> = self
            .warehouses
            .iter()
            .map(|w| self.storages[w.index()].parcels.len())
            .collect();
        if let Some(&max) = held.iter().max() {
            m.set("parcels_in_hold_wh_max", max as f64);
            m.set("parcels_in_hold_wh_total", held.iter().sum::<usize>() as f64);
        }

        let held: Vec<usize> = self.couriers().map(|c| c.hold.len()).collect();
        if let Some(&max) = held.iter().max() {
            m.set("parcels_in_hold_courier_max", max as f64);
            m.set("parcels_in_hold_courier_total", held.iter().sum::<usize>() as f64);
        }
    }

    fn post_truck_metrics(&self, m: &mut Metrics) {
        let trucks: Vec<_> = self
            .truck_dispatcher
            .trucks
            .iter()
            .map(|t| &self.movers[t.index()])
            .collect();
        m.set("trucks_empty", trucks.iter().filter(|t| !t.is_loaded()).count() as f64);
        m.set("parcels_in_hold_wh_central", self.storages[self.depot.index()].parcels.len() as f64);
        if let Some(max) = trucks.iter().map(|t| t.hold.len()).max() {
            m.set("parcels_in_hold_truck_max", max as f64);
            m.set("parcels_in_hold_truck_total", trucks.iter().map(|t| t.hold.len()).sum::<usize>() as f64);
        }
        let odo: f64 = trucks.iter().map(|t| t.odometer_km).sum();
        m.set("odo_truck_total", odo.trunc());
    }
}

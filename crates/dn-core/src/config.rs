//! `DeliveryConfig` — the flat, read-only parameter bag for one run.
//!
//! All durations are in hours, distances in kilometres, speeds in km/h and
//! costs in an arbitrary currency unit per month.  The simulation converts
//! durations to ticks once at the edge (see [`crate::time`]).

use crate::error::{DnError, DnResult};
use crate::time::{Tick, ticks_for_hours};

/// Top-level delivery-network configuration.
///
/// Typically built from [`Default`] and adjusted field by field by the
/// application crate, then handed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    // ── Horizon ───────────────────────────────────────────────────────────
    pub simulation_time_hrs:     f64,
    /// Period of metrics snapshots handed to the observer.
    pub monitoring_interval_hrs: f64,

    // ── City ──────────────────────────────────────────────────────────────
    pub city_radius_km:    f64,
    /// Used for cost rollups; the builder takes explicit warehouse positions.
    pub warehouses_number: usize,

    // ── Fleet ─────────────────────────────────────────────────────────────
    pub couriers_per_warehouse: usize,
    pub trucks_number:          usize,
    pub courier_speed_kmh:      f64,
    pub truck_speed_kmh:        f64,

    // ── Operation times ───────────────────────────────────────────────────
    pub courier_warehouse_pickup_time_hrs:  f64,
    pub courier_warehouse_deposit_time_hrs: f64,
    pub courier_sender_pickup_time_hrs:     f64,
    pub courier_addressee_deposit_time_hrs: f64,
    /// Per parcel, both directions.
    pub parcel_truck_load_unload_time_hrs:  f64,

    // ── Demand ────────────────────────────────────────────────────────────
    pub parcel_interval_hrs:   f64,
    /// When `false`, generated parcels always cross between two warehouses.
    pub allow_same_wh_parcels: bool,

    // ── Routing ───────────────────────────────────────────────────────────
    pub max_route_len_km: f64,

    // ── Costs ─────────────────────────────────────────────────────────────
    pub courier_cost_per_mon:    f64,
    pub warehouse_cost_per_mon:  f64,
    pub truck_cost_per_mon:      f64,
    pub hrs_per_mon:             f64,
    pub fuel_usage_l_per_100_km: f64,
    pub fuel_cost_per_litre:     f64,
}

impl Default for DeliveryConfig {
    /// A small city: seven warehouses within 10 km, a parcel every three
    /// minutes, one simulated week.
    fn default() -> Self {
        Self {
            seed:                               42,
            simulation_time_hrs:                168.0,
            monitoring_interval_hrs:            1.0,
            city_radius_km:                     10.0,
            warehouses_number:                  7,
            couriers_per_warehouse:             5,
            trucks_number:                      2,
            courier_speed_kmh:                  15.0,
            truck_speed_kmh:                    40.0,
            courier_warehouse_pickup_time_hrs:  0.05,
            courier_warehouse_deposit_time_hrs: 0.05,
            courier_sender_pickup_time_hrs:     0.1,
            courier_addressee_deposit_time_hrs: 0.1,
            parcel_truck_load_unload_time_hrs:  0.005,
            parcel_interval_hrs:                0.05,
            allow_same_wh_parcels:              true,
            max_route_len_km:                   100.0,
            courier_cost_per_mon:               60_000.0,
            warehouse_cost_per_mon:             200_000.0,
            truck_cost_per_mon:                 150_000.0,
            hrs_per_mon:                        720.0,
            fuel_usage_l_per_100_km:            12.0,
            fuel_cost_per_litre:                50.0,
        }
    }
}

impl DeliveryConfig {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> DnResult<()> {
        let positive = [
            ("simulation_time_hrs",     self.simulation_time_hrs),
            ("monitoring_interval_hrs", self.monitoring_interval_hrs),
            ("city_radius_km",          self.city_radius_km),
            ("courier_speed_kmh",       self.courier_speed_kmh),
            ("truck_speed_kmh",         self.truck_speed_kmh),
            ("parcel_interval_hrs",     self.parcel_interval_hrs),
            ("max_route_len_km",        self.max_route_len_km),
            ("hrs_per_mon",             self.hrs_per_mon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DnError::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let durations = [
            self.courier_warehouse_pickup_time_hrs,
            self.courier_warehouse_deposit_time_hrs,
            self.courier_sender_pickup_time_hrs,
            self.courier_addressee_deposit_time_hrs,
            self.parcel_truck_load_unload_time_hrs,
        ];
        for d in durations {
            ticks_for_hours(d)?;
        }
        Ok(())
    }

    /// The tick at which the run ends (exclusive upper bound).
    pub fn horizon(&self) -> DnResult<Tick> {
        Tick::from_hours(self.simulation_time_hrs)
    }

    /// Ticks between two metric snapshots; at least one.
    pub fn monitoring_interval_ticks(&self) -> DnResult<u64> {
        Ok(ticks_for_hours(self.monitoring_interval_hrs)?.max(1))
    }
}

//! city — parcel delivery in a 10 km city served by seven warehouses.
//!
//! First runs the default configuration for two days with a progress
//! printer, then sweeps courier fleet sizes under both courier policies in
//! parallel and prints the headline results side by side.

use std::time::Instant;

use anyhow::Result;
use log::info;
use rayon::prelude::*;

use dn_core::{DeliveryConfig, Tick};
use dn_sim::{CourierPolicy, Metrics, MultiParcelPolicy, Sim, SimBuilder, SimObserver, SingleParcelPolicy};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64   = 42;
const DEMO_HRS:        f64   = 48.0;
const SWEEP_HRS:       f64   = 72.0;
const COURIER_COUNTS:  [usize; 5] = [2, 3, 4, 5, 6];
const POLICIES:        [&str; 2]  = ["single_parcel", "multi_parcel"];

/// Columns of the sweep table: metric key and header.
const COLUMNS: [(&str, &str); 5] = [
    ("parcels_delivered_total",             "delivered"),
    ("parcel_time_total",                   "hrs/parcel"),
    ("travel_efficiency_parcels_delivered", "efficiency"),
    ("courier_time_move_loaded",            "loaded"),
    ("unit_costs_total",                    "cost/parcel"),
];

fn policy(name: &str) -> Box<dyn CourierPolicy> {
    match name {
        "single_parcel" => Box::new(SingleParcelPolicy),
        _ => Box::new(MultiParcelPolicy),
    }
}

// ── Progress printer ──────────────────────────────────────────────────────────

/// Prints one line every `every_hrs` of simulated time.
struct Progress {
    every_hrs: f64,
    next_hrs:  f64,
}

impl SimObserver for Progress {
    fn on_snapshot(&mut self, now: Tick, sim: &Sim) {
        if now.as_hours() < self.next_hrs {
            return;
        }
        self.next_hrs += self.every_hrs;
        let m = sim.post_metrics();
        println!(
            "{:>6.1} h  generated {:>5}  delivered {:>5}  free couriers {:>3}  at depot {:>4}",
            now.as_hours(),
            m.get("parcels_generated").unwrap_or(0.0),
            m.get("parcels_delivered_total").unwrap_or(0.0),
            m.get("free_couriers").unwrap_or(0.0),
            m.get("parcels_in_hold_wh_central").unwrap_or(0.0),
        );
    }
}

// ── Runs ──────────────────────────────────────────────────────────────────────

fn demo() -> Result<Metrics> {
    let config = DeliveryConfig { seed: SEED, simulation_time_hrs: DEMO_HRS, ..DeliveryConfig::default() };
    let mut sim = SimBuilder::new(config).courier_policy(policy("multi_parcel")).build()?;
    let mut progress = Progress { every_hrs: 6.0, next_hrs: 0.0 };
    Ok(sim.run(&mut progress)?)
}

fn sweep_point(couriers: usize, policy_name: &str) -> Result<Metrics> {
    let config = DeliveryConfig {
        seed: SEED,
        simulation_time_hrs: SWEEP_HRS,
        couriers_per_warehouse: couriers,
        ..DeliveryConfig::default()
    };
    let mut sim = SimBuilder::new(config).courier_policy(policy(policy_name)).build()?;
    Ok(sim.run(&mut dn_sim::NoopObserver)?)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("=== city — parcel delivery network ===");
    println!("Seed: {SEED}  |  demo {DEMO_HRS} h  |  sweep {SWEEP_HRS} h");
    println!();

    // 1. One detailed run.
    let t0 = Instant::now();
    let results = demo()?;
    println!();
    println!("{results}");
    println!("Demo run complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    // 2. Fleet-size sweep, one run per thread.
    let points: Vec<(usize, &str)> = COURIER_COUNTS
        .iter()
        .flat_map(|&n| POLICIES.iter().map(move |&p| (n, p)))
        .collect();
    info!("sweeping {} configurations", points.len());

    let t0 = Instant::now();
    let rows: Vec<((usize, &str), Metrics)> = points
        .par_iter()
        .map(|&(n, p)| sweep_point(n, p).map(|m| ((n, p), m)))
        .collect::<Result<_>>()?;

    print!("{:<10} {:<14}", "couriers", "policy");
    for (_, header) in COLUMNS {
        print!(" {header:>12}");
    }
    println!();
    println!("{}", "-".repeat(25 + 13 * COLUMNS.len()));
    for ((n, p), m) in &rows {
        print!("{n:<10} {p:<14}");
        for (key, _) in COLUMNS {
            match m.get(key) {
                Some(v) => print!(" {v:>12.3}"),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
    println!();
    println!("Sweep complete in {:.3} s", t0.elapsed().as_secs_f64());

    Ok(())
}

//! Simulation observer trait for progress reporting and data collection.

use dn_core::Tick;

use crate::{Metrics, Sim};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_snapshot(&mut self, now: Tick, sim: &Sim) {
///         println!("{now}: {} parcels", sim.parcels.len());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at t = 0, every `monitoring_interval_hrs`, and at the horizon.
    ///
    /// Read-only access to the whole simulation; call
    /// [`Sim::post_metrics`] for the standard snapshot.
    fn on_snapshot(&mut self, _now: Tick, _sim: &Sim) {}

    /// Called once after the horizon is reached.
    fn on_sim_end(&mut self, _sim: &Sim) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every periodic metrics snapshot, in time order.
#[derive(Default)]
pub struct MetricsLog {
    pub snapshots: Vec<Metrics>,
}

impl SimObserver for MetricsLog {
    fn on_snapshot(&mut self, _now: Tick, sim: &Sim) {
        self.snapshots.push(sim.post_metrics());
    }
}

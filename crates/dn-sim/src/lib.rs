//! `dn-sim` — parcel-delivery simulation on top of the `dn-kernel` event
//! kernel.
//!
//! # Agents
//!
//! | Module        | Agent / concern                                           |
//! |---------------|-----------------------------------------------------------|
//! | [`storage`]   | warehouses, senders, addressees; custody transfers        |
//! | [`mover`]     | couriers and trucks: request → load → travel → unload     |
//! | [`parcel`]    | parcel lifecycle automaton                                |
//! | [`dispatch`]  | dispatch queue (loaded movers first), `Task`              |
//! | [`courier`]   | per-warehouse courier dispatcher                          |
//! | [`policy`]    | `CourierPolicy`: single- and multi-parcel strategies      |
//! | [`truck`]     | fleet-wide truck dispatcher over fixed routes             |
//! | [`generator`] | random parcel demand                                      |
//! | [`metrics`]   | periodic snapshot and end-of-run rollups                  |
//!
//! # Run model
//!
//! Every agent loop is an explicit state machine registered with the kernel
//! as a process.  [`Sim::run`] repeatedly asks the kernel for the next
//! process due and resumes it; the process advances until it suspends on a
//! timeout or an event.  Same-instant resumptions happen in registration
//! order, so a run is fully determined by its configuration and seed.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dn_core::DeliveryConfig;
//! use dn_sim::{NoopObserver, SimBuilder, SingleParcelPolicy};
//!
//! let mut sim = SimBuilder::new(DeliveryConfig::default())
//!     .courier_policy(Box::new(SingleParcelPolicy))
//!     .build()?;
//! let results = sim.run(&mut NoopObserver)?;
//! println!("{results}");
//! ```

pub mod builder;
pub mod courier;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod mover;
pub mod observer;
pub mod parcel;
pub mod policy;
pub mod sim;
pub mod storage;
pub mod truck;

#[cfg(test)]
mod tests;

pub use builder::{SimBuilder, default_layout};
pub use dispatch::Task;
pub use error::{SimError, SimResult};
pub use metrics::Metrics;
pub use mover::{Mover, MoverTimer};
pub use observer::{MetricsLog, NoopObserver, SimObserver};
pub use parcel::{Holder, Parcel, ParcelPhase, ParcelTimer};
pub use policy::{CourierPolicy, MultiParcelPolicy, SingleParcelPolicy};
pub use sim::Sim;
pub use storage::{Storage, StorageKind};

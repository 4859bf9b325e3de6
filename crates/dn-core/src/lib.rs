//! `dn-core` — foundational types for the delivery-network simulator.
//!
//! This crate is a dependency of every other `dn-*` crate.  It has no `dn-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `StorageId`, `MoverId`, `ParcelId`, `DispatcherId`, `ProcessId`, `EventId` |
//! | [`geo`]     | `Point` — planar km coordinates, Euclidean distance        |
//! | [`time`]    | `Tick`, hour ↔ tick conversion                             |
//! | [`rng`]     | `SimRng` — seeded, reproducible                            |
//! | [`kind`]    | `MoverKind`, `Operation`                                   |
//! | [`timer`]   | `PhaseTimer` — per-phase elapsed-time accumulator          |
//! | [`config`]  | `DeliveryConfig` — the flat run parameter bag              |
//! | [`error`]   | `DnError`, `DnResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, points and config.  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;
pub mod timer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::DeliveryConfig;
pub use error::{DnError, DnResult};
pub use geo::Point;
pub use ids::{DispatcherId, EventId, MoverId, ParcelId, ProcessId, StorageId};
pub use kind::{MoverKind, Operation};
pub use rng::SimRng;
pub use time::{TICKS_PER_HOUR, Tick, ticks_for_hours};
pub use timer::PhaseTimer;

//! `dn-routing` — spatial lookup and truck routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`index`]     | `WarehouseIndex` — R-tree nearest-warehouse lookup        |
//! | [`problem`]   | `RoutingProblem` — distance matrix, fleet, depot, limit   |
//! | [`optimizer`] | `RouteOptimizer` trait, `SavingsOptimizer`                |
//! | [`route`]     | `Route` — one truck's cyclic stop sequence                |
//! | [`error`]     | `RoutingError`, `RoutingResult<T>`                        |
//!
//! Routes are computed once, before the simulation starts.  The optimizer
//! sees only indices into the distance matrix; the simulation maps them back
//! to warehouse ids when it builds each [`Route`].

pub mod error;
pub mod index;
pub mod optimizer;
pub mod problem;
pub mod route;


pub use error::{RoutingError, RoutingResult};
pub use index::WarehouseIndex;
pub use optimizer::{RouteOptimizer, SavingsOptimizer};
pub use problem::RoutingProblem;
pub use route::Route;

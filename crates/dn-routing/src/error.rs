//! Routing error type.

use thiserror::Error;

/// Errors produced by `dn-routing`.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(
        "no routes for {vehicles} vehicle(s) over {stops} stop(s) within {max_route_len} km: {reason}"
    )]
    Infeasible {
        vehicles:      usize,
        stops:         usize,
        max_route_len: f64,
        reason:        String,
    },

    #[error("distance matrix row {row} has {got} entries, expected {expected}")]
    MatrixNotSquare { row: usize, got: usize, expected: usize },

    #[error("depot index {depot} out of range for {nodes} node(s)")]
    DepotOutOfRange { depot: usize, nodes: usize },

    #[error("routing problem has no warehouses")]
    NoWarehouses,
}

pub type RoutingResult<T> = Result<T, RoutingError>;

//! Simulation error type.
//!
//! Every variant is fatal: it means the dispatch logic produced an
//! inconsistent task or the run was configured with something it cannot
//! execute.  [`Sim::run`](crate::Sim::run) stops at the first one.

use thiserror::Error;

use dn_core::{DnError, MoverId, MoverKind, Operation, ParcelId, StorageId};
use dn_kernel::KernelError;
use dn_routing::RoutingError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{mover}: {parcel} not found at {storage} for pickup")]
    ParcelNotHeld {
        parcel:  ParcelId,
        storage: StorageId,
        mover:   MoverId,
    },

    #[error("{mover}: {parcel} is not in the hold")]
    NotCarried { parcel: ParcelId, mover: MoverId },

    #[error("{mover}: invalid task: {reason}")]
    InvalidTask { mover: MoverId, reason: String },

    #[error("{storage} does not support {operation} by a {mover_kind}")]
    UnsupportedOperation {
        storage:    StorageId,
        operation:  Operation,
        mover_kind: MoverKind,
    },

    #[error("sender and addressee both resolve to {warehouse} but same-warehouse parcels are disabled")]
    SameWarehouseParcel { warehouse: StorageId },

    #[error("route optimizer returned {got} route(s) for {expected} truck(s)")]
    RouteCount { expected: usize, got: usize },

    #[error(transparent)]
    Core(#[from] DnError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
}

pub type SimResult<T> = Result<T, SimError>;

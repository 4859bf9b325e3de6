//! Storages: warehouses, senders and addressees.
//!
//! A storage is a place that holds parcels.  Warehouses are created by the
//! builder and live for the whole run; every parcel brings its own sender
//! and addressee, created next to it.
//!
//! Custody moves only through [`Sim::storage_pickup`] and
//! [`Sim::storage_dropoff`], which keep the storage's parcel set, the mover's
//! hold and the parcel's `holder` back-reference in agreement.

use std::collections::BTreeSet;

use log::debug;

use dn_core::{DeliveryConfig, DispatcherId, MoverId, MoverKind, Operation, ParcelId, Point, StorageId};

use crate::parcel::Holder;
use crate::{Sim, SimError, SimResult};

// ── Storage ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StorageKind {
    /// Served by one courier dispatcher; a truck route stop.
    Warehouse { dispatcher: DispatcherId },
    /// Hands `parcel` over to a courier.
    Sender { parcel: ParcelId },
    /// Receives `parcel` from a courier.
    Addressee { parcel: ParcelId },
}

#[derive(Clone, Debug)]
pub struct Storage {
    pub id:      StorageId,
    pub kind:    StorageKind,
    pub pos:     Point,
    pub parcels: BTreeSet<ParcelId>,
}

impl Storage {
    pub fn is_warehouse(&self) -> bool {
        matches!(self.kind, StorageKind::Warehouse { .. })
    }

    pub fn is_sender(&self) -> bool {
        matches!(self.kind, StorageKind::Sender { .. })
    }

    pub fn is_addressee(&self) -> bool {
        matches!(self.kind, StorageKind::Addressee { .. })
    }

    /// Hours one `op` on one parcel by a mover of `kind` takes here.
    ///
    /// | storage      | courier pickup  | courier dropoff  | truck (either) |
    /// |--------------|-----------------|------------------|----------------|
    /// | warehouse    | wh pickup       | wh deposit       | load/unload    |
    /// | customer     | sender pickup   | addressee deposit| unsupported    |
    pub fn operation_time(&self, op: Operation, kind: MoverKind, cfg: &DeliveryConfig) -> SimResult<f64> {
        match (self.kind, kind, op) {
            (StorageKind::Warehouse { .. }, MoverKind::Courier, Operation::Pickup) => {
                Ok(cfg.courier_warehouse_pickup_time_hrs)
            }
            (StorageKind::Warehouse { .. }, MoverKind::Courier, Operation::Dropoff) => {
                Ok(cfg.courier_warehouse_deposit_time_hrs)
            }
            (StorageKind::Warehouse { .. }, MoverKind::Truck, _) => {
                Ok(cfg.parcel_truck_load_unload_time_hrs)
            }
            (_, MoverKind::Courier, Operation::Pickup) => Ok(cfg.courier_sender_pickup_time_hrs),
            (_, MoverKind::Courier, Operation::Dropoff) => Ok(cfg.courier_addressee_deposit_time_hrs),
            (_, MoverKind::Truck, operation) => Err(SimError::UnsupportedOperation {
                storage: self.id,
                operation,
                mover_kind: kind,
            }),
        }
    }
}

// ── Custody transfers and queries ─────────────────────────────────────────────

impl Sim {
    /// `mover` takes `parcel` out of `storage`.
    ///
    /// The operation time has already elapsed; this is the instant custody
    /// changes hands.
    pub fn storage_pickup(&mut self, storage: StorageId, parcel: ParcelId, mover: MoverId) -> SimResult<()> {
        if !self.storages[storage.index()].parcels.remove(&parcel) {
            return Err(SimError::ParcelNotHeld { parcel, storage, mover });
        }
        self.parcel_pickup(parcel, mover);
        self.parcels[parcel.index()].holder = Holder::Mover(mover);
        self.movers[mover.index()].hold.insert(parcel);
        debug!("{}: {mover} picked up {parcel} at {storage}", self.kernel.now());
        Ok(())
    }

    /// `mover` hands `parcel` over to `storage`.
    pub fn storage_dropoff(&mut self, storage: StorageId, parcel: ParcelId, mover: MoverId) -> SimResult<()> {
        if !self.movers[mover.index()].hold.remove(&parcel) {
            return Err(SimError::NotCarried { parcel, mover });
        }
        let pos = self.storages[storage.index()].pos;
        self.storages[storage.index()].parcels.insert(parcel);
        let p = &mut self.parcels[parcel.index()];
        p.holder = Holder::Storage(storage);
        p.pos = pos;
        self.parcel_dropoff(parcel);
        debug!("{}: {mover} dropped off {parcel} at {storage}", self.kernel.now());
        Ok(())
    }

    /// Parcels held at `storage` that wait for a courier assignment.
    pub fn parcels_awaiting_couriers(&self, storage: StorageId) -> BTreeSet<ParcelId> {
        self.storages[storage.index()]
            .parcels
            .iter()
            .copied()
            .filter(|&p| self.is_awaiting_courier(p))
            .collect()
    }

    /// Parcels held at `storage` that wait for a truck assignment.
    pub fn parcels_awaiting_trucks(&self, storage: StorageId) -> BTreeSet<ParcelId> {
        self.storages[storage.index()]
            .parcels
            .iter()
            .copied()
            .filter(|&p| self.is_awaiting_truck(p))
            .collect()
    }

    /// The storage in `candidates` closest to `from`; ties go to the first
    /// candidate in iteration order.
    pub fn closest_storage(&self, from: Point, candidates: impl IntoIterator<Item = StorageId>) -> Option<StorageId> {
        let mut best: Option<(StorageId, f64)> = None;
        for s in candidates {
            let d = from.distance(self.storages[s.index()].pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((s, d));
            }
        }
        best.map(|(s, _)| s)
    }
}

//! Mover kinds and storage operations.
//!
//! Storage operation times are keyed by the pair `(Operation, MoverKind)`;
//! both enums are small `Copy` tags so the lookup is a plain `match`.

/// The two kinds of parcel mover.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoverKind {
    /// Bound to one warehouse; serves senders and addressees around it.
    Courier,
    /// Drives a fixed circular route between warehouses.
    Truck,
}

impl MoverKind {
    /// Human-readable label, used in log lines and metric keys.
    pub fn as_str(self) -> &'static str {
        match self {
            MoverKind::Courier => "courier",
            MoverKind::Truck   => "truck",
        }
    }
}

impl std::fmt::Display for MoverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custody transfer between a storage and a mover.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// The mover takes a parcel out of the storage.
    Pickup,
    /// The mover hands a parcel over to the storage.
    Dropoff,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Pickup  => "pickup",
            Operation::Dropoff => "dropoff",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Typed arena indices.
//!
//! Every simulated actor lives in a `Vec` owned by the simulation, and actors
//! refer to each other only by these ids (parcel → holder, mover →
//! dispatcher, route → truck).  Ordering follows the inner integer, which is
//! what keeps `BTreeSet` iteration and tie-breaking deterministic.

use std::fmt;

macro_rules! arena_id {
    ($(#[$attr:meta])* $name:ident($inner:ty) => $tag:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $inner);

        impl $name {
            /// Placeholder for an id assigned later in construction.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

arena_id! {
    /// A warehouse, sender or addressee.
    StorageId(u32) => "storage"
}

arena_id! {
    /// A courier or truck.
    MoverId(u32) => "mover"
}

arena_id! {
    ParcelId(u32) => "parcel"
}

arena_id! {
    /// One courier dispatcher per warehouse, in warehouse order.
    DispatcherId(u32) => "dispatcher"
}

arena_id! {
    /// A kernel process: one per agent run loop.
    ProcessId(u32) => "process"
}

arena_id! {
    /// Kernel event handle.  Events are rearmed on every mover and parcel
    /// cycle, so a long run needs the wider counter.
    EventId(u64) => "event"
}

//! `dn-kernel` — the discrete-event core of the delivery-network simulator.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`queue`]   | `WakeQueue` — `(tick, seq)`-ordered pending wake-ups        |
//! | [`event`]   | `EventSlot`, `EventState`, `Condition`                      |
//! | [`kernel`]  | `Kernel` — clock, event table, process wake-ups             |
//! | [`error`]   | `KernelError`, `KernelResult<T>`                            |
//!
//! # Execution model
//!
//! Processes are plain state machines owned by the caller; the kernel only
//! knows their [`ProcessId`](dn_core::ProcessId).  A process suspends by
//! calling [`Kernel::sleep`] or [`Kernel::wait`] and returning; the driver
//! loop asks [`Kernel::next_ready`] which process to resume next.
//!
//! ```text
//! loop:
//!   ready queue non-empty   → resume its head (FIFO)
//!   else pop (at, seq) min  → now = at
//!       Resume(pid)         → resume pid
//!       Fire(ev)            → ev processed; waiters → ready queue (FIFO);
//!                             conditions over ev re-checked
//! ```
//!
//! Everything scheduled for the same tick runs before the clock moves, in
//! the order it was scheduled, so a fixed input replays identically.

pub mod error;
pub mod event;
pub mod kernel;
pub mod queue;

#[cfg(test)]
mod tests;

pub use error::{KernelError, KernelResult};
pub use event::{ConditionKind, EventState};
pub use kernel::Kernel;
pub use queue::{Wake, WakeQueue};

//! One-shot events and the conditions composed from them.
//!
//! An event moves `Pending → Triggered → Processed` and never back.
//! Triggering schedules it on the wake queue at the current tick; it becomes
//! `Processed` when that entry pops, which is the moment its waiters resume.
//! Reuse of a logical wait ("rearming") replaces the event with a fresh id.

use dn_core::{EventId, ProcessId};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EventState {
    Pending,
    /// Scheduled to fire; waiters have not resumed yet.
    Triggered,
    /// Fired; waiters have been resumed.
    Processed,
}

/// Who is notified when an event is processed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Waiter {
    Process(ProcessId),
    /// A condition event with this event among its constituents.
    Condition(EventId),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ConditionKind {
    /// Satisfied once every constituent has been processed.
    All,
    /// Satisfied once any constituent has been processed.
    Any,
}

#[derive(Clone, Debug)]
pub struct Condition {
    pub kind:   ConditionKind,
    pub events: Vec<EventId>,
}

#[derive(Clone, Debug)]
pub struct EventSlot {
    pub state:     EventState,
    pub waiters:   Vec<Waiter>,
    pub condition: Option<Condition>,
}

impl EventSlot {
    pub fn pending() -> Self {
        Self { state: EventState::Pending, waiters: Vec::new(), condition: None }
    }
}

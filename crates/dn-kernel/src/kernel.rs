//! The `Kernel`: simulated clock, event table and process wake-ups.

use std::collections::VecDeque;

use log::trace;
use rustc_hash::FxHashMap;

use dn_core::{EventId, ProcessId, Tick, ticks_for_hours};

use crate::event::{Condition, ConditionKind, EventSlot, EventState, Waiter};
use crate::queue::{Wake, WakeQueue};
use crate::{KernelError, KernelResult};

/// Single-threaded discrete-event kernel.
///
/// Owns the clock and every live event.  Processes are identified by
/// [`ProcessId`] only; the driver resumes whatever [`next_ready`] returns.
///
/// [`next_ready`]: Kernel::next_ready
#[derive(Default)]
pub struct Kernel {
    now:          Tick,
    queue:        WakeQueue,
    events:       FxHashMap<EventId, EventSlot>,
    /// Processes released by a processed event, resumed before the queue
    /// is consulted again.
    ready:        VecDeque<ProcessId>,
    next_event:   u64,
    next_process: u32,
}

impl Kernel {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Create a fresh pending event.
    pub fn event(&mut self) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        self.events.insert(id, EventSlot::pending());
        id
    }

    /// Discard `old` and return a fresh pending event in its place.
    ///
    /// Anything still waiting on `old` is orphaned: it will never resume.
    pub fn rearm(&mut self, old: EventId) -> EventId {
        self.retire(old);
        self.event()
    }

    /// Drop an event the caller no longer references.
    pub fn retire(&mut self, ev: EventId) {
        if let Some(slot) = self.events.remove(&ev) {
            if !slot.waiters.is_empty() {
                trace!("{ev} retired with {} waiter(s)", slot.waiters.len());
            }
        }
    }

    /// Trigger `ev`.  Idempotent: returns `false` (and does nothing) if the
    /// event was already triggered or is unknown.
    pub fn succeed(&mut self, ev: EventId) -> bool {
        match self.events.get_mut(&ev) {
            Some(slot) if slot.state == EventState::Pending => {
                slot.state = EventState::Triggered;
                self.queue.push(self.now, Wake::Fire(ev));
                true
            }
            _ => false,
        }
    }

    /// `true` once `ev` has been triggered (processed or not).
    pub fn is_triggered(&self, ev: EventId) -> bool {
        self.events
            .get(&ev)
            .is_some_and(|s| s.state != EventState::Pending)
    }

    /// `true` once `ev` has fired and released its waiters.
    pub fn is_processed(&self, ev: EventId) -> bool {
        self.events
            .get(&ev)
            .is_some_and(|s| s.state == EventState::Processed)
    }

    /// An event that fires `hours` from now.
    pub fn schedule_timeout(&mut self, hours: f64) -> KernelResult<EventId> {
        let ticks = ticks_for_hours(hours).map_err(|_| KernelError::NegativeDuration(hours))?;
        let id = self.event();
        if let Some(slot) = self.events.get_mut(&id) {
            slot.state = EventState::Triggered;
        }
        self.queue.push(self.now + ticks, Wake::Fire(id));
        Ok(id)
    }

    /// An event satisfied once every one of `events` has been processed.
    /// An empty list is satisfied immediately.
    pub fn all_of(&mut self, events: &[EventId]) -> KernelResult<EventId> {
        self.condition(ConditionKind::All, events)
    }

    /// An event satisfied once any of `events` has been processed.
    /// An empty list is satisfied immediately.
    pub fn any_of(&mut self, events: &[EventId]) -> KernelResult<EventId> {
        self.condition(ConditionKind::Any, events)
    }

    fn condition(&mut self, kind: ConditionKind, events: &[EventId]) -> KernelResult<EventId> {
        if let Some(&missing) = events.iter().find(|e| !self.events.contains_key(e)) {
            return Err(KernelError::UnknownEvent(missing));
        }
        let id = self.event();
        for ev in events {
            if let Some(slot) = self.events.get_mut(ev) {
                if slot.state != EventState::Processed {
                    slot.waiters.push(Waiter::Condition(id));
                }
            }
        }
        if let Some(slot) = self.events.get_mut(&id) {
            slot.condition = Some(Condition { kind, events: events.to_vec() });
        }
        self.check_condition(id);
        Ok(id)
    }

    fn check_condition(&mut self, id: EventId) {
        let Some(slot) = self.events.get(&id) else { return };
        let Some(cond) = &slot.condition else { return };
        if slot.state != EventState::Pending {
            return;
        }
        let satisfied = cond.events.is_empty()
            || match cond.kind {
                ConditionKind::All => cond.events.iter().all(|e| self.is_processed(*e)),
                ConditionKind::Any => cond.events.iter().any(|e| self.is_processed(*e)),
            };
        if satisfied {
            self.succeed(id);
        }
    }

    // ── Processes ─────────────────────────────────────────────────────────

    /// Register a new process; its first resumption happens at the current
    /// tick, after everything already scheduled for it.
    pub fn spawn(&mut self) -> ProcessId {
        let pid = ProcessId(self.next_process);
        self.next_process += 1;
        self.queue.push(self.now, Wake::Resume(pid));
        pid
    }

    /// Suspend `pid` on `ev`.
    ///
    /// Returns `Ok(false)` if `ev` is already processed: the process must
    /// carry on without returning to the driver.
    pub fn wait(&mut self, pid: ProcessId, ev: EventId) -> KernelResult<bool> {
        let slot = self.events.get_mut(&ev).ok_or(KernelError::UnknownEvent(ev))?;
        if slot.state == EventState::Processed {
            return Ok(false);
        }
        slot.waiters.push(Waiter::Process(pid));
        Ok(true)
    }

    /// Suspend `pid` for `hours`.
    pub fn sleep(&mut self, pid: ProcessId, hours: f64) -> KernelResult<()> {
        let ticks = ticks_for_hours(hours).map_err(|_| KernelError::NegativeDuration(hours))?;
        self.queue.push(self.now + ticks, Wake::Resume(pid));
        Ok(())
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// The next process to resume before `deadline`, advancing the clock as
    /// needed.  Returns `None` once nothing is due strictly before `deadline`;
    /// the clock is then left at `deadline`.
    pub fn next_ready(&mut self, deadline: Tick) -> Option<ProcessId> {
        loop {
            if let Some(pid) = self.ready.pop_front() {
                return Some(pid);
            }
            match self.queue.next_tick() {
                Some(at) if at < deadline => {}
                _ => {
                    self.now = self.now.max(deadline);
                    return None;
                }
            }
            let (at, wake) = self.queue.pop()?;
            self.now = at;
            match wake {
                Wake::Resume(pid) => return Some(pid),
                Wake::Fire(ev) => self.process(ev),
            }
        }
    }

    fn process(&mut self, ev: EventId) {
        let waiters = match self.events.get_mut(&ev) {
            Some(slot) => {
                slot.state = EventState::Processed;
                std::mem::take(&mut slot.waiters)
            }
            // Retired after being triggered.
            None => return,
        };
        for waiter in waiters {
            match waiter {
                Waiter::Process(pid) => self.ready.push_back(pid),
                Waiter::Condition(cond) => self.check_condition(cond),
            }
        }
    }

    /// Number of live events (diagnostics).
    pub fn live_events(&self) -> usize {
        self.events.len()
    }

    /// Number of entries still scheduled.
    pub fn pending_wakeups(&self) -> usize {
        self.queue.len()
    }
}

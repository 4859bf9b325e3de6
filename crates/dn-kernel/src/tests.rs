//! Unit tests for the discrete-event kernel.

use dn_core::{ProcessId, Tick};

use crate::Kernel;

/// Drain every resumption due before `deadline`, recording `(tick, pid)`.
fn drain(k: &mut Kernel, deadline: Tick) -> Vec<(Tick, ProcessId)> {
    let mut out = Vec::new();
    while let Some(pid) = k.next_ready(deadline) {
        out.push((k.now(), pid));
    }
    out
}

/// Drain everything due at the current instant.
fn settle(k: &mut Kernel) -> Vec<(Tick, ProcessId)> {
    let deadline = k.now() + 1;
    drain(k, deadline)
}

#[cfg(test)]
mod queue {
    use dn_core::{EventId, ProcessId, Tick};

    use crate::{Wake, WakeQueue};

    #[test]
    fn same_tick_pops_in_push_order() {
        let mut q = WakeQueue::new();
        q.push(Tick(5), Wake::Resume(ProcessId(2)));
        q.push(Tick(1), Wake::Fire(EventId(9)));
        q.push(Tick(5), Wake::Resume(ProcessId(0)));
        q.push(Tick(5), Wake::Resume(ProcessId(1)));

        assert_eq!(q.pop(), Some((Tick(1), Wake::Fire(EventId(9)))));
        assert_eq!(q.pop(), Some((Tick(5), Wake::Resume(ProcessId(2)))));
        assert_eq!(q.pop(), Some((Tick(5), Wake::Resume(ProcessId(0)))));
        assert_eq!(q.pop(), Some((Tick(5), Wake::Resume(ProcessId(1)))));
        assert!(q.is_empty());
    }
}

#[cfg(test)]
mod processes {
    use super::*;

    #[test]
    fn spawned_processes_resume_fifo_at_same_instant() {
        let mut k = Kernel::new();
        let a = k.spawn();
        let b = k.spawn();
        let c = k.spawn();
        let order = settle(&mut k);
        assert_eq!(order, vec![(Tick(0), a), (Tick(0), b), (Tick(0), c)]);
    }

    #[test]
    fn sleep_advances_clock() {
        let mut k = Kernel::new();
        let p = k.spawn();
        assert_eq!(k.next_ready(Tick(10_000)), Some(p));
        k.sleep(p, 0.5).unwrap();
        assert_eq!(k.pending_wakeups(), 1);
        assert_eq!(k.next_ready(Tick(10_000)), Some(p));
        assert_eq!(k.pending_wakeups(), 0);
        assert_eq!(k.now(), Tick(1800));
    }

    #[test]
    fn negative_sleep_is_an_error() {
        let mut k = Kernel::new();
        let p = k.spawn();
        assert!(k.sleep(p, -1.0).is_err());
        assert!(k.schedule_timeout(-0.1).is_err());
    }

    #[test]
    fn deadline_is_exclusive_and_clock_lands_on_it() {
        let mut k = Kernel::new();
        let p = k.spawn();
        k.next_ready(Tick(10));
        k.sleep(p, 1.0).unwrap(); // due at 3600
        assert_eq!(k.next_ready(Tick(3600)), None);
        assert_eq!(k.now(), Tick(3600));
        assert_eq!(k.next_ready(Tick(3601)), Some(p));
    }
}

#[cfg(test)]
mod events {
    use super::*;

    #[test]
    fn waiters_resume_in_registration_order() {
        let mut k = Kernel::new();
        let ev = k.event();
        let a = ProcessId(10);
        let b = ProcessId(11);
        assert!(k.wait(b, ev).unwrap());
        assert!(k.wait(a, ev).unwrap());
        assert!(k.succeed(ev));
        assert_eq!(settle(&mut k), vec![(Tick(0), b), (Tick(0), a)]);
        assert!(k.is_processed(ev));
    }

    #[test]
    fn trigger_is_idempotent() {
        let mut k = Kernel::new();
        let ev = k.event();
        let p = ProcessId(0);
        k.wait(p, ev).unwrap();
        assert!(k.succeed(ev));
        assert!(!k.succeed(ev));
        assert_eq!(settle(&mut k).len(), 1);
        assert!(!k.succeed(ev));
        assert_eq!(settle(&mut k).len(), 0);
    }

    #[test]
    fn waiting_on_processed_event_does_not_suspend() {
        let mut k = Kernel::new();
        let ev = k.event();
        k.succeed(ev);
        settle(&mut k);
        assert!(!k.wait(ProcessId(0), ev).unwrap());
    }

    #[test]
    fn rearm_orphans_old_waiters() {
        let mut k = Kernel::new();
        let old = k.event();
        k.wait(ProcessId(0), old).unwrap();
        let live = k.live_events();
        let new = k.rearm(old);
        assert_ne!(old, new);
        assert_eq!(k.live_events(), live);
        assert!(!k.succeed(old));
        assert!(k.wait(ProcessId(0), old).is_err());
        k.succeed(new);
        assert!(settle(&mut k).is_empty());
    }

    #[test]
    fn timeout_fires_after_duration() {
        let mut k = Kernel::new();
        let t = k.schedule_timeout(0.25).unwrap();
        k.wait(ProcessId(3), t).unwrap();
        assert_eq!(drain(&mut k, Tick(100_000)), vec![(Tick(900), ProcessId(3))]);
    }
}

#[cfg(test)]
mod conditions {
    use super::*;

    #[test]
    fn all_of_needs_every_constituent() {
        let mut k = Kernel::new();
        let a = k.event();
        let b = k.event();
        let both = k.all_of(&[a, b]).unwrap();
        k.wait(ProcessId(0), both).unwrap();

        k.succeed(a);
        assert!(settle(&mut k).is_empty());
        assert!(!k.is_triggered(both));

        k.succeed(b);
        assert_eq!(settle(&mut k), vec![(Tick(1), ProcessId(0))]);
    }

    #[test]
    fn any_of_needs_one() {
        let mut k = Kernel::new();
        let a = k.event();
        let b = k.event();
        let either = k.any_of(&[a, b]).unwrap();
        k.wait(ProcessId(0), either).unwrap();
        k.succeed(b);
        assert_eq!(settle(&mut k), vec![(Tick(0), ProcessId(0))]);
    }

    #[test]
    fn already_processed_constituents_count() {
        let mut k = Kernel::new();
        let a = k.event();
        let b = k.event();
        k.succeed(a);
        settle(&mut k);
        let both = k.all_of(&[a, b]).unwrap();
        assert!(!k.is_triggered(both));
        k.succeed(b);
        settle(&mut k);
        assert!(k.is_processed(both));
    }

    #[test]
    fn empty_condition_is_immediately_satisfied() {
        let mut k = Kernel::new();
        let none = k.all_of(&[]).unwrap();
        assert!(k.is_triggered(none));
    }

    #[test]
    fn unknown_constituent_is_an_error() {
        let mut k = Kernel::new();
        let a = k.event();
        k.retire(a);
        assert!(k.all_of(&[a]).is_err());
    }
}

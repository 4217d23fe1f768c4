#![forbid(unsafe_code)]

//! Deterministic one-shot timer queue.
//!
//! Timers are ordered by deadline, then by the order they were scheduled.
//! Nothing here reads the clock: callers pass `now` explicitly, which keeps
//! every schedule reproducible in tests.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer<M> {
    pub id: TimerId,
    pub deadline: Instant,
    pub msg: M,
}

/// Fire-once, cancellable timers carrying a message each.
#[derive(Debug)]
pub struct TimerQueue<M> {
    next_seq: u64,
    by_deadline: BTreeMap<(Instant, u64), M>,
    deadlines: HashMap<TimerId, Instant>,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> TimerQueue<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            by_deadline: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedule `msg` to fire at `deadline`.
    pub fn schedule_at(&mut self, deadline: Instant, msg: M) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.by_deadline.insert((deadline, seq), msg);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer. Returns its message, or `None` when the timer
    /// already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> Option<M> {
        let deadline = self.deadlines.remove(&id)?;
        self.by_deadline.remove(&(deadline, id.0))
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<FiredTimer<M>> {
        let (&(deadline, seq), _) = self.by_deadline.first_key_value()?;
        if deadline > now {
            return None;
        }
        let msg = self.by_deadline.remove(&(deadline, seq))?;
        let id = TimerId(seq);
        self.deadlines.remove(&id);
        Some(FiredTimer { id, deadline, msg })
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.by_deadline.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.by_deadline.clear();
        self.deadlines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_deadline.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_deadline.is_empty()
    }
}

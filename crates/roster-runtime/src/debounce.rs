#![forbid(unsafe_code)]

//! Debounce gate: holds back a changing value until it has been stable for
//! a quiet period.
//!
//! Every [`Debouncer::input`] supersedes the one before it and returns a
//! [`DebounceTicket`]. Only the newest ticket can settle the value; older
//! tickets, and every ticket issued before [`Debouncer::cancel`], are stale
//! and settle nothing.
//!
//! The gate can be driven two ways:
//!
//! - by an external timer that delivers the ticket after `delay`
//!   ([`Debouncer::fire`]), which is how [`crate::list::CustomerList`] uses it;
//! - by polling with explicit instants ([`Debouncer::input_at`] and
//!   [`Debouncer::poll_at`]).

use std::time::{Duration, Instant};

use roster_core::config::DEFAULT_DEBOUNCE_MS;

/// Identifies one input to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket {
    seq: u64,
}

impl DebounceTicket {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    seq: u64,
    deadline: Option<Instant>,
}

/// Trailing-edge debouncer over values of type `T`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    output: T,
    pending: Option<Pending<T>>,
    seq: u64,
}

impl<T: Default + Clone + PartialEq> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(T::default(), Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Gate whose output starts at `initial`.
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            output: initial,
            pending: None,
            seq: 0,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Last settled value.
    #[must_use]
    pub fn output(&self) -> &T {
        &self.output
    }

    /// Value waiting for the quiet period to elapse.
    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Deadline of the pending value, when driven by [`Self::input_at`].
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(|p| p.deadline)
    }

    /// Record a new input, superseding any pending one.
    pub fn input(&mut self, value: T) -> DebounceTicket {
        self.push(value, None)
    }

    /// Record a new input at `now`; it settles at `now + delay`.
    pub fn input_at(&mut self, value: T, now: Instant) -> DebounceTicket {
        self.push(value, Some(now + self.delay))
    }

    fn push(&mut self, value: T, deadline: Option<Instant>) -> DebounceTicket {
        self.seq += 1;
        self.pending = Some(Pending {
            value,
            seq: self.seq,
            deadline,
        });
        DebounceTicket { seq: self.seq }
    }

    /// Whether `ticket` is the newest input and still pending.
    #[must_use]
    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        self.pending.as_ref().is_some_and(|p| p.seq == ticket.seq)
    }

    /// Settle the pending value if `ticket` is current.
    ///
    /// Returns the new output only when it differs from the previous one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> Option<T> {
        if !self.is_current(ticket) {
            return None;
        }
        let pending = self.pending.take()?;
        self.settle(pending.value)
    }

    /// Settle the pending value if its deadline has passed.
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match self.pending.as_ref().and_then(|p| p.deadline) {
            Some(deadline) if now >= deadline => {
                let pending = self.pending.take()?;
                self.settle(pending.value)
            }
            _ => None,
        }
    }

    fn settle(&mut self, value: T) -> Option<T> {
        if value == self.output {
            return None;
        }
        self.output = value.clone();
        Some(value)
    }

    /// Drop the pending value; every outstanding ticket becomes stale.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.seq += 1;
    }
}

//! Property-based invariant tests for the timer queue and debounce gate.
//!
//! 1. Timers fire in (deadline, scheduling order) order.
//! 2. Cancelled timers never fire; every other timer fires exactly once.
//! 3. The debounce gate emits a value only after a full quiet period, and
//!    each emitted value is the last input before that period.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use roster_runtime::{Debouncer, TimerQueue};

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Timer ordering and cancellation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn timers_fire_sorted_and_once(
        timers in prop::collection::vec((0u64..500, any::<bool>()), 0..60),
    ) {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut expected = Vec::new();
        for (idx, &(offset, cancel)) in timers.iter().enumerate() {
            let id = queue.schedule_at(t0 + Duration::from_millis(offset), idx);
            if cancel {
                prop_assert_eq!(queue.cancel(id), Some(idx));
            } else {
                expected.push((offset, idx));
            }
        }
        expected.sort();

        let fired: Vec<(u64, usize)> = std::iter::from_fn(|| queue.pop_due(t0 + Duration::from_secs(1)))
            .map(|t| ((t.deadline - t0).as_millis() as u64, t.msg))
            .collect();
        prop_assert_eq!(fired, expected);
        prop_assert!(queue.is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Debounce quiet period
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn debounce_emits_after_quiet_period(
        gaps in prop::collection::vec(0u64..400, 1..20),
    ) {
        let delay = Duration::from_millis(250);
        let t0 = Instant::now();
        let mut gate = Debouncer::new(0usize, delay);
        let mut now = t0;
        let mut emitted = Vec::new();
        let mut expected = Vec::new();

        for (idx, gap) in gaps.iter().enumerate() {
            // Before the next input lands, anything quiet for `delay` settles.
            if idx > 0 {
                let settle_at = now + delay;
                let next = now + Duration::from_millis(*gap);
                if next >= settle_at {
                    expected.push(idx);
                }
                if let Some(v) = gate.poll_at(next) {
                    emitted.push(v);
                }
                now = next;
            }
            gate.input_at(idx + 1, now);
        }
        if let Some(v) = gate.poll_at(now + delay) {
            emitted.push(v);
        }
        expected.push(gaps.len());

        prop_assert_eq!(emitted, expected);
    }
}

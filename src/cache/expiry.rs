//! Expiry Queue Module
//!
//! Keeps every armed expiration timer in one min-heap ordered by deadline.
//! A single worker drains the queue instead of running one task per entry.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::cache::Slot;

// == Timer Id ==
/// Identifies one arming of an entry's expiration timer.
///
/// Ids are never reused, so a record whose id no longer matches the entry
/// in its slot belongs to a cancelled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[cfg(test)]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A scheduled firing. Field order gives the heap its ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    deadline: Instant,
    id: TimerId,
    slot: Slot,
}

// == Expiry Queue ==
/// Min-heap of armed timers.
///
/// Cancellation is lazy: cancelled records stay queued until they come due
/// or the owner compacts the queue with [`ExpiryQueue::retain`].
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<Timer>>,
    next_id: u64,
}

impl ExpiryQueue {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Issue ==
    /// Reserves a fresh timer id.
    pub fn issue(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    // == Schedule ==
    /// Queues timer `id` to fire for `slot` at `deadline`.
    pub fn schedule(&mut self, id: TimerId, slot: Slot, deadline: Instant) {
        self.heap.push(Reverse(Timer { deadline, id, slot }));
    }

    // == Arm ==
    /// Issues and schedules a timer in one step.
    pub fn arm(&mut self, slot: Slot, deadline: Instant) -> TimerId {
        let id = self.issue();
        self.schedule(id, slot, deadline);
        id
    }

    // == Pop Due ==
    /// Removes the earliest timer if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, Slot)> {
        let Reverse(next) = self.heap.peek()?;
        if next.deadline > now {
            return None;
        }
        self.heap.pop().map(|Reverse(timer)| (timer.id, timer.slot))
    }

    // == Next Deadline ==
    /// Returns the earliest queued deadline, cancelled records included.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(timer)| timer.deadline)
    }

    // == Retain ==
    /// Drops every record for which `live(id, slot)` is false.
    pub fn retain(&mut self, mut live: impl FnMut(TimerId, Slot) -> bool) {
        self.heap.retain(|Reverse(timer)| live(timer.id, timer.slot));
    }

    /// Number of queued records, cancelled ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    // == Clear ==
    /// Cancels every queued timer. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

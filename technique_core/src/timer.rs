//! Logical-time timer queue.
//!
//! Every deferred transition in the controller (deactivation, regeneration
//! ticks, combo reset, gesture cooldown, auto-cast cycles) is an entry here.
//! Entries fire in `(due, scheduling order)` order, so two timers due at the
//! same millisecond fire in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::clock::Millis;

/// Handle returned by [`TimerQueue::schedule`], used to cancel a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<T> {
    due:  Millis,
    id:   u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: BinaryHeap is a max-heap and we want the earliest entry on top.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.id.cmp(&self.id))
    }
}

/// Min-ordered queue of pending tasks.
pub struct TimerQueue<T> {
    heap:    BinaryHeap<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        TimerQueue { heap: BinaryHeap::new(), next_id: 0 }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self { Self::default() }

    /// Schedule `task` to fire at absolute time `due`.
    pub fn schedule(&mut self, due: Millis, task: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Entry { due, id, task });
        TimerId(id)
    }

    /// Remove a pending timer.  Returns false when it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, timer: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|e| e.id != timer.0);
        self.heap.len() != before
    }

    pub fn is_pending(&self, timer: TimerId) -> bool {
        self.heap.iter().any(|e| e.id == timer.0)
    }

    /// Pop the earliest timer if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, T)> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|e| (e.due, e.task))
    }

    pub fn len(&self) -> usize { self.heap.len() }

    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// Iterate pending tasks in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|e| &e.task)
    }
}

//! Combo tracker: consecutive gesture activations within a rolling window.

use crate::clock::Millis;
use crate::timer::TimerId;

/// Counts gesture-sourced activations that land within `window_ms` of the
/// previous one.  The controller owns the reset timer; the tracker only
/// remembers its handle so it can be cancelled and replaced.
#[derive(Debug, Clone)]
pub struct ComboTracker {
    window_ms:   Millis,
    count:       u32,
    last_at:     Option<Millis>,
    reset_timer: Option<TimerId>,
}

impl ComboTracker {
    pub fn new(window_ms: Millis) -> Self {
        ComboTracker { window_ms, count: 0, last_at: None, reset_timer: None }
    }

    pub fn count(&self) -> u32 { self.count }

    /// Time of the most recent gesture activation.
    pub fn last_gesture_at(&self) -> Option<Millis> { self.last_at }

    /// Record a gesture activation at `now` and return the new count.
    pub fn register(&mut self, now: Millis) -> u32 {
        let chained = self
            .last_at
            .is_some_and(|last| now.saturating_sub(last) < self.window_ms);
        self.count = if chained { self.count + 1 } else { 1 };
        self.last_at = Some(now);
        self.count
    }

    /// Drop the count to zero.  Returns true when it changed.
    pub fn reset(&mut self) -> bool {
        self.reset_timer = None;
        let changed = self.count != 0;
        self.count = 0;
        changed
    }

    /// Hand back the pending reset timer so the caller can cancel it.
    pub fn take_reset_timer(&mut self) -> Option<TimerId> {
        self.reset_timer.take()
    }

    pub fn set_reset_timer(&mut self, timer: TimerId) {
        self.reset_timer = Some(timer);
    }
}

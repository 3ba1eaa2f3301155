//! Time sources for the controller.
//!
//! All controller timing is expressed in whole milliseconds on a monotonic
//! logical timeline.  The application uses [`MonotonicClock`]; tests use
//! [`ManualClock`] and move time forward explicitly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds on the controller's timeline.
pub type Millis = u64;

/// Anything that can report the current logical time.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self { Self::new() }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock.  Clones share the same timeline, so a test can keep
/// one handle and give another to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self { Self::default() }

    pub fn starting_at(ms: Millis) -> Self {
        ManualClock { now: Rc::new(Cell::new(ms)) }
    }

    /// Move time forward by `ms`.
    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }

    /// Jump to an absolute time.  Time never runs backwards.
    pub fn set(&self, ms: Millis) {
        self.now.set(self.now.get().max(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis { self.now.get() }
}

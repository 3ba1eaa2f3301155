//! Autonomous caster: random activations on a randomized timer.
//!
//! The loop is a chain of self-rescheduling timer tasks.  The enabled flag
//! is read only when a cycle fires, so turning auto-cast off leaves the one
//! pending cycle in the queue; it fires, sees the flag, and ends the chain.

use rand::Rng;

use crate::clock::Millis;
use crate::technique::TechniqueId;
use crate::timer::TimerId;

/// Uniform choice among the five techniques.
pub fn pick_technique<R: Rng + ?Sized>(rng: &mut R) -> TechniqueId {
    TechniqueId::ALL[rng.random_range(0..TechniqueId::ALL.len())]
}

/// Uniform delay in `[min_ms, max_ms)`.  A degenerate range yields `min_ms`.
pub fn next_delay<R: Rng + ?Sized>(rng: &mut R, min_ms: Millis, max_ms: Millis) -> Millis {
    if min_ms >= max_ms {
        return min_ms;
    }
    rng.random_range(min_ms..max_ms)
}

/// Loop bookkeeping; timers themselves live in the controller's queue.
#[derive(Debug, Default, Clone)]
pub struct AutoCaster {
    enabled: bool,
    pending: Option<TimerId>,
}

impl AutoCaster {
    pub fn new() -> Self { Self::default() }

    pub fn is_enabled(&self) -> bool { self.enabled }

    /// Flip the flag and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Called when a cycle timer fires.  Clears the pending handle and
    /// reports whether this cycle should cast.
    pub fn begin_cycle(&mut self) -> bool {
        self.pending = None;
        self.enabled
    }

    /// Remember the next cycle's timer, returning any previous one so the
    /// caller can cancel it.
    pub fn replace_pending(&mut self, timer: TimerId) -> Option<TimerId> {
        self.pending.replace(timer)
    }

    pub fn take_pending(&mut self) -> Option<TimerId> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn delays_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let d = next_delay(&mut rng, 4000, 7000);
            assert!((4000..7000).contains(&d), "delay {d} out of range");
        }
    }

    #[test]
    fn degenerate_range_is_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(next_delay(&mut rng, 500, 500), 500);
    }

    #[test]
    fn every_technique_gets_picked() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 5];
        for _ in 0..200 {
            seen[pick_technique(&mut rng).index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn disabled_cycle_does_not_cast() {
        let mut c = AutoCaster::new();
        assert!(c.toggle());
        assert!(c.begin_cycle());
        assert!(!c.toggle());
        assert!(!c.begin_cycle());
    }
}

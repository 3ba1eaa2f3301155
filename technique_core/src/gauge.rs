//! Cursed-energy gauge: bounded bookkeeping, no timing.

/// Upper bound of the gauge.
pub const MAX_ENERGY: u32 = 100;

/// Bounded resource in `[0, MAX_ENERGY]`.
///
/// The gauge never schedules anything itself; the controller decides when to
/// deduct and when to regenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyGauge {
    value: u32,
}

impl Default for EnergyGauge {
    fn default() -> Self { EnergyGauge::full() }
}

impl EnergyGauge {
    pub fn full() -> Self {
        EnergyGauge { value: MAX_ENERGY }
    }

    /// Gauge starting at `value`, clamped into range.
    pub fn with_value(value: u32) -> Self {
        EnergyGauge { value: value.min(MAX_ENERGY) }
    }

    pub fn value(&self) -> u32 { self.value }

    /// Fill ratio in `0.0..=1.0` for presentation.
    pub fn fraction(&self) -> f32 {
        self.value as f32 / MAX_ENERGY as f32
    }

    pub fn is_full(&self) -> bool { self.value >= MAX_ENERGY }

    /// True when at least `minimum` energy is available.
    pub fn can_afford(&self, minimum: u32) -> bool {
        self.value >= minimum
    }

    /// Remove `cost`, flooring at zero.  Returns the new value.
    pub fn deduct(&mut self, cost: u32) -> u32 {
        self.value = self.value.saturating_sub(cost);
        self.value
    }

    /// Add `step`, capping at [`MAX_ENERGY`].  Returns the new value.
    pub fn regenerate(&mut self, step: u32) -> u32 {
        self.value = self.value.saturating_add(step).min(MAX_ENERGY);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduct_floors_at_zero() {
        let mut g = EnergyGauge::with_value(10);
        assert_eq!(g.deduct(35), 0);
        assert_eq!(g.deduct(5), 0);
    }

    #[test]
    fn regenerate_caps_at_max() {
        let mut g = EnergyGauge::with_value(98);
        assert_eq!(g.regenerate(1), 99);
        assert_eq!(g.regenerate(5), MAX_ENERGY);
        assert!(g.is_full());
    }

    #[test]
    fn with_value_clamps() {
        assert_eq!(EnergyGauge::with_value(250).value(), MAX_ENERGY);
    }

    #[test]
    fn fraction_and_afford() {
        let g = EnergyGauge::with_value(50);
        assert!((g.fraction() - 0.5).abs() < 1e-6);
        assert!(g.can_afford(5));
        assert!(!EnergyGauge::with_value(4).can_afford(5));
    }
}

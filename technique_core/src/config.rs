//! Controller tuning.
//!
//! Defaults reproduce the showcase's stock timing.  Every field can be
//! overridden from a TOML table; missing fields keep their defaults.

use serde::Deserialize;

use crate::clock::Millis;
use crate::error::ConfigError;
use crate::gauge::MAX_ENERGY;
use crate::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Quiet period after an activation before energy starts refilling.
    pub regen_delay_ms:      Millis,
    /// Period of the refill tick.
    pub regen_interval_ms:   Millis,
    /// Energy added per refill tick.
    pub regen_step:          u32,
    /// Activations are refused below this much energy.
    pub min_energy:          u32,
    pub combo_window_ms:     Millis,
    /// Added to a technique's duration to form the gesture cooldown.
    pub gesture_cooldown_ms: Millis,
    pub history_capacity:    usize,
    /// Auto-cast delay is sampled from `[auto_cast_min_ms, auto_cast_max_ms)`.
    pub auto_cast_min_ms:    Millis,
    pub auto_cast_max_ms:    Millis,
    pub shake_duration_ms:   Millis,
    /// Fixed RNG seed for reproducible auto-cast runs.
    pub seed:                Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            regen_delay_ms:      2000,
            regen_interval_ms:   100,
            regen_step:          1,
            min_energy:          5,
            combo_window_ms:     3000,
            gesture_cooldown_ms: 1000,
            history_capacity:    DEFAULT_HISTORY_CAPACITY,
            auto_cast_min_ms:    4000,
            auto_cast_max_ms:    7000,
            shake_duration_ms:   400,
            seed:                None,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regen_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "regen_interval_ms" });
        }
        if self.regen_step == 0 {
            return Err(ConfigError::Zero { field: "regen_step" });
        }
        if self.combo_window_ms == 0 {
            return Err(ConfigError::Zero { field: "combo_window_ms" });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Zero { field: "history_capacity" });
        }
        if self.auto_cast_min_ms >= self.auto_cast_max_ms {
            return Err(ConfigError::EmptyDelayRange {
                min: self.auto_cast_min_ms,
                max: self.auto_cast_max_ms,
            });
        }
        if self.min_energy > MAX_ENERGY {
            return Err(ConfigError::MinEnergyTooHigh(self.min_energy));
        }
        Ok(())
    }

    /// Same config with a fixed seed.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: ControllerConfig = toml::from_str("combo_window_ms = 2500\nseed = 7").unwrap();
        assert_eq!(cfg.combo_window_ms, 2500);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.regen_delay_ms, 2000);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<ControllerConfig>("regen_speed = 3").is_err());
    }

    #[test]
    fn empty_delay_range_rejected() {
        let cfg = ControllerConfig { auto_cast_min_ms: 5000, auto_cast_max_ms: 5000, ..Default::default() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyDelayRange { min: 5000, max: 5000 }),
        );
    }

    #[test]
    fn zero_interval_rejected() {
        let cfg = ControllerConfig { regen_interval_ms: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Zero { field: "regen_interval_ms" }));
    }

    #[test]
    fn min_energy_bound() {
        let cfg = ControllerConfig { min_energy: 101, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::MinEnergyTooHigh(101)));
    }
}

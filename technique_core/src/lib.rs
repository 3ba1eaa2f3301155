//! # technique_core
//!
//! Activation state machine for the technique showcase: five timed visual
//! techniques competing for one energy gauge, triggered by clicks, keys,
//! hand gestures or an autonomous caster.
//!
//! The crate is renderer-agnostic.  [`Controller`] queues
//! [`EffectCommand`]s and [`Notice`]s; the host drains and realises them.
//! Time comes from a [`Clock`], so everything here is testable with
//! [`ManualClock`].
//!
//! ## Techniques
//!
//! | Key | Technique | Cost | Duration | Gesture |
//! |---|---|---|---|---|
//! | `1` | Infinity | 5 | 3000 ms | both hands raised |
//! | `2` | Blue | 15 | 2000 ms | left index pointed at camera |
//! | `3` | Red | 20 | 2000 ms | right index pointed at camera |
//! | `4` | Hollow Purple | 35 | 3000 ms | hands together |
//! | `5` | Domain Expansion | 50 | 5000 ms | hands raised wide apart |
//!
//! ## Rules
//!
//! * Activation needs at least 5 energy; cost is deducted down to zero.
//! * Re-requesting the playing technique is ignored, except from auto-cast.
//! * Energy refills +1 per 100 ms, starting 2 s after an activation that finds
//!   no refill running; later activations leave a running refill alone.
//! * Gesture activations within 3 s of each other build a combo.
//! * After a gesture fires, gestures are ignored for its duration + 1 s.

pub mod caster;
pub mod clock;
pub mod combo;
pub mod config;
pub mod controller;
pub mod effect;
pub mod error;
pub mod gauge;
pub mod gesture;
pub mod history;
pub mod technique;
pub mod timer;

pub use clock::{Clock, ManualClock, Millis, MonotonicClock};
pub use config::ControllerConfig;
pub use controller::{Activation, ActivationResult, Controller, GestureOutcome};
pub use effect::{EffectCommand, EffectSink, Notice};
pub use error::{ConfigError, DetectionError, Rejection};
pub use gauge::{EnergyGauge, MAX_ENERGY};
pub use gesture::{classify, GestureSnapshot, Hand, Handedness, Landmark};
pub use history::{ActivationHistory, ActivationRecord};
pub use technique::{ActivationSource, FlashColor, TechniqueDefinition, TechniqueId};

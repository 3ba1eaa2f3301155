//! Error types.
//!
//! None of these is fatal to the controller.  Rejections come back from
//! `activate` as values; detection failures only disable the gesture path.

use std::path::PathBuf;

use thiserror::Error;

use crate::technique::TechniqueId;

/// Why an activation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{0} is already active")]
    AlreadyActive(TechniqueId),
    #[error("insufficient energy: {available} available, {required} required")]
    InsufficientEnergy { available: u32, required: u32 },
}

/// The gesture detector could not deliver frames.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("cannot open landmark feed {path}")]
    FeedUnreadable {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed landmark frame on line {line}: {reason}")]
    MalformedFrame { line: usize, reason: String },
}

/// A controller configuration value is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },
    #[error("auto-cast delay range is empty: min {min} ms >= max {max} ms")]
    EmptyDelayRange { min: u64, max: u64 },
    #[error("`min_energy` {0} exceeds the gauge maximum")]
    MinEnergyTooHigh(u32),
}

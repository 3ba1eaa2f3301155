//! The five techniques and their static definitions.
//!
//! Definitions are `'static` data: nothing here is mutated after startup.
//! Look one up with [`TechniqueId::definition`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// TechniqueId
// ════════════════════════════════════════════════════════════════════════════

/// Identifier of one of the five predefined techniques.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechniqueId {
    Infinity,
    Blue,
    Red,
    Purple,
    Domain,
}

impl TechniqueId {
    /// All techniques in card / keyboard order (keys 1–5).
    pub const ALL: [TechniqueId; 5] = [
        TechniqueId::Infinity,
        TechniqueId::Blue,
        TechniqueId::Red,
        TechniqueId::Purple,
        TechniqueId::Domain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TechniqueId::Infinity => "infinity",
            TechniqueId::Blue     => "blue",
            TechniqueId::Red      => "red",
            TechniqueId::Purple   => "purple",
            TechniqueId::Domain   => "domain",
        }
    }

    /// Static definition for this technique.
    pub fn definition(self) -> &'static TechniqueDefinition {
        match self {
            TechniqueId::Infinity => &INFINITY,
            TechniqueId::Blue     => &BLUE,
            TechniqueId::Red      => &RED,
            TechniqueId::Purple   => &PURPLE,
            TechniqueId::Domain   => &DOMAIN,
        }
    }

    /// Technique bound to a keyboard digit (`1`–`5`).
    pub fn from_digit(digit: u8) -> Option<TechniqueId> {
        TechniqueId::ALL.into_iter().find(|t| t.definition().key == digit)
    }

    /// Position of this technique in [`TechniqueId::ALL`].
    pub fn index(self) -> usize {
        match self {
            TechniqueId::Infinity => 0,
            TechniqueId::Blue     => 1,
            TechniqueId::Red      => 2,
            TechniqueId::Purple   => 3,
            TechniqueId::Domain   => 4,
        }
    }
}

impl fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ActivationSource
// ════════════════════════════════════════════════════════════════════════════

/// Where an activation request came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationSource {
    /// Card click, keyboard shortcut or the random trigger.
    Manual,
    /// The gesture classifier.
    Gesture,
    /// The autonomous caster.
    Auto,
}

impl ActivationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivationSource::Manual  => "manual",
            ActivationSource::Gesture => "gesture",
            ActivationSource::Auto    => "auto",
        }
    }
}

impl fmt::Display for ActivationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FlashColor
// ════════════════════════════════════════════════════════════════════════════

/// Color tag of the full-screen flash some techniques open with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashColor {
    Blue,
    Red,
    Purple,
    White,
}

impl FlashColor {
    /// Packed `0xRRGGBB` value the renderer should use for this tag.
    pub fn rgb(self) -> u32 {
        match self {
            FlashColor::Blue   => 0x0066FF,
            FlashColor::Red    => 0xFF3366,
            FlashColor::Purple => 0x9C27B0,
            FlashColor::White  => 0xFFFFFF,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TechniqueDefinition
// ════════════════════════════════════════════════════════════════════════════

/// Immutable description of a technique.
#[derive(Debug, PartialEq)]
pub struct TechniqueDefinition {
    pub id:             TechniqueId,
    /// Overlay title.
    pub name:           &'static str,
    /// Overlay glyph (kanji).
    pub glyph:          &'static str,
    /// Packed `0xRRGGBB`.
    pub color:          u32,
    pub duration_ms:    u64,
    pub cost:           u32,
    pub shake:          u32,
    pub flash:          Option<FlashColor>,
    pub slow_motion_ms: Option<u64>,
    /// Indicator text shown when the classifier recognises this technique.
    pub gesture_label:  &'static str,
    /// Keyboard digit that triggers the technique.
    pub key:            u8,
}

static INFINITY: TechniqueDefinition = TechniqueDefinition {
    id:             TechniqueId::Infinity,
    name:           "INFINITY",
    glyph:          "無下限",
    color:          0x00FFFF,
    duration_ms:    3000,
    cost:           5,
    shake:          5,
    flash:          None,
    slow_motion_ms: None,
    gesture_label:  "INFINITY DETECTED!",
    key:            1,
};

static BLUE: TechniqueDefinition = TechniqueDefinition {
    id:             TechniqueId::Blue,
    name:           "CURSED TECHNIQUE: BLUE",
    glyph:          "蒼",
    color:          0x0066FF,
    duration_ms:    2000,
    cost:           15,
    shake:          10,
    flash:          Some(FlashColor::Blue),
    slow_motion_ms: None,
    gesture_label:  "CURSED BLUE DETECTED!",
    key:            2,
};

static RED: TechniqueDefinition = TechniqueDefinition {
    id:             TechniqueId::Red,
    name:           "REVERSAL: RED",
    glyph:          "赫",
    color:          0xFF3366,
    duration_ms:    2000,
    cost:           20,
    shake:          12,
    flash:          Some(FlashColor::Red),
    slow_motion_ms: None,
    gesture_label:  "CURSED RED DETECTED!",
    key:            3,
};

static PURPLE: TechniqueDefinition = TechniqueDefinition {
    id:             TechniqueId::Purple,
    name:           "HOLLOW PURPLE",
    glyph:          "茈",
    color:          0x9C27B0,
    duration_ms:    3000,
    cost:           35,
    shake:          20,
    flash:          Some(FlashColor::Purple),
    slow_motion_ms: Some(1500),
    gesture_label:  "HOLLOW PURPLE DETECTED!",
    key:            4,
};

static DOMAIN: TechniqueDefinition = TechniqueDefinition {
    id:             TechniqueId::Domain,
    name:           "DOMAIN EXPANSION",
    glyph:          "無量空処",
    color:          0xFFFFFF,
    duration_ms:    5000,
    cost:           50,
    shake:          25,
    flash:          Some(FlashColor::White),
    slow_motion_ms: Some(2000),
    gesture_label:  "DOMAIN EXPANSION DETECTED!",
    key:            5,
};

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

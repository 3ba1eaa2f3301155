//! Outbound vocabulary of the controller.
//!
//! The controller never draws anything.  It queues [`EffectCommand`]s for the
//! renderer and [`Notice`]s for the status indicator; the host drains both
//! after every entry-point call or `poll()`.

use std::fmt;

use crate::clock::Millis;
use crate::technique::{ActivationSource, FlashColor, TechniqueId};

// ════════════════════════════════════════════════════════════════════════════
// EffectCommand
// ════════════════════════════════════════════════════════════════════════════

/// Fire-and-forget instruction for the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectCommand {
    /// Start the technique's visual sequence.
    PlayEffect { technique: TechniqueId, duration_ms: Millis },
    /// Tear the technique's visuals back down.
    ResetEffect { technique: TechniqueId },
    /// Camera shake, decaying over `duration_ms`.
    Shake { intensity: u32, duration_ms: Millis },
    /// Brief full-screen flash.
    Flash(FlashColor),
    /// Dramatic brightness/contrast boost for `duration_ms`.
    SlowMotion { duration_ms: Millis },
    ShowOverlay { name: &'static str, glyph: &'static str },
    HideOverlay,
}

/// Anything that can realise effect commands.
pub trait EffectSink {
    fn apply(&mut self, command: &EffectCommand);

    fn apply_all(&mut self, commands: &[EffectCommand]) {
        for c in commands {
            self.apply(c);
        }
    }
}

impl EffectSink for Vec<EffectCommand> {
    fn apply(&mut self, command: &EffectCommand) {
        self.push(command.clone());
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Notice
// ════════════════════════════════════════════════════════════════════════════

/// Presentation hint for the status indicator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    InsufficientEnergy,
    /// Re-request of the technique already playing.
    AlreadyActive(TechniqueId),
    GestureDetected(TechniqueId),
    /// The detector sees no hands.
    Detecting,
    /// Hands visible, no gesture matched.
    ReadyForInput,
    ComboChanged(u32),
    AutoCastToggled(bool),
    DetectionUnavailable(String),
    Activated { technique: TechniqueId, source: ActivationSource },
    Finished(TechniqueId),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::InsufficientEnergy => f.write_str("INSUFFICIENT ENERGY!"),
            Notice::AlreadyActive(t)   => write!(f, "{} ALREADY ACTIVE", t.definition().name),
            Notice::GestureDetected(t) => f.write_str(t.definition().gesture_label),
            Notice::Detecting          => f.write_str("DETECTING..."),
            Notice::ReadyForInput      => f.write_str("READY FOR INPUT"),
            Notice::ComboChanged(0)    => f.write_str("COMBO RESET"),
            Notice::ComboChanged(n)    => write!(f, "{n}x COMBO!"),
            Notice::AutoCastToggled(true)  => f.write_str("AUTO-CAST MODE ON"),
            Notice::AutoCastToggled(false) => f.write_str("AUTO-CAST MODE OFF"),
            Notice::DetectionUnavailable(reason) => write!(f, "GESTURE INPUT OFF: {reason}"),
            Notice::Activated { technique, source } => {
                write!(f, "{} ({})", technique.definition().name, source)
            }
            Notice::Finished(t) => write!(f, "{} ENDED", t.definition().name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_strings() {
        assert_eq!(Notice::InsufficientEnergy.to_string(), "INSUFFICIENT ENERGY!");
        assert_eq!(Notice::GestureDetected(TechniqueId::Purple).to_string(), "HOLLOW PURPLE DETECTED!");
        assert_eq!(Notice::ComboChanged(3).to_string(), "3x COMBO!");
        assert_eq!(Notice::ComboChanged(0).to_string(), "COMBO RESET");
        assert_eq!(
            Notice::Activated { technique: TechniqueId::Domain, source: ActivationSource::Auto }.to_string(),
            "DOMAIN EXPANSION (auto)",
        );
    }

    #[test]
    fn vec_sink_records_commands() {
        let mut sink: Vec<EffectCommand> = Vec::new();
        sink.apply_all(&[EffectCommand::HideOverlay, EffectCommand::Flash(FlashColor::Red)]);
        assert_eq!(sink.len(), 2);
    }
}

//! Renderer-side visual state.
//!
//! [`VisualState`] is the window's realisation of the controller's effect
//! commands.  It keeps everything in normalised stage coordinates
//! (`0.0..=1.0` on both axes) and advances by wall time in [`VisualState::tick`];
//! the visualizer only reads it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use technique_core::{EffectCommand, EffectSink, TechniqueId};

/// Where the avatar stands, in stage coordinates.
pub const STAGE_CENTER: (f32, f32) = (0.5, 0.42);

const FLASH_MS:        f32 = 300.0;
const OVERLAY_FADE_MS: f32 = 250.0;
/// Particle time scale while slow motion is running.
const SLOW_SCALE:      f32 = 0.35;

/// Opaque ARGB from a packed `0xRRGGBB`.
pub fn argb(rgb: u32) -> u32 { 0xFF000000 | (rgb & 0x00FF_FFFF) }

// ════════════════════════════════════════════════════════════════════════════
// Pieces
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Shake {
    /// Peak offset in pixels.
    pub intensity:    f32,
    pub remaining_ms: f32,
    pub total_ms:     f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flash {
    pub color: u32,
    /// 1.0 at the start, fades to 0.
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub name:      &'static str,
    pub glyph:     &'static str,
    pub alpha:     f32,
    pub fading_out: bool,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x:        f32,
    pub y:        f32,
    /// Stage units per second.
    pub vx:       f32,
    pub vy:       f32,
    pub life_ms:  f32,
    pub max_life: f32,
    pub color:    u32,
}

impl Particle {
    pub fn alpha(&self) -> f32 { (self.life_ms / self.max_life).clamp(0.0, 1.0) }
}

/// The technique whose sequence is currently on stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Playing {
    pub technique:   TechniqueId,
    pub elapsed_ms:  f32,
    pub duration_ms: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// VisualState
// ════════════════════════════════════════════════════════════════════════════

pub struct VisualState {
    pub shake:          Option<Shake>,
    /// Current shake displacement in pixels, resampled each tick.
    pub shake_offset:   (i32, i32),
    pub flash:          Option<Flash>,
    pub slow_motion_ms: f32,
    pub overlay:        Option<Overlay>,
    pub particles:      Vec<Particle>,
    pub playing:        Option<Playing>,
    rng:                StdRng,
}

impl VisualState {
    pub fn new(seed: Option<u64>) -> Self {
        VisualState {
            shake:          None,
            shake_offset:   (0, 0),
            flash:          None,
            slow_motion_ms: 0.0,
            overlay:        None,
            particles:      Vec::new(),
            playing:        None,
            rng: match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None    => StdRng::from_os_rng(),
            },
        }
    }

    pub fn is_slow_motion(&self) -> bool { self.slow_motion_ms > 0.0 }

    /// Pulsing aura around the avatar while a technique plays: (ARGB, 0–1 strength).
    pub fn aura(&self) -> Option<(u32, f32)> {
        let p = self.playing.as_ref()?;
        let pulse = 0.65 + 0.35 * (p.elapsed_ms / 180.0).sin();
        let fade = (1.0 - p.elapsed_ms / p.duration_ms.max(1.0)).clamp(0.2, 1.0);
        Some((argb(p.technique.definition().color), pulse * fade))
    }

    /// Advance all animations by `dt_ms` of wall time.
    pub fn tick(&mut self, dt_ms: f32) {
        // ── shake ────────────────────────────────────────────────────────
        self.shake_offset = (0, 0);
        if let Some(s) = &mut self.shake {
            s.remaining_ms -= dt_ms;
            if s.remaining_ms <= 0.0 {
                self.shake = None;
            } else {
                let amp = s.intensity * s.remaining_ms / s.total_ms;
                self.shake_offset = (
                    self.rng.random_range(-amp..=amp) as i32,
                    self.rng.random_range(-amp..=amp) as i32,
                );
            }
        }

        // ── flash ────────────────────────────────────────────────────────
        if let Some(f) = &mut self.flash {
            f.alpha -= dt_ms / FLASH_MS;
            if f.alpha <= 0.0 { self.flash = None; }
        }

        // ── overlay ──────────────────────────────────────────────────────
        if let Some(o) = &mut self.overlay {
            let step = dt_ms / OVERLAY_FADE_MS;
            if o.fading_out {
                o.alpha -= step;
                if o.alpha <= 0.0 { self.overlay = None; }
            } else {
                o.alpha = (o.alpha + step).min(1.0);
            }
        }

        // ── slow motion stretches particle time ──────────────────────────
        let scale = if self.is_slow_motion() { SLOW_SCALE } else { 1.0 };
        self.slow_motion_ms = (self.slow_motion_ms - dt_ms).max(0.0);

        let dt = dt_ms * scale;
        for p in &mut self.particles {
            p.x += p.vx * dt / 1000.0;
            p.y += p.vy * dt / 1000.0;
            p.life_ms -= dt;
        }
        self.particles.retain(|p| p.life_ms > 0.0);

        if let Some(p) = &mut self.playing {
            p.elapsed_ms += dt_ms;
        }
    }

    // ── particle bursts ──────────────────────────────────────────────────

    fn burst(&mut self, technique: TechniqueId, duration_ms: f32) {
        let (cx, cy) = STAGE_CENTER;
        let color = argb(technique.definition().color);
        let life = duration_ms * 0.6;
        match technique {
            // Slow orbit: the barrier hums around the avatar.
            TechniqueId::Infinity => {
                for i in 0..24 {
                    let a = i as f32 / 24.0 * std::f32::consts::TAU;
                    let r = 0.14;
                    self.spawn(cx + r * a.cos(), cy + r * a.sin(), -0.08 * a.sin(), 0.08 * a.cos(), life, color);
                }
            }
            // Pull inward.
            TechniqueId::Blue => {
                for _ in 0..40 {
                    let a = self.rng.random_range(0.0..std::f32::consts::TAU);
                    let r = self.rng.random_range(0.25..0.4);
                    let speed = r / (life / 1000.0);
                    self.spawn(cx + r * a.cos(), cy + r * a.sin(), -speed * a.cos(), -speed * a.sin(), life, color);
                }
            }
            // Push outward.
            TechniqueId::Red => {
                for _ in 0..40 {
                    let a = self.rng.random_range(0.0..std::f32::consts::TAU);
                    let speed = self.rng.random_range(0.2..0.5);
                    self.spawn(cx, cy, speed * a.cos(), speed * a.sin(), life, color);
                }
            }
            // Both colors spiralling out from the avatar's hands.
            TechniqueId::Purple => {
                let palette = [argb(0x0066FF), argb(0xFF3366), color];
                for i in 0..60 {
                    let a = i as f32 * 0.45;
                    let speed = 0.1 + i as f32 * 0.006;
                    let c = palette[i % palette.len()];
                    self.spawn(cx, cy, speed * a.cos(), speed * a.sin(), life, c);
                }
            }
            // Star field across the whole stage.
            TechniqueId::Domain => {
                for _ in 0..120 {
                    let x = self.rng.random_range(0.0..1.0);
                    let y = self.rng.random_range(0.0..1.0);
                    let drift = self.rng.random_range(-0.02..0.02);
                    self.spawn(x, y, drift, drift * 0.5, duration_ms, color);
                }
            }
        }
    }

    fn spawn(&mut self, x: f32, y: f32, vx: f32, vy: f32, life_ms: f32, color: u32) {
        self.particles.push(Particle { x, y, vx, vy, life_ms, max_life: life_ms, color });
    }
}

impl EffectSink for VisualState {
    fn apply(&mut self, command: &EffectCommand) {
        match *command {
            EffectCommand::PlayEffect { technique, duration_ms } => {
                let duration = duration_ms as f32;
                self.playing = Some(Playing { technique, elapsed_ms: 0.0, duration_ms: duration });
                self.burst(technique, duration);
            }
            EffectCommand::ResetEffect { technique } => {
                if self.playing.as_ref().is_some_and(|p| p.technique == technique) {
                    self.playing = None;
                }
            }
            EffectCommand::Shake { intensity, duration_ms } => {
                let total = (duration_ms as f32).max(1.0);
                self.shake = Some(Shake { intensity: intensity as f32, remaining_ms: total, total_ms: total });
            }
            EffectCommand::Flash(color) => {
                self.flash = Some(Flash { color: argb(color.rgb()), alpha: 1.0 });
            }
            EffectCommand::SlowMotion { duration_ms } => {
                self.slow_motion_ms = duration_ms as f32;
            }
            EffectCommand::ShowOverlay { name, glyph } => {
                self.overlay = Some(Overlay { name, glyph, alpha: 0.0, fading_out: false });
            }
            EffectCommand::HideOverlay => {
                if let Some(o) = &mut self.overlay {
                    o.fading_out = true;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use technique_core::FlashColor;

    fn visuals() -> VisualState { VisualState::new(Some(3)) }

    #[test]
    fn shake_decays_and_stops() {
        let mut v = visuals();
        v.apply(&EffectCommand::Shake { intensity: 25, duration_ms: 400 });
        v.tick(16.0);
        let (dx, dy) = v.shake_offset;
        assert!(dx.abs() <= 25 && dy.abs() <= 25);
        for _ in 0..30 { v.tick(16.0); }
        assert!(v.shake.is_none());
        assert_eq!(v.shake_offset, (0, 0));
    }

    #[test]
    fn flash_fades() {
        let mut v = visuals();
        v.apply(&EffectCommand::Flash(FlashColor::White));
        assert_eq!(v.flash.as_ref().map(|f| f.color), Some(0xFFFFFFFF));
        v.tick(150.0);
        assert!(v.flash.as_ref().is_some_and(|f| f.alpha < 1.0));
        v.tick(200.0);
        assert!(v.flash.is_none());
    }

    #[test]
    fn overlay_fades_in_then_out() {
        let mut v = visuals();
        v.apply(&EffectCommand::ShowOverlay { name: "REVERSAL: RED", glyph: "赫" });
        v.tick(500.0);
        assert_eq!(v.overlay.as_ref().map(|o| o.alpha), Some(1.0));
        v.apply(&EffectCommand::HideOverlay);
        v.tick(100.0);
        assert!(v.overlay.is_some());
        v.tick(200.0);
        assert!(v.overlay.is_none());
    }

    #[test]
    fn reset_only_clears_its_own_technique() {
        let mut v = visuals();
        v.apply(&EffectCommand::PlayEffect { technique: TechniqueId::Domain, duration_ms: 5000 });
        v.apply(&EffectCommand::ResetEffect { technique: TechniqueId::Blue });
        assert!(v.aura().is_some());
        v.apply(&EffectCommand::ResetEffect { technique: TechniqueId::Domain });
        assert!(v.playing.is_none());
        assert!(v.aura().is_none());
    }

    #[test]
    fn every_technique_bursts() {
        for t in TechniqueId::ALL {
            let mut v = visuals();
            v.apply(&EffectCommand::PlayEffect { technique: t, duration_ms: t.definition().duration_ms });
            assert!(!v.particles.is_empty(), "{t} spawned nothing");
        }
    }

    #[test]
    fn particles_expire() {
        let mut v = visuals();
        v.apply(&EffectCommand::PlayEffect { technique: TechniqueId::Red, duration_ms: 2000 });
        for _ in 0..100 { v.tick(16.0); }
        assert!(v.particles.is_empty());
    }

    #[test]
    fn slow_motion_stretches_particle_life() {
        let mut fast = visuals();
        let mut slow = visuals();
        let play = EffectCommand::PlayEffect { technique: TechniqueId::Red, duration_ms: 2000 };
        fast.apply(&play);
        slow.apply(&play);
        slow.apply(&EffectCommand::SlowMotion { duration_ms: 1500 });
        for _ in 0..60 {
            fast.tick(16.0);
            slow.tick(16.0);
        }
        assert!(slow.is_slow_motion());
        assert!(slow.particles[0].life_ms > fast.particles[0].life_ms);
    }
}

//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬──────────────┐
//! │ ENERGY [██████████░░░░]  85            3x COMBO! AUTO│  HISTORY     │
//! │                                                      │              │
//! │              OVERLAY TITLE                           │  red gesture │
//! │                   ( avatar + aura + particles )      │  blue manual │
//! │                                                      │  ...         │
//! │ [1 INFINITY] [2 BLUE] [3 RED] [4 PURPLE] [5 DOMAIN]  │              │
//! │ status bar                                           │              │
//! └──────────────────────────────────────────────────────┴──────────────┘
//! ```

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use technique_core::{ActivationHistory, EnergyGauge, TechniqueId};

use crate::effects::{VisualState, STAGE_CENTER};
use crate::error::ShowcaseError;
use crate::input::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1000;
pub const WIN_H:       usize = 560;
const HISTORY_W:       usize = 200;
const STAGE_W:         usize = WIN_W - HISTORY_W;
const TOP_BAR_H:       usize = 40;
const CARD_W:          usize = 146;
const CARD_H:          usize = 64;
const CARD_GAP:        usize = 10;
const CARDS_Y:         usize = 420;
const STATUS_Y:        usize = WIN_H - 36;
const STAGE_H:         usize = CARDS_Y - TOP_BAR_H;
const BG_COLOR:        u32   = 0xFF0B0B1A;
const PANEL_BG:        u32   = 0xFF14142B;
const TEXT_BG:         u32   = 0xFF1F1F3D;
const ENERGY_COLOR:    u32   = 0xFF7C4DFF;
const ENERGY_EMPTY:    u32   = 0xFF2A2A44;
const SKIN:            u32   = 0xFFF1D6C0;
const HAIR:            u32   = 0xFFF5F5FF;
const UNIFORM:         u32   = 0xFF1C1C30;
const TEXT:            u32   = 0xFFEEEEEE;
const DIM_TEXT:        u32   = 0xFF888899;
const BADGE_COLOR:     u32   = 0xFFFFD700;

/// Everything the visualizer needs for one frame.
pub struct Scene<'a> {
    pub energy:     &'a EnergyGauge,
    /// Minimum energy an activation needs; cards below it are dimmed.
    pub min_energy: u32,
    pub active:     Option<TechniqueId>,
    pub combo:      u32,
    pub auto_cast:  bool,
    pub blindfold:  bool,
    pub status:     &'a str,
    pub history:    &'a ActivationHistory,
    pub visuals:    &'a VisualState,
}

/// Screen rectangle `(x, y, w, h)` of technique card `index`.
pub fn card_rect(index: usize) -> (usize, usize, usize, usize) {
    let total = 5 * CARD_W + 4 * CARD_GAP;
    let x0 = (STAGE_W - total) / 2;
    (x0 + index * (CARD_W + CARD_GAP), CARDS_Y, CARD_W, CARD_H)
}

/// Card under the pointer, if any.
pub fn card_at(x: f32, y: f32) -> Option<usize> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let (px, py) = (x as usize, y as usize);
    (0..TechniqueId::ALL.len()).find(|&i| {
        let (cx, cy, w, h) = card_rect(i);
        px >= cx && px < cx + w && py >= cy && py < cy + h
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:         Window,
    buf:            Vec<u32>,
    sim_tx:         Sender<SimInput>,
    mouse_was_down: bool,
    title_glyph:    Option<&'static str>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, ShowcaseError> {
        let mut window = Window::new(
            "Technique Showcase",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            mouse_was_down: false,
            title_glyph:    None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse and forward them as `SimInput`.  Returns false
    /// when the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let mut keys = Vec::new();

        if pressed(Key::Q) || pressed(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }
        for (key, digit) in [(Key::Key1, 1), (Key::Key2, 2), (Key::Key3, 3), (Key::Key4, 4), (Key::Key5, 5)] {
            if pressed(key) { keys.push(SimKey::Digit(digit)); }
        }
        if pressed(Key::B) { keys.push(SimKey::Blindfold); }
        if pressed(Key::A) { keys.push(SimKey::AutoCast); }
        if pressed(Key::R) { keys.push(SimKey::Random); }

        for key in keys {
            let _ = self.sim_tx.send(SimInput::KeyDown(key));
        }

        // Clicks fire on the press edge only.
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_was_down {
            if let Some(card) = self.window
                .get_mouse_pos(MouseMode::Discard)
                .and_then(|(x, y)| card_at(x, y))
            {
                let _ = self.sim_tx.send(SimInput::CardClicked(card));
            }
        }
        self.mouse_was_down = down;

        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene<'_>) {
        let vis = scene.visuals;
        self.buf.fill(BG_COLOR);

        // ── Stage (shaken) ────────────────────────────────────────────────
        let (sx, sy) = vis.shake_offset;
        if let Some((color, strength)) = vis.aura() {
            self.draw_aura(sx, sy, color, strength);
        }
        self.draw_avatar(sx, sy, scene.blindfold);
        self.draw_particles(vis, sx, sy);

        if vis.is_slow_motion() {
            self.tint_rect(0, TOP_BAR_H, STAGE_W, STAGE_H, 0xFF000000, 0.35);
        }

        // ── Overlay title ─────────────────────────────────────────────────
        if let Some(o) = &vis.overlay {
            let color = blend(BG_COLOR, TEXT, o.alpha);
            let scale = 4;
            let x = STAGE_W.saturating_sub(text_width(o.name, scale)) / 2;
            self.draw_text(o.name, x, TOP_BAR_H + 30, scale, color);
        }
        self.sync_title(vis.overlay.as_ref().map(|o| (o.name, o.glyph)));

        // ── Top bar ───────────────────────────────────────────────────────
        self.fill_rect(0, 0, STAGE_W, TOP_BAR_H, PANEL_BG);
        self.draw_energy(scene.energy);
        if scene.combo > 0 {
            let combo = format!("{}x COMBO!", scene.combo);
            self.draw_text(&combo, STAGE_W - 230, 14, 2, BADGE_COLOR);
        }
        if scene.auto_cast {
            self.fill_rect(STAGE_W - 70, 8, 60, 24, BADGE_COLOR);
            self.draw_text("AUTO", STAGE_W - 56, 14, 2, 0xFF000000);
        }

        // ── Cards ─────────────────────────────────────────────────────────
        for (i, t) in TechniqueId::ALL.into_iter().enumerate() {
            let affordable = scene.energy.can_afford(scene.min_energy);
            self.draw_card(i, t, scene.active == Some(t), affordable);
        }

        // ── History panel ─────────────────────────────────────────────────
        self.draw_history(scene.history);

        // ── Status bar and legend ─────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, STAGE_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_text(scene.status, 10, STATUS_Y + 8, 2, TEXT);
        self.draw_text(
            "1-5/click=cast  R=random  A=auto-cast  B=blindfold  Q=quit",
            10, WIN_H - 10, 1, DIM_TEXT,
        );

        // ── Flash over everything ─────────────────────────────────────────
        if let Some(f) = &vis.flash {
            self.tint_rect(0, 0, WIN_W, WIN_H, f.color, f.alpha * 0.6);
        }

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // The bitmap font is ASCII; kanji glyphs go to the window title.
    fn sync_title(&mut self, overlay: Option<(&'static str, &'static str)>) {
        let glyph = overlay.map(|(_, g)| g);
        if glyph == self.title_glyph { return; }
        self.title_glyph = glyph;
        match overlay {
            Some((name, glyph)) => self.window.set_title(&format!("Technique Showcase — {name} {glyph}")),
            None                => self.window.set_title("Technique Showcase"),
        }
    }

    // ── Stage pieces ──────────────────────────────────────────────────────

    fn stage_point(x: f32, y: f32, sx: i32, sy: i32) -> (isize, isize) {
        (
            (x * STAGE_W as f32) as isize + sx as isize,
            (TOP_BAR_H as f32 + y * STAGE_H as f32) as isize + sy as isize,
        )
    }

    fn draw_avatar(&mut self, sx: i32, sy: i32, blindfold: bool) {
        let (cx, cy) = Self::stage_point(STAGE_CENTER.0, STAGE_CENTER.1, sx, sy);
        // body
        self.fill_rect_i(cx - 40, cy + 30, 80, 110, UNIFORM);
        // head and hair
        self.fill_circle(cx, cy, 30, SKIN);
        self.fill_rect_i(cx - 32, cy - 36, 64, 18, HAIR);
        if blindfold {
            self.fill_rect_i(cx - 31, cy - 8, 62, 12, 0xFF111111);
        } else {
            self.fill_rect_i(cx - 14, cy - 4, 8, 4, 0xFF33CCFF);
            self.fill_rect_i(cx + 6,  cy - 4, 8, 4, 0xFF33CCFF);
        }
    }

    fn draw_aura(&mut self, sx: i32, sy: i32, color: u32, strength: f32) {
        let (cx, cy) = Self::stage_point(STAGE_CENTER.0, STAGE_CENTER.1, sx, sy);
        for ring in 0..6 {
            let r = 60 + ring * 10;
            let t = strength * (1.0 - ring as f32 / 6.0) * 0.5;
            self.ring(cx, cy + 40, r as isize, color, t);
        }
    }

    fn draw_particles(&mut self, vis: &VisualState, sx: i32, sy: i32) {
        for p in &vis.particles {
            let (px, py) = Self::stage_point(p.x, p.y, sx, sy);
            let a = p.alpha();
            for dy in 0..3 {
                for dx in 0..3 {
                    self.blend_pixel(px + dx, py + dy, p.color, a);
                }
            }
        }
    }

    // ── HUD pieces ────────────────────────────────────────────────────────

    fn draw_energy(&mut self, gauge: &EnergyGauge) {
        self.draw_text("ENERGY", 12, 14, 2, TEXT);
        let (x, y, w, h) = (70, 12, 300, 16);
        self.fill_rect(x, y, w, h, ENERGY_EMPTY);
        let filled = (w as f32 * gauge.fraction()) as usize;
        self.fill_rect(x, y, filled, h, ENERGY_COLOR);
        self.draw_border(x, y, w, h, 0xFF000000);
        self.draw_text(&gauge.value().to_string(), x + w + 10, 14, 2, TEXT);
    }

    fn draw_card(&mut self, index: usize, technique: TechniqueId, active: bool, affordable: bool) {
        let def = technique.definition();
        let (x, y, w, h) = card_rect(index);
        let accent = 0xFF000000 | def.color;
        let bg = if active { blend(PANEL_BG, accent, 0.45) } else { PANEL_BG };
        self.fill_rect(x, y, w, h, bg);
        self.draw_border(x, y, w, h, if active { accent } else { blend(PANEL_BG, accent, 0.5) });

        let text = if affordable { TEXT } else { DIM_TEXT };
        self.draw_text(&def.key.to_string(), x + 8, y + 8, 2, accent);
        // Long names keep only the part after the colon.
        let short = def.name.rsplit(": ").next().unwrap_or(def.name);
        self.draw_text(short, x + 8, y + 28, 2, text);
        self.draw_text(&format!("COST {}", def.cost), x + 8, y + 48, 1, DIM_TEXT);
    }

    fn draw_history(&mut self, history: &ActivationHistory) {
        self.fill_rect(STAGE_W, 0, HISTORY_W, WIN_H, PANEL_BG);
        self.draw_text("HISTORY", STAGE_W + 12, 14, 2, BADGE_COLOR);
        let mut y = 44;
        for record in history.iter().rev() {
            let accent = 0xFF000000 | record.technique.definition().color;
            self.fill_rect(STAGE_W + 12, y, 6, 10, accent);
            let line = format!("{} {}", record.technique, record.source);
            self.draw_text(&line, STAGE_W + 24, y + 2, 1, TEXT);
            y += 20;
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// `fill_rect` for shaken coordinates that may fall off-screen.
    fn fill_rect_i(&mut self, x: isize, y: isize, w: isize, h: isize, color: u32) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x + w).max(0) as usize;
        let y1 = (y + h).max(0) as usize;
        self.fill_rect(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0), color);
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn tint_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32, t: f32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                let i = row * WIN_W + col;
                self.buf[i] = blend(self.buf[i], color, t);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, t: f32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            let i = y as usize * WIN_W + x as usize;
            self.buf[i] = blend(self.buf[i], color, t);
        }
    }

    fn fill_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let half = ((r * r - dy * dy) as f32).sqrt() as isize;
            self.fill_rect_i(cx - half, cy + dy, 2 * half + 1, 1, color);
        }
    }

    fn ring(&mut self, cx: isize, cy: isize, r: isize, color: u32, t: f32) {
        let steps = (r * 7).max(16);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            let x = cx + (a.cos() * r as f32) as isize;
            let y = cy + (a.sin() * r as f32) as isize;
            self.blend_pixel(x, y, color, t);
            self.blend_pixel(x + 1, y, color, t);
        }
    }

    /// 3×5 bitmap font, each pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(cx + col * scale + dx, y + row * scale + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Technique activation controller.
//!
//! `Controller` owns all mutable session state: the energy gauge, the
//! currently playing technique, combo tracking, history, the auto-cast loop
//! and the gesture cooldown latch.  Every input path ends in
//! [`Controller::activate`]; every deferred transition is a task in one
//! [`TimerQueue`] driven by [`Controller::poll`].
//!
//! ## Timers
//!
//! | Task | Scheduled by | Effect when it fires |
//! |---|---|---|
//! | `Deactivate` | accepted activation, at `now + duration` | reset effect, hide overlay, clear `active` |
//! | `RegenTick` | accepted activation when no refill is running, then itself | +1 energy every interval until full |
//! | `ComboReset` | gesture activation, replaced by the next one | combo count → 0 |
//! | `GestureCooldownEnd` | gesture trigger, at `duration + 1000 ms` | releases the gesture latch |
//! | `AutoCastCycle` | auto-cast enable, then itself | random auto activation if still enabled |
//!
//! Timers carry their due time, and follow-on timers are scheduled from it,
//! so the logical timeline is the same whether `poll` runs every frame or
//! once after a long pause.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::caster::{next_delay, pick_technique, AutoCaster};
use crate::clock::{Clock, Millis, MonotonicClock};
use crate::combo::ComboTracker;
use crate::config::ControllerConfig;
use crate::effect::{EffectCommand, Notice};
use crate::error::{ConfigError, DetectionError, Rejection};
use crate::gauge::EnergyGauge;
use crate::gesture::{classify, GestureSnapshot};
use crate::history::{ActivationHistory, ActivationRecord};
use crate::technique::{ActivationSource, TechniqueId};
use crate::timer::{TimerId, TimerQueue};

// ════════════════════════════════════════════════════════════════════════════
// Public result types
// ════════════════════════════════════════════════════════════════════════════

/// Returned by an accepted activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub technique:    TechniqueId,
    pub source:       ActivationSource,
    pub energy_after: u32,
    /// When the automatic deactivation fires.
    pub ends_at:      Millis,
}

/// Outcome of [`Controller::activate`].
pub type ActivationResult = Result<Activation, Rejection>;

/// What a detector frame led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The frame had no hands.
    NoHands,
    /// A previous gesture's cooldown is still running; frame dropped.
    Latched,
    /// Hands visible but nothing matched.
    NoMatch,
    /// A gesture was recognised and passed to `activate`.
    Triggered { technique: TechniqueId, result: ActivationResult },
}

// ════════════════════════════════════════════════════════════════════════════
// Internal timer tasks
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Deactivate { technique: TechniqueId },
    RegenTick,
    ComboReset,
    GestureCooldownEnd,
    AutoCastCycle,
}

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

pub struct Controller<C: Clock = MonotonicClock> {
    clock:       C,
    config:      ControllerConfig,
    rng:         StdRng,

    gauge:       EnergyGauge,
    active:      Option<TechniqueId>,

    combo:       ComboTracker,
    history:     ActivationHistory,
    caster:      AutoCaster,

    gesture_latched:  bool,
    last_frame_hint:  Option<Notice>,
    regen_timer:      Option<TimerId>,

    timers:      TimerQueue<Task>,
    effects:     Vec<EffectCommand>,
    notices:     Vec<Notice>,
}

impl Controller<MonotonicClock> {
    /// Controller on the wall clock.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        Controller::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Controller<C> {
    pub fn with_clock(config: ControllerConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_os_rng(),
        };
        Ok(Controller {
            clock,
            rng,
            gauge:       EnergyGauge::full(),
            active:      None,
            combo:       ComboTracker::new(config.combo_window_ms),
            history:     ActivationHistory::with_capacity(config.history_capacity),
            caster:      AutoCaster::new(),
            gesture_latched: false,
            last_frame_hint: None,
            regen_timer:     None,
            timers:      TimerQueue::new(),
            effects:     Vec::new(),
            notices:     Vec::new(),
            config,
        })
    }

    // ── entry points ─────────────────────────────────────────────────────

    /// Request `technique` from `source`.
    ///
    /// Guards, in order: re-requesting the active technique is refused unless
    /// the request comes from the auto-caster; energy below the minimum is
    /// refused.  Rejections mutate nothing but the notice queue.
    pub fn activate(&mut self, technique: TechniqueId, source: ActivationSource) -> ActivationResult {
        let now = self.catch_up();
        self.activate_at(technique, source, now)
    }

    /// Activate a uniformly chosen technique as a manual request.
    pub fn activate_random(&mut self) -> ActivationResult {
        let technique = pick_technique(&mut self.rng);
        self.activate(technique, ActivationSource::Manual)
    }

    /// Feed one detector frame through the classifier and the cooldown latch.
    pub fn on_gesture_frame(&mut self, snapshot: &GestureSnapshot) -> GestureOutcome {
        let now = self.catch_up();

        if snapshot.is_empty() {
            self.frame_hint(Notice::Detecting);
            return GestureOutcome::NoHands;
        }
        if self.gesture_latched {
            return GestureOutcome::Latched;
        }

        let Some(technique) = classify(snapshot) else {
            self.frame_hint(Notice::ReadyForInput);
            return GestureOutcome::NoMatch;
        };

        self.frame_hint(Notice::GestureDetected(technique));
        self.gesture_latched = true;
        let result = self.activate_at(technique, ActivationSource::Gesture, now);
        let release_at = now + technique.definition().duration_ms + self.config.gesture_cooldown_ms;
        self.timers.schedule(release_at, Task::GestureCooldownEnd);
        debug!(%technique, release_at, "gesture latch engaged");

        GestureOutcome::Triggered { technique, result }
    }

    /// The detector failed; manual input keeps working.
    pub fn detection_unavailable(&mut self, error: &DetectionError) {
        warn!(%error, "gesture detection unavailable");
        self.last_frame_hint = None;
        self.notices.push(Notice::DetectionUnavailable(error.to_string()));
    }

    /// Flip auto-cast.  Enabling casts immediately and starts a fresh loop;
    /// disabling only clears the flag, and the pending cycle ends the loop
    /// when it fires.
    pub fn toggle_auto_cast(&mut self) -> bool {
        let now = self.catch_up();
        let enabled = self.caster.toggle();
        info!(enabled, "auto-cast toggled");
        self.notices.push(Notice::AutoCastToggled(enabled));
        if enabled {
            if let Some(stale) = self.caster.take_pending() {
                self.timers.cancel(stale);
            }
            self.run_auto_cycle(now);
        }
        enabled
    }

    /// Set auto-cast to `enabled`, toggling only when it differs.
    pub fn set_auto_cast(&mut self, enabled: bool) {
        if self.caster.is_enabled() != enabled {
            self.toggle_auto_cast();
        }
    }

    /// Fire every timer due at the current clock time.  Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.run_due(now)
    }

    // ── outbound queues ──────────────────────────────────────────────────

    /// Take the renderer commands queued since the last drain.
    pub fn drain_effects(&mut self) -> Vec<EffectCommand> {
        std::mem::take(&mut self.effects)
    }

    /// Take the indicator notices queued since the last drain.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── read-only view ───────────────────────────────────────────────────

    pub fn energy(&self) -> u32 { self.gauge.value() }
    pub fn gauge(&self) -> &EnergyGauge { &self.gauge }
    pub fn active(&self) -> Option<TechniqueId> { self.active }
    pub fn combo_count(&self) -> u32 { self.combo.count() }
    pub fn last_gesture_at(&self) -> Option<Millis> { self.combo.last_gesture_at() }
    pub fn history(&self) -> &ActivationHistory { &self.history }
    pub fn is_auto_cast_enabled(&self) -> bool { self.caster.is_enabled() }
    pub fn is_gesture_latched(&self) -> bool { self.gesture_latched }
    pub fn is_regenerating(&self) -> bool { self.regen_timer.is_some() }
    pub fn config(&self) -> &ControllerConfig { &self.config }
    pub fn now(&self) -> Millis { self.clock.now_ms() }
    pub fn pending_timers(&self) -> usize { self.timers.len() }

    // ── internals ────────────────────────────────────────────────────────

    fn catch_up(&mut self) -> Millis {
        let now = self.clock.now_ms();
        self.run_due(now);
        now
    }

    fn run_due(&mut self, now: Millis) -> usize {
        let mut fired = 0;
        while let Some((due, task)) = self.timers.pop_due(now) {
            self.fire(task, due);
            fired += 1;
        }
        fired
    }

    fn fire(&mut self, task: Task, at: Millis) {
        match task {
            Task::Deactivate { technique } => self.deactivate(technique, at),
            Task::RegenTick => self.regen_tick(at),
            Task::ComboReset => {
                if self.combo.reset() {
                    debug!(at, "combo expired");
                    self.notices.push(Notice::ComboChanged(0));
                }
            }
            Task::GestureCooldownEnd => {
                debug!(at, "gesture latch released");
                self.gesture_latched = false;
            }
            Task::AutoCastCycle => self.run_auto_cycle(at),
        }
    }

    fn activate_at(&mut self, technique: TechniqueId, source: ActivationSource, now: Millis) -> ActivationResult {
        if let Some(current) = self.active {
            if current == technique && source != ActivationSource::Auto {
                debug!(%technique, %source, "already active; request ignored");
                self.notices.push(Notice::AlreadyActive(technique));
                return Err(Rejection::AlreadyActive(technique));
            }
        }

        if !self.gauge.can_afford(self.config.min_energy) {
            let available = self.gauge.value();
            warn!(%technique, %source, available, "insufficient energy");
            self.notices.push(Notice::InsufficientEnergy);
            return Err(Rejection::InsufficientEnergy {
                available,
                required: self.config.min_energy,
            });
        }

        let def = technique.definition();
        let energy_after = self.gauge.deduct(def.cost);
        let ends_at = now + def.duration_ms;

        self.active = Some(technique);
        self.history.push(ActivationRecord { technique, at: now, source });

        if source == ActivationSource::Gesture {
            self.register_combo(now);
        }

        self.effects.push(EffectCommand::ShowOverlay { name: def.name, glyph: def.glyph });
        if let Some(color) = def.flash {
            self.effects.push(EffectCommand::Flash(color));
        }
        if let Some(duration_ms) = def.slow_motion_ms {
            self.effects.push(EffectCommand::SlowMotion { duration_ms });
        }
        self.effects.push(EffectCommand::Shake {
            intensity:   def.shake,
            duration_ms: self.config.shake_duration_ms,
        });
        self.effects.push(EffectCommand::PlayEffect { technique, duration_ms: def.duration_ms });

        self.timers.schedule(ends_at, Task::Deactivate { technique });
        self.arm_regen(now);

        info!(%technique, %source, energy = energy_after, ends_at, "technique activated");
        self.notices.push(Notice::Activated { technique, source });

        Ok(Activation { technique, source, energy_after, ends_at })
    }

    // Every teardown releases the stage, even when a later activation
    // replaced this one in the meantime.
    fn deactivate(&mut self, technique: TechniqueId, at: Millis) {
        if self.active.is_some_and(|current| current != technique) {
            debug!(%technique, replaced_by = ?self.active, at, "releasing stage held by a later technique");
        }
        self.active = None;
        self.effects.push(EffectCommand::ResetEffect { technique });
        self.effects.push(EffectCommand::HideOverlay);
        self.notices.push(Notice::Finished(technique));
        debug!(%technique, at, "technique finished");
    }

    fn register_combo(&mut self, now: Millis) {
        if let Some(pending) = self.combo.take_reset_timer() {
            self.timers.cancel(pending);
        }
        let before = self.combo.count();
        let count = self.combo.register(now);
        let timer = self.timers.schedule(now + self.config.combo_window_ms, Task::ComboReset);
        self.combo.set_reset_timer(timer);
        if count != before {
            self.notices.push(Notice::ComboChanged(count));
        }
    }

    // Single refill driver.  A driver that is already waiting or ticking
    // keeps its schedule; only an idle gauge gets a new one.
    fn arm_regen(&mut self, now: Millis) {
        if self.regen_timer.is_some() {
            return;
        }
        let first_tick = now + self.config.regen_delay_ms + self.config.regen_interval_ms;
        self.regen_timer = Some(self.timers.schedule(first_tick, Task::RegenTick));
    }

    fn regen_tick(&mut self, at: Millis) {
        self.regen_timer = None;
        if self.gauge.is_full() {
            return;
        }
        let value = self.gauge.regenerate(self.config.regen_step);
        if !self.gauge.is_full() {
            let next = at + self.config.regen_interval_ms;
            self.regen_timer = Some(self.timers.schedule(next, Task::RegenTick));
        } else {
            debug!(at, value, "energy full");
        }
    }

    fn run_auto_cycle(&mut self, at: Millis) {
        if !self.caster.begin_cycle() {
            debug!(at, "auto-cast loop stopped");
            return;
        }
        let technique = pick_technique(&mut self.rng);
        if let Err(rejection) = self.activate_at(technique, ActivationSource::Auto, at) {
            debug!(%technique, %rejection, "auto-cast rejected");
        }
        let delay = next_delay(&mut self.rng, self.config.auto_cast_min_ms, self.config.auto_cast_max_ms);
        let timer = self.timers.schedule(at + delay, Task::AutoCastCycle);
        self.caster.replace_pending(timer);
    }

    // Frame-level hints repeat every frame; only queue them on change.
    fn frame_hint(&mut self, notice: Notice) {
        if self.last_frame_hint.as_ref() != Some(&notice) {
            self.last_frame_hint = Some(notice.clone());
            self.notices.push(notice);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

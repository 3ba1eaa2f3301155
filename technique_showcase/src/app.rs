//! Top-level application state machine.
//!
//! `AppState` owns the activation [`Controller`], the renderer-side
//! [`VisualState`] and the status line.  It routes [`InputEvent`]s into the
//! controller, forwards the controller's effect commands to the visuals, and
//! turns notices into status text each frame.

use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use technique_core::{
    ActivationSource, Clock, Controller, DetectionError, EffectSink, ManualClock, Millis,
    MonotonicClock, Notice,
};

use crate::config::Settings;
use crate::effects::VisualState;
use crate::error::ShowcaseError;
use crate::input::{
    load_feed, spawn_input_source, InputEvent, LandmarkFeedSource, SimInput, SimInputSource,
};
use crate::visualizer::{Scene, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<C: Clock = MonotonicClock> {
    controller: Controller<C>,
    visuals:    VisualState,
    blindfold:  bool,
    quit:       bool,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,

    /// Notices since the last `take_notices`, stamped with controller time.
    notices:    Vec<(Millis, Notice)>,
}

impl<C: Clock> AppState<C> {
    pub fn new(settings: &Settings, clock: C) -> Result<Self, ShowcaseError> {
        let controller = Controller::with_clock(settings.controller.clone(), clock)?;
        let mut app = AppState {
            controller,
            visuals:   VisualState::new(settings.controller.seed),
            blindfold: settings.blindfold,
            quit:      false,
            status:    "READY - press 1-5 or click a card".to_string(),
            notices:   Vec::new(),
        };
        if settings.auto_cast {
            app.controller.set_auto_cast(true);
            app.flush();
        }
        Ok(app)
    }

    // ── process one InputEvent ───────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Trigger(technique) => {
                // Rejections arrive as notices; nothing else to do here.
                let _ = self.controller.activate(technique, ActivationSource::Manual);
            }
            InputEvent::RandomTrigger => {
                let _ = self.controller.activate_random();
            }
            InputEvent::ToggleAutoCast => {
                self.controller.toggle_auto_cast();
            }
            InputEvent::ToggleBlindfold => {
                self.blindfold = !self.blindfold;
                info!(blindfold = self.blindfold, "blindfold toggled");
            }
            InputEvent::Frame(snapshot) => {
                let outcome = self.controller.on_gesture_frame(&snapshot);
                debug!(?outcome, "gesture frame");
            }
            InputEvent::DetectionFailed(err) => {
                self.controller.detection_unavailable(&err);
            }
            InputEvent::Quit => {
                self.quit = true;
            }
        }
        self.flush();
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Fire due controller timers and advance animations by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f32) {
        self.controller.poll();
        self.flush();
        self.visuals.tick(dt_ms);
    }

    fn flush(&mut self) {
        let effects = self.controller.drain_effects();
        self.visuals.apply_all(&effects);

        let now = self.controller.now();
        for notice in self.controller.drain_notices() {
            // The combo counter has its own slot in the HUD.
            if !matches!(notice, Notice::ComboChanged(_)) {
                self.status = notice.to_string();
            }
            self.notices.push((now, notice));
        }
    }

    /// Take the notices recorded since the last call.
    pub fn take_notices(&mut self) -> Vec<(Millis, Notice)> {
        std::mem::take(&mut self.notices)
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn controller(&self) -> &Controller<C> { &self.controller }
    pub fn visuals(&self)    -> &VisualState   { &self.visuals }
    pub fn blindfold(&self)  -> bool           { self.blindfold }
    pub fn should_quit(&self) -> bool          { self.quit }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            energy:     self.controller.gauge(),
            min_energy: self.controller.config().min_energy,
            active:     self.controller.active(),
            combo:      self.controller.combo_count(),
            auto_cast:  self.controller.is_auto_cast_enabled(),
            blindfold:  self.blindfold,
            status:     &self.status,
            history:    self.controller.history(),
            visuals:    &self.visuals,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the windowed showcase.
///
/// Creates the visualizer, the keyboard/mouse source and (when configured)
/// the landmark feed source, then drives the event/render loop at ~60 fps.
pub fn run(settings: &Settings) -> Result<(), ShowcaseError> {
    settings.validate()?;

    // ── Input channels ────────────────────────────────────────────────────
    let (tx, rx) = mpsc::channel::<InputEvent>();
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    spawn_input_source(SimInputSource { rx: sim_rx }, tx.clone());

    match &settings.feed {
        Some(path) => {
            let interval = Duration::from_millis(settings.feed_frame_ms.max(1));
            spawn_input_source(LandmarkFeedSource::new(path, interval, settings.feed_loop), tx.clone());
        }
        None => {
            let err = DetectionError::CameraUnavailable("no landmark feed configured".into());
            let _ = tx.send(InputEvent::DetectionFailed(err));
        }
    }
    drop(tx);

    // ── Visualizer and app state ──────────────────────────────────────────
    let mut vis = Visualizer::new(sim_tx)?;
    let mut app = AppState::new(settings, MonotonicClock::new())?;
    let mut last_frame = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → SimInput
        if !vis.poll_input() { break; }

        // 2. Drain input events
        loop {
            match rx.try_recv() {
                Ok(event) => app.handle_input(event),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        if app.should_quit() { break; }

        // 3. Timers and animation
        let now = Instant::now();
        let dt_ms = now.duration_since(last_frame).as_secs_f32() * 1000.0;
        last_frame = now;
        app.tick(dt_ms);
        for (at, notice) in app.take_notices() {
            debug!(at, %notice, "notice");
        }

        // 4. Render
        vis.render(&app.scene());
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// run_headless() — scripted run on a manual clock
// ════════════════════════════════════════════════════════════════════════════

/// Frame step of the headless run.
const HEADLESS_FRAME_MS: Millis = 16;

/// Run for `duration_ms` of logical time without a window and return the
/// notice transcript as `"[   time ms] text"` lines.
///
/// Auto-cast is switched on at the start.  If a landmark feed is configured
/// its frames are replayed at `feed_frame_ms` alongside.
pub fn run_headless(settings: &Settings, duration_ms: Millis) -> Result<Vec<String>, ShowcaseError> {
    settings.validate()?;

    let clock = ManualClock::new();
    let mut app = AppState::new(settings, clock.clone())?;

    let frames = match &settings.feed {
        Some(path) => match load_feed(path) {
            Ok(frames) => frames,
            Err(err) => {
                app.handle_input(InputEvent::DetectionFailed(err));
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    let frame_ms = settings.feed_frame_ms.max(1);
    let mut next_frame_at: Millis = 0;
    let mut frame_idx = 0;

    if !app.controller().is_auto_cast_enabled() {
        app.handle_input(InputEvent::ToggleAutoCast);
    }

    let mut transcript = Vec::new();
    let mut record = |notices: Vec<(Millis, Notice)>| {
        for (at, notice) in notices {
            transcript.push(format!("[{at:>7} ms] {notice}"));
        }
    };
    record(app.take_notices());

    while clock.now_ms() < duration_ms {
        clock.advance(HEADLESS_FRAME_MS);

        while !frames.is_empty()
            && (settings.feed_loop || frame_idx < frames.len())
            && next_frame_at <= clock.now_ms()
        {
            let frame = frames[frame_idx % frames.len()].clone();
            app.handle_input(InputEvent::Frame(frame));
            frame_idx += 1;
            next_frame_at += frame_ms;
        }

        app.tick(HEADLESS_FRAME_MS as f32);
        record(app.take_notices());
    }

    info!(
        duration_ms,
        activations = app.controller().history().len(),
        energy = app.controller().energy(),
        "headless run finished",
    );
    Ok(transcript)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use technique_core::{GestureSnapshot, Hand, Handedness, Landmark, TechniqueId};

    fn settings() -> Settings {
        let mut s = Settings::default();
        s.controller.seed = Some(21);
        s
    }

    fn make_app() -> (AppState<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let app = AppState::new(&settings(), clock.clone()).unwrap();
        (app, clock)
    }

    fn pointing_right() -> GestureSnapshot {
        GestureSnapshot::one(
            Hand::uniform(Handedness::Right, Landmark::new(0.5, 0.6, 0.0))
                .with_landmark(8, Landmark::new(0.5, 0.4, -0.3)),
        )
    }

    #[test]
    fn trigger_activates_and_shows_overlay() {
        let (mut app, _) = make_app();
        app.handle_input(InputEvent::Trigger(TechniqueId::Purple));
        assert_eq!(app.controller().active(), Some(TechniqueId::Purple));
        assert_eq!(app.visuals().overlay.as_ref().map(|o| o.name), Some("HOLLOW PURPLE"));
        assert!(app.visuals().flash.is_some());
        assert!(app.visuals().is_slow_motion());
        assert_eq!(app.status, "HOLLOW PURPLE (manual)");
    }

    #[test]
    fn tick_runs_deactivation() {
        let (mut app, clock) = make_app();
        app.handle_input(InputEvent::Trigger(TechniqueId::Blue));
        app.tick(300.0);
        clock.advance(2000);
        app.tick(16.0);
        assert_eq!(app.controller().active(), None);
        assert!(app.visuals().playing.is_none());
        assert!(app.visuals().overlay.as_ref().is_some_and(|o| o.fading_out));
    }

    #[test]
    fn auto_recast_teardown_clears_aura_and_active() {
        let (mut app, clock) = make_app();
        app.handle_input(InputEvent::Trigger(TechniqueId::Infinity));
        clock.set(1000);
        app.controller.activate(TechniqueId::Infinity, ActivationSource::Auto).unwrap();
        app.flush();
        assert!(app.visuals().playing.is_some());

        clock.set(3000);
        app.tick(16.0);
        assert_eq!(app.controller().active(), None);
        assert!(app.visuals().playing.is_none());
        assert!(app.visuals().aura().is_none());
        assert_eq!(app.status, "INFINITY ENDED");
        assert!(app.scene().energy.is_full());
    }

    #[test]
    fn insufficient_energy_reaches_status() {
        let (mut app, clock) = make_app();
        for t in [TechniqueId::Domain, TechniqueId::Purple, TechniqueId::Blue] {
            app.handle_input(InputEvent::Trigger(t));
            clock.advance(10);
        }
        app.handle_input(InputEvent::Trigger(TechniqueId::Red));
        assert_eq!(app.controller().energy(), 0);
        assert_eq!(app.status, "INSUFFICIENT ENERGY!");
    }

    #[test]
    fn blindfold_is_cosmetic() {
        let (mut app, _) = make_app();
        app.handle_input(InputEvent::ToggleBlindfold);
        assert!(app.blindfold());
        assert!(app.scene().blindfold);
        assert!(app.controller().history().is_empty());
    }

    #[test]
    fn gesture_frame_counts_combo() {
        let (mut app, _) = make_app();
        app.handle_input(InputEvent::Frame(pointing_right()));
        assert_eq!(app.controller().active(), Some(TechniqueId::Red));
        assert_eq!(app.scene().combo, 1);
        let notices: Vec<_> = app.take_notices().into_iter().map(|(_, n)| n).collect();
        assert!(notices.contains(&Notice::GestureDetected(TechniqueId::Red)));
        assert!(notices.contains(&Notice::ComboChanged(1)));
        // Combo changes stay out of the status line.
        assert_eq!(app.status, "REVERSAL: RED (gesture)");
    }

    #[test]
    fn detection_failure_keeps_manual_input() {
        let (mut app, _) = make_app();
        app.handle_input(InputEvent::DetectionFailed(DetectionError::CameraUnavailable("denied".into())));
        assert_eq!(app.status, "GESTURE INPUT OFF: camera unavailable: denied");
        app.handle_input(InputEvent::Trigger(TechniqueId::Infinity));
        assert_eq!(app.controller().active(), Some(TechniqueId::Infinity));
    }

    #[test]
    fn auto_cast_from_settings() {
        let mut s = settings();
        s.auto_cast = true;
        let app = AppState::new(&s, ManualClock::new()).unwrap();
        assert!(app.controller().is_auto_cast_enabled());
        assert_eq!(app.controller().history().count_from(ActivationSource::Auto), 1);
    }

    #[test]
    fn quit_is_recorded() {
        let (mut app, _) = make_app();
        app.handle_input(InputEvent::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn headless_run_is_deterministic() {
        let a = run_headless(&settings(), 20_000).unwrap();
        let b = run_headless(&settings(), 20_000).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().any(|l| l.ends_with("AUTO-CAST MODE ON")));
        assert!(a.iter().filter(|l| l.contains("(auto)")).count() >= 3);
    }

    #[test]
    fn headless_with_missing_feed_still_runs() {
        let mut s = settings();
        s.feed = Some("/nonexistent/feed.jsonl".into());
        let lines = run_headless(&s, 1_000).unwrap();
        assert!(lines.iter().any(|l| l.contains("GESTURE INPUT OFF")));
        assert!(lines.iter().any(|l| l.contains("(auto)")));
    }

    #[test]
    fn headless_rejects_bad_controller_settings() {
        let mut s = settings();
        s.controller.regen_interval_ms = 0;
        assert!(matches!(run_headless(&s, 100), Err(ShowcaseError::Controller(_))));
    }
}

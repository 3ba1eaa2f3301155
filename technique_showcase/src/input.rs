//! Input sources: keyboard/mouse simulation and the replayed landmark feed.
//!
//! Every source runs on its own thread and delivers [`InputEvent`]s over an
//! `mpsc` channel.  The main loop does not care whether a technique request
//! came from a key, a card click or a replayed hand pose.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use technique_core::{DetectionError, GestureSnapshot, TechniqueId};

// ════════════════════════════════════════════════════════════════════════════
// InputEvent
// ════════════════════════════════════════════════════════════════════════════

/// A request from any input surface.
#[derive(Debug)]
pub enum InputEvent {
    /// Card click or digit key.
    Trigger(TechniqueId),
    /// R: activate a random technique.
    RandomTrigger,
    /// A: flip auto-cast.
    ToggleAutoCast,
    /// B: cosmetic only, never reaches the controller.
    ToggleBlindfold,
    /// One landmark frame from the detector.
    Frame(GestureSnapshot),
    /// The detector gave up; manual input keeps working.
    DetectionFailed(DetectionError),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// InputSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`InputEvent`]s over a channel.
pub trait InputSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<InputEvent>);
}

/// Run `source` on its own thread, feeding `tx`.
pub fn spawn_input_source<S: InputSource>(source: S, tx: Sender<InputEvent>) -> JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(tx))
}

// ════════════════════════════════════════════════════════════════════════════
// SimInputSource — window keyboard and mouse
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    /// Left click landed on technique card `index` (0-based).
    CardClicked(usize),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Digit(u8),   // 1–5
    Blindfold,   // B
    AutoCast,    // A
    Random,      // R
    Quit,        // Q / Escape
}

/// Translates [`SimInput`] from the window into [`InputEvent`]s.
pub struct SimInputSource {
    pub rx: Receiver<SimInput>,
}

/// Map one raw window input to an event, if it means anything.
pub fn translate(input: SimInput) -> Option<InputEvent> {
    let event = match input {
        SimInput::KeyDown(SimKey::Digit(d))  => InputEvent::Trigger(TechniqueId::from_digit(d)?),
        SimInput::CardClicked(i)             => InputEvent::Trigger(*TechniqueId::ALL.get(i)?),
        SimInput::KeyDown(SimKey::Blindfold) => InputEvent::ToggleBlindfold,
        SimInput::KeyDown(SimKey::AutoCast)  => InputEvent::ToggleAutoCast,
        SimInput::KeyDown(SimKey::Random)    => InputEvent::RandomTrigger,
        SimInput::KeyDown(SimKey::Quit)      => InputEvent::Quit,
    };
    Some(event)
}

impl InputSource for SimInputSource {
    fn run(self: Box<Self>, tx: Sender<InputEvent>) {
        for input in self.rx {
            let Some(event) = translate(input) else { continue };
            let quit = matches!(event, InputEvent::Quit);
            if tx.send(event).is_err() || quit {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFeedSource — replayed detector output
// ════════════════════════════════════════════════════════════════════════════

/// Replays a JSON-lines landmark recording at a fixed frame rate.
///
/// One [`GestureSnapshot`] per line, e.g.
/// `{"hands":[{"handedness":"Right","landmarks":[{"x":0.5,"y":0.6,"z":0.0}, ...]}]}`.
/// Blank lines and lines starting with `#` are ignored.  `{"hands":[]}` is a
/// frame with no hands in view.
pub struct LandmarkFeedSource {
    pub path:           PathBuf,
    pub frame_interval: Duration,
    /// Start over at the end instead of stopping.
    pub looped:         bool,
}

impl LandmarkFeedSource {
    pub fn new(path: impl Into<PathBuf>, frame_interval: Duration, looped: bool) -> Self {
        LandmarkFeedSource { path: path.into(), frame_interval, looped }
    }
}

impl InputSource for LandmarkFeedSource {
    fn run(self: Box<Self>, tx: Sender<InputEvent>) {
        let frames = match load_feed(&self.path) {
            Ok(frames) if !frames.is_empty() => frames,
            Ok(_) => {
                let err = DetectionError::CameraUnavailable(format!("{} has no frames", self.path.display()));
                let _ = tx.send(InputEvent::DetectionFailed(err));
                return;
            }
            Err(err) => {
                let _ = tx.send(InputEvent::DetectionFailed(err));
                return;
            }
        };
        info!(path = %self.path.display(), frames = frames.len(), "replaying landmark feed");

        loop {
            for frame in &frames {
                if tx.send(InputEvent::Frame(frame.clone())).is_err() {
                    return;
                }
                thread::sleep(self.frame_interval);
            }
            if !self.looped {
                debug!("landmark feed finished");
                return;
            }
        }
    }
}

/// Read and parse a whole feed file.  Malformed lines are logged and skipped.
pub fn load_feed(path: &Path) -> Result<Vec<GestureSnapshot>, DetectionError> {
    let text = fs::read_to_string(path)
        .map_err(|source| DetectionError::FeedUnreadable { path: path.to_path_buf(), source })?;
    let (frames, bad) = parse_feed(&text);
    for err in &bad {
        warn!(%err, "skipping landmark frame");
    }
    Ok(frames)
}

/// Parse feed text into frames plus one error per rejected line.
pub fn parse_feed(text: &str) -> (Vec<GestureSnapshot>, Vec<DetectionError>) {
    let mut frames = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_frame(line, i + 1) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None)        => {}
            Err(err)        => errors.push(err),
        }
    }
    (frames, errors)
}

/// Parse one feed line.  `Ok(None)` for blank and comment lines.
pub fn parse_frame(line: &str, line_no: usize) -> Result<Option<GestureSnapshot>, DetectionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| DetectionError::MalformedFrame { line: line_no, reason: e.to_string() })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! # technique_showcase
//!
//! Interactive front end for [`technique_core`]: a software-rendered stage
//! where an avatar performs five timed techniques, triggered by keys, card
//! clicks, replayed hand gestures or the autonomous caster.
//!
//! ## Input → Action mapping
//!
//! | Input | Action |
//! |---|---|
//! | `1`–`5` / click a card | Activate that technique (manual) |
//! | `R` | Activate a random technique (manual) |
//! | `A` | Toggle auto-cast |
//! | `B` | Toggle the avatar's blindfold (cosmetic) |
//! | `Q` / `Escape` | Quit |
//! | Landmark feed frame | Gesture classification → activation (gesture) |
//!
//! ## Gesture input
//!
//! There is no camera binding.  A JSON-lines landmark recording (`--feed`)
//! is replayed at a fixed frame rate in place of the live detector; without
//! one, gesture input reports itself unavailable and everything else works.
//!
//! ## Headless mode
//!
//! `--headless SECONDS` runs on a manual clock with auto-cast on and prints
//! the notice transcript.  With a fixed seed the transcript is reproducible.

pub mod config;
pub mod error;
pub mod input;
pub mod effects;
pub mod visualizer;
pub mod app;

//! Showcase settings.
//!
//! Layered lowest to highest: built-in defaults, the TOML settings file
//! (`showcase.toml` in the working directory, or `--config`), environment
//! variables, then command-line flags.
//!
//! ```toml
//! feed          = "gestures.jsonl"
//! feed_frame_ms = 33
//! auto_cast     = true
//!
//! [controller]
//! combo_window_ms = 3000
//! seed            = 42
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `SHOWCASE_FEED` | `feed` |
//! | `SHOWCASE_SEED` | `controller.seed` |
//! | `SHOWCASE_LOG`  | `log_filter` |

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::debug;

use technique_core::ControllerConfig;

use crate::error::ShowcaseError;

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "showcase.toml";

// ════════════════════════════════════════════════════════════════════════════
// Settings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub controller:    ControllerConfig,
    /// JSON-lines landmark feed standing in for the camera.
    pub feed:          Option<PathBuf>,
    /// Replay pace of the landmark feed.
    pub feed_frame_ms: u64,
    /// Restart the feed from the top when it runs out.
    pub feed_loop:     bool,
    /// Start with auto-cast already on.
    pub auto_cast:     bool,
    pub blindfold:     bool,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter:    String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            controller:    ControllerConfig::default(),
            feed:          None,
            feed_frame_ms: 33,
            feed_loop:     true,
            auto_cast:     false,
            blindfold:     false,
            log_filter:    "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with a settings file.  An explicit `path` must
    /// exist; the implicit `showcase.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ShowcaseError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None    => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };
        if !required && !path.exists() {
            debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&path)
            .map_err(|source| ShowcaseError::SettingsRead { path: path.clone(), source })?;
        Settings::parse(&raw, &path)
    }

    /// Parse settings text; `origin` is only used in error messages.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, ShowcaseError> {
        toml::from_str(raw).map_err(|source| ShowcaseError::SettingsParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Apply `SHOWCASE_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ShowcaseError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ShowcaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(feed) = lookup("SHOWCASE_FEED") {
            self.feed = Some(PathBuf::from(feed));
        }
        if let Some(raw) = lookup("SHOWCASE_SEED") {
            let seed = raw.trim().parse::<u64>()
                .map_err(|_| ShowcaseError::InvalidEnv { var: "SHOWCASE_SEED", value: raw.clone() })?;
            self.controller.seed = Some(seed);
        }
        if let Some(filter) = lookup("SHOWCASE_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    /// Reject controller values the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ShowcaseError> {
        self.controller.validate()?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command line
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Parser)]
#[command(name = "technique_showcase", version, about = "Animated technique showcase")]
pub struct Cli {
    /// Settings file (default: ./showcase.toml if present).
    #[arg(long, value_name = "FILE")]
    pub config:    Option<PathBuf>,

    /// JSON-lines landmark feed to replay as gesture input.
    #[arg(long, value_name = "FILE")]
    pub feed:      Option<PathBuf>,

    /// Fixed RNG seed.
    #[arg(long)]
    pub seed:      Option<u64>,

    /// Start with auto-cast enabled.
    #[arg(long)]
    pub auto_cast: bool,

    #[arg(long)]
    pub blindfold: bool,

    /// Run without a window for SECONDS of logical time and print notices.
    #[arg(long, value_name = "SECONDS")]
    pub headless:  Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, value_name = "FILTER")]
    pub log:       Option<String>,
}

impl Cli {
    /// Overlay flags that were actually given.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(feed) = &self.feed {
            settings.feed = Some(feed.clone());
        }
        if let Some(seed) = self.seed {
            settings.controller.seed = Some(seed);
        }
        if self.auto_cast {
            settings.auto_cast = true;
        }
        if self.blindfold {
            settings.blindfold = true;
        }
        if let Some(filter) = &self.log {
            settings.log_filter = filter.clone();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn nested_controller_table() {
        let raw = "feed = \"hands.jsonl\"\n[controller]\ncombo_window_ms = 2500\n";
        let s = Settings::parse(raw, Path::new("test.toml")).unwrap();
        assert_eq!(s.feed, Some(PathBuf::from("hands.jsonl")));
        assert_eq!(s.controller.combo_window_ms, 2500);
        assert_eq!(s.controller.regen_delay_ms, 2000);
        assert_eq!(s.feed_frame_ms, 33);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = Settings::parse("volume = 3", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ShowcaseError::SettingsParse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/showcase.toml"))).unwrap_err();
        assert!(matches!(err, ShowcaseError::SettingsRead { .. }));
    }

    #[test]
    fn env_overrides_file() {
        let mut s = Settings::parse("[controller]\nseed = 1", Path::new("t.toml")).unwrap();
        s.apply_env_from(env(&[("SHOWCASE_SEED", "99"), ("SHOWCASE_LOG", "debug")])).unwrap();
        assert_eq!(s.controller.seed, Some(99));
        assert_eq!(s.log_filter, "debug");
        assert_eq!(s.feed, None);
    }

    #[test]
    fn bad_seed_in_env() {
        let mut s = Settings::default();
        let err = s.apply_env_from(env(&[("SHOWCASE_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidEnv { var: "SHOWCASE_SEED", .. }));
    }

    #[test]
    fn cli_wins_over_env() {
        let mut s = Settings::default();
        s.apply_env_from(env(&[("SHOWCASE_FEED", "env.jsonl")])).unwrap();
        let cli = Cli::parse_from(["technique_showcase", "--feed", "cli.jsonl", "--auto-cast", "--seed", "5"]);
        cli.apply(&mut s);
        assert_eq!(s.feed, Some(PathBuf::from("cli.jsonl")));
        assert_eq!(s.controller.seed, Some(5));
        assert!(s.auto_cast);
        assert!(!s.blindfold);
    }

    #[test]
    fn validate_surfaces_controller_errors() {
        let mut s = Settings::default();
        assert!(s.validate().is_ok());
        s.controller.auto_cast_max_ms = 0;
        assert!(matches!(s.validate(), Err(ShowcaseError::Controller(_))));
    }
}

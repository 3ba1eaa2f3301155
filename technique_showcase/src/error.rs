//! Application-level failures.  Controller rejections are not errors here;
//! they surface as status notices.

use std::path::PathBuf;

use thiserror::Error;

use technique_core::ConfigError;

#[derive(Debug, Error)]
pub enum ShowcaseError {
    #[error("cannot read settings file {path}")]
    SettingsRead {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}")]
    SettingsParse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid controller settings")]
    Controller(#[from] ConfigError),
    #[error("cannot open window")]
    Window(#[from] minifb::Error),
}

//! Configuration module for Llomax
//!
//! Layers library defaults, a TOML file, `LLOMAX_*` environment variables
//! and command-line overrides into one immutable [`Settings`].

mod settings;

pub use settings::*;

use std::path::PathBuf;

/// Config file used when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "llomax.toml";

/// Resolve the config file path, falling back to [`DEFAULT_CONFIG_PATH`]
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

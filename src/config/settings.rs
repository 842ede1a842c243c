//! Settings structures for Llomax configuration

use crate::archive::{Collection, FilterValue};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the TOML table holding Llomax settings
pub const SECTION: &str = "llomax";

/// Longest accepted request timeout, in seconds
pub const MAX_REQUEST_TIMEOUT: f64 = 3600.0;

/// Resolved settings for a search run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory to save downloaded images
    pub output_dir: String,
    /// Maximum number of items per search
    pub max_results: usize,
    /// Restrict searches to these collections
    pub collections: Option<Vec<Collection>>,
    /// Restrict to commercial-use licenses
    pub commercial_use: bool,
    /// Arbitrary archive field filters
    pub filters: Option<BTreeMap<String, FilterValue>>,
    /// Outgoing request settings
    pub outgoing: OutgoingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: "llomax_output".to_string(),
            max_results: 10,
            collections: None,
            commercial_use: false,
            filters: None,
            outgoing: OutgoingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the TOML file, then environment
    /// variables, then `overrides`.
    ///
    /// A missing file or a file without a `[llomax]` table contributes nothing.
    pub fn load<P: AsRef<Path>>(path: P, overrides: SettingsLayer) -> Result<Self, ConfigError> {
        let layer = SettingsLayer::from_file(path)?
            .merge(SettingsLayer::from_env())
            .merge(overrides);
        Self::default().apply(layer)
    }

    /// Apply a layer of overrides, validating collection names
    pub fn apply(mut self, layer: SettingsLayer) -> Result<Self, ConfigError> {
        if let Some(output_dir) = layer.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(max_results) = layer.max_results {
            self.max_results = max_results;
        }
        if let Some(names) = layer.collections {
            let collections = names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<Collection>, _>>()?;
            self.collections = Some(collections);
        }
        if let Some(commercial_use) = layer.commercial_use {
            self.commercial_use = commercial_use;
        }
        if let Some(filters) = layer.filters {
            if let Some(key) = filters.keys().find(|k| k.trim().is_empty()) {
                return Err(ConfigError::InvalidFilter(format!("empty field name {:?}", key)));
            }
            self.filters = Some(filters);
        }
        if let Some(outgoing) = layer.outgoing {
            let timeout = outgoing.request_timeout;
            if !(timeout.is_finite() && timeout > 0.0 && timeout <= MAX_REQUEST_TIMEOUT) {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            let base = url::Url::parse(&outgoing.archive_url)
                .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", outgoing.archive_url, e)))?;
            if !matches!(base.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(outgoing.archive_url));
            }
            self.outgoing = outgoing;
        }
        Ok(self)
    }
}

/// A partial set of settings; unset fields leave lower layers untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsLayer {
    pub output_dir: Option<String>,
    pub max_results: Option<usize>,
    pub collections: Option<Vec<String>>,
    pub commercial_use: Option<bool>,
    pub filters: Option<BTreeMap<String, FilterValue>>,
    pub outgoing: Option<OutgoingSettings>,
}

impl SettingsLayer {
    /// Read the `[llomax]` table of a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .build()?;

        match source.get::<SettingsLayer>(SECTION) {
            Ok(layer) => Ok(layer),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read `LLOMAX_*` environment variables
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a layer from key/value pairs shaped like environment variables
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            match key.as_str() {
                "LLOMAX_OUTPUT_DIR" => layer.output_dir = Some(value),
                "LLOMAX_MAX_RESULTS" => {
                    if let Ok(n) = value.trim().parse() {
                        layer.max_results = Some(n);
                    }
                }
                "LLOMAX_COMMERCIAL_USE" => {
                    if let Ok(flag) = value.trim().parse() {
                        layer.commercial_use = Some(flag);
                    }
                }
                _ => {}
            }
        }
        layer
    }

    /// Overlay `higher` on top of this layer
    pub fn merge(self, higher: SettingsLayer) -> Self {
        Self {
            output_dir: higher.output_dir.or(self.output_dir),
            max_results: higher.max_results.or(self.max_results),
            collections: higher.collections.or(self.collections),
            commercial_use: higher.commercial_use.or(self.commercial_use),
            filters: higher.filters.or(self.filters),
            outgoing: higher.outgoing.or(self.outgoing),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Archive base URL, used for search, metadata and download paths
    pub archive_url: String,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            archive_url: crate::archive::DEFAULT_ARCHIVE_URL.to_string(),
            request_timeout: 30.0,
            user_agent: None,
        }
    }
}

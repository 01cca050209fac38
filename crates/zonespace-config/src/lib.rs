//! Configuration system for the zonespace ingest pipeline.
//!
//! Load ingest configuration from TOML or YAML files to control input
//! locations, jurisdiction filtering, and overlay tuning without code
//! changes. Every value the engine once read from process-wide state (the
//! data directory, the sliver constants) is an explicit configuration value
//! threaded through the component constructors.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use zonespace_config::IngestConfig;
//!
//! let config = IngestConfig::from_toml_str(r#"
//!     data_dir = "data/zoning"
//!     specs_dir = "specs"
//!     include = ["sanfrancisco"]
//!
//!     [overlay]
//!     min_area_sq_meters = 50.0
//!     sliver_buffer_meters = 0.01
//! "#).unwrap();
//!
//! assert_eq!(config.include, vec!["sanfrancisco"]);
//! assert_eq!(config.overlay.min_area_sq_meters, 50.0);
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use zonespace_config::IngestConfig;
//!
//! let config = IngestConfig::load("ingest.toml").unwrap_or_default();
//! // Proceeds with defaults if the file doesn't exist
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main ingest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestConfig {
    /// Directory holding per-jurisdiction spatial layers (`<slug>.geojson`).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding ruleset definitions (`<slug>.csv`).
    #[serde(default = "default_specs_dir")]
    pub specs_dir: PathBuf,

    /// Jurisdiction slugs to ingest; empty means all discovered specs.
    #[serde(default)]
    pub include: Vec<String>,

    /// Jurisdiction slugs to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Overlay tuning.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Tuning for the fast overlay's sliver handling.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OverlayConfig {
    /// Fragments at or below this area are discarded as slivers.
    #[serde(default = "default_min_area")]
    pub min_area_sq_meters: f64,

    /// Epsilon buffer applied before subtracting intersections from the
    /// base geometry.
    #[serde(default = "default_sliver_buffer")]
    pub sliver_buffer_meters: f64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/zoning")
}

fn default_specs_dir() -> PathBuf {
    PathBuf::from("specs")
}

fn default_min_area() -> f64 {
    100.0
}

fn default_sliver_buffer() -> f64 {
    1e-2
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            data_dir: default_data_dir(),
            specs_dir: default_specs_dir(),
            include: Vec::new(),
            exclude: Vec::new(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            min_area_sq_meters: default_min_area(),
            sliver_buffer_meters: default_sliver_buffer(),
        }
    }
}

impl IngestConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: IngestConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: IngestConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the specs directory.
    pub fn with_specs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.specs_dir = dir.into();
        self
    }

    /// Restricts ingestion to the given slugs.
    pub fn with_include(mut self, slugs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include = slugs.into_iter().map(Into::into).collect();
        self
    }

    /// Skips the given slugs.
    pub fn with_exclude(mut self, slugs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = slugs.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a discovered slug should be ingested under the filters.
    pub fn selects(&self, slug: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|s| s == slug);
        included && !self.exclude.iter().any(|s| s == slug)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.overlay.min_area_sq_meters < 0.0 {
            return Err(ConfigError::Invalid(
                "overlay.min_area_sq_meters must be non-negative".to_string(),
            ));
        }
        if self.overlay.sliver_buffer_meters < 0.0 {
            return Err(ConfigError::Invalid(
                "overlay.sliver_buffer_meters must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

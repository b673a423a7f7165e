//! Configuration file support
//!
//! Settings are read from TOML. Lookup order:
//!
//! 1. `--config PATH` on the command line
//! 2. `./flyer-hotspots.toml`
//! 3. `<config dir>/flyer-hotspots/config.toml`
//! 4. Built-in defaults
//!
//! # Example
//!
//! ```toml
//! [detector]
//! grid_size = 8
//! threshold = 30
//!
//! [catalogue]
//! image_base_url = "https://cdn.example.com/flyers"
//!
//! [insight]
//! command = "llm"
//! args = ["-m", "gemini-2.5-flash"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::hotspot::HotspotOptions;
use crate::insight::{DEFAULT_API_KEY_ENV, DEFAULT_RETAILER};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "flyer-hotspots.toml";

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "flyer-hotspots";

/// Config error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ============================================================
// Sections
// ============================================================

/// `[detector]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub grid_size: u32,
    pub threshold: u8,
    pub min_span_cells: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let opts = HotspotOptions::default();
        Self {
            grid_size: opts.grid_size,
            threshold: opts.threshold,
            min_span_cells: opts.min_span_cells,
        }
    }
}

/// `[catalogue]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Base URL prepended to relative image URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

/// `[insight]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// External generator program, insight is disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Environment variable that must hold the credential
    pub api_key_env: String,
    pub retailer: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            retailer: DEFAULT_RETAILER.to_string(),
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    /// Worker threads, all CPUs when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

// ============================================================
// Config
// ============================================================

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub catalogue: CatalogueConfig,
    pub insight: InsightConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load from the first config file found, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Candidate config files in lookup order
    pub fn config_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        locations
    }

    /// Apply CLI values on top of this config. Only `Some` fields win.
    pub fn merge_with_cli(mut self, cli: &CliOverrides) -> Self {
        if let Some(grid_size) = cli.grid_size {
            self.detector.grid_size = grid_size;
        }
        if let Some(threshold) = cli.threshold {
            self.detector.threshold = threshold;
        }
        if let Some(min_span) = cli.min_span_cells {
            self.detector.min_span_cells = min_span;
        }
        if let Some(base) = &cli.image_base_url {
            self.catalogue.image_base_url = Some(base.clone());
        }
        if let Some(pretty) = cli.pretty {
            self.output.pretty = pretty;
        }
        if cli.threads.is_some() {
            self.output.threads = cli.threads;
        }
        self
    }

    /// Detector options from the `[detector]` section
    pub fn detector_options(&self) -> HotspotOptions {
        HotspotOptions::builder()
            .grid_size(self.detector.grid_size)
            .threshold(self.detector.threshold)
            .min_span_cells(self.detector.min_span_cells)
            .build()
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub grid_size: Option<u32>,
    pub threshold: Option<u8>,
    pub min_span_cells: Option<u32>,
    pub image_base_url: Option<String>,
    pub pretty: Option<bool>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

//! YAML configuration for thresholds and field aliases.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stockgrid_stock::{AliasTable, StockThresholds};
use tracing::debug;

/// Settings read from `config.yaml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: StockThresholds,
    pub aliases: AliasTable,
}

impl Config {
    /// Load from `explicit` if given (it must exist), otherwise from the
    /// default location if a file is there, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(text)?;
        config.thresholds.validate()?;
        config.aliases.validate()?;
        Ok(config)
    }

    /// Apply command-line threshold flags on top of the file values
    pub fn with_overrides(
        mut self,
        minimum: Option<f64>,
        ideal: Option<f64>,
        maximum: Option<f64>,
    ) -> Result<Self> {
        if let Some(v) = minimum {
            self.thresholds.minimum = v;
        }
        if let Some(v) = ideal {
            self.thresholds.ideal = v;
        }
        if let Some(v) = maximum {
            self.thresholds.maximum = v;
        }
        self.thresholds.validate()?;
        Ok(self)
    }
}

/// Get the default config file path.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("stockgrid");
        p.push("config.yaml");
        p
    })
}

//! User configuration
//!
//! Settings live in an optional `config.toml`, found via
//! `HOUSTON_TOOLS_CONFIG` or under the platform config directory. A missing
//! file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::PeriodCode;

pub const CONFIG_ENV: &str = "HOUSTON_TOOLS_CONFIG";
pub const PERIOD_ENV: &str = "HOUSTON_TOOLS_PERIOD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub segment: SegmentConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Default period code for `segment`
    pub period: String,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            period: PeriodCode::Annual.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// tracing `EnvFilter` directive
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!("No config file at {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(period) = std::env::var(PERIOD_ENV) {
            if !period.trim().is_empty() {
                config.segment.period = period;
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Configured default period, validated
    pub fn default_period(&self) -> Result<PeriodCode> {
        self.segment
            .period
            .parse()
            .with_context(|| format!("Invalid segment.period '{}' in config", self.segment.period))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `$HOUSTON_TOOLS_CONFIG`, else `<config dir>/houston-tools/config.toml`
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dir_spec::config_home().map(|dir| dir.join("houston-tools").join("config.toml"))
}

//! Configuration file parsing for rotlog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::policy::RotationPolicy;
use crate::severity::Severity;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Record layout written to the sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    #[default]
    Json,
    #[serde(alias = "plain_text", alias = "text")]
    Plain,
}

impl std::str::FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(FormatKind::Json),
            "plain" | "plain_text" | "text" => Ok(FormatKind::Plain),
            other => Err(Error::config(format!("Unknown format: {}", other))),
        }
    }
}

/// Rotation policy names accepted in config files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    #[default]
    None,
    #[serde(alias = "file_size")]
    Size,
    Daily,
    #[serde(alias = "time_limit")]
    Timed,
}

impl std::str::FromStr for PolicyName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PolicyName::None),
            "size" | "file_size" => Ok(PolicyName::Size),
            "daily" => Ok(PolicyName::Daily),
            "timed" | "time_limit" => Ok(PolicyName::Timed),
            other => Err(Error::config(format!("Unknown rotation policy: {}", other))),
        }
    }
}

/// Configuration file structure (rotlog.toml/yaml/json)
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub appname: String,
    /// Least severe level that is still written
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub format: FormatKind,
    /// Field separator for the plain format
    pub separator: Option<char>,
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Single file sink from config file
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Path and base name of the files, without extension
    pub prefix: PathBuf,
    #[serde(default)]
    pub policy: PolicyName,
    /// Size limit in bytes (size policy)
    pub size_limit: Option<u64>,
    /// Rotation cycle in seconds (timed policy)
    pub cycle_secs: Option<u64>,
    /// Fixed UTC offset for file names and timers (local zone if absent)
    pub utc_offset_secs: Option<i32>,
}

impl ConfigFile {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: ConfigFile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Field separator for the plain format
    pub fn separator(&self) -> char {
        self.separator.unwrap_or(DEFAULT_FIELD_SEPARATOR)
    }

    fn validate(&self) -> Result<()> {
        if self.appname.trim().is_empty() {
            return Err(Error::config("appname must not be empty"));
        }
        if self.sinks.is_empty() {
            return Err(Error::config("at least one sink is required"));
        }
        for sink in &self.sinks {
            sink.policy()?;
            sink.zone()?;
        }
        Ok(())
    }
}

impl SinkConfig {
    /// Resolve the rotation policy of this sink
    pub fn policy(&self) -> Result<RotationPolicy> {
        match self.policy {
            PolicyName::None => Ok(RotationPolicy::None),
            PolicyName::Daily => Ok(RotationPolicy::Daily),
            PolicyName::Size => {
                let limit = self.size_limit.ok_or_else(|| {
                    Error::config(format!(
                        "sink {}: size policy requires size_limit",
                        self.prefix.display()
                    ))
                })?;
                Ok(RotationPolicy::FileSize(limit))
            }
            PolicyName::Timed => match self.cycle_secs {
                Some(secs) if secs > 0 => Ok(RotationPolicy::TimeLimit(Duration::from_secs(secs))),
                _ => Err(Error::config(format!(
                    "sink {}: timed policy requires a positive cycle_secs",
                    self.prefix.display()
                ))),
            },
        }
    }

    /// Resolve the configured zone, if any
    pub fn zone(&self) -> Result<Option<FixedOffset>> {
        match self.utc_offset_secs {
            None => Ok(None),
            Some(secs) => FixedOffset::east_opt(secs).map(Some).ok_or_else(|| {
                Error::config(format!("utc_offset_secs out of range: {}", secs))
            }),
        }
    }
}

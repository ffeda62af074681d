//! Error types for rotlog

use std::path::PathBuf;

/// rotlog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log file is closed: {0}")]
    Closed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for rotlog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        Error::Scheduler(msg.into())
    }

    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }
}

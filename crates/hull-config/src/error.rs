//! Error types for configuration loading, validation and the settings store.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("settings file {} is not a JSON object", .0.display())]
    SettingsShape(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

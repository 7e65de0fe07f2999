//! Error handling for the Hull CLI.
//!
//! `CliError` is the top-level error returned by every command. Library errors
//! from `hull-protocol` and `hull-config` convert into it automatically, and
//! the binary turns it into a `miette` report at the very end. Hints attached
//! with [`ResultExt::hint`] end up in the report's help section.
//!
//! # Example
//!
//! ```rust,no_run
//! use hull_cli::error::{Result, ResultExt};
//! use hull_config::SettingsStore;
//!
//! fn open_settings(path: &str) -> Result<SettingsStore> {
//!     SettingsStore::open(path).hint("The settings file must contain a JSON object")
//! }
//! ```

pub mod miette;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] hull_config::ConfigError),

    /// The scheme resolver rejected its setup (scheme token, locale entries).
    #[error("Scheme setup failed: {0}")]
    Protocol(#[from] hull_protocol::ProtocolError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Missing file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dev server: {0}")]
    Server(String),

    /// The host process could not be started
    #[error("Failed to launch host '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Supervision stopped before the host exited on its own
    #[error("Supervision ended: {0}")]
    Supervisor(String),

    #[error("Watching files failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),

    /// Another error plus advice for the operator
    #[error("{source}")]
    Hinted {
        #[source]
        source: Box<CliError>,
        hint: String,
    },
}

impl CliError {
    /// Operator advice attached to this error, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            CliError::Hinted { hint, .. } => Some(hint),
            _ => None,
        }
    }

    /// The error without any attached hint.
    pub fn root(&self) -> &CliError {
        match self {
            CliError::Hinted { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Attach operator-facing detail to any error convertible into [`CliError`].
pub trait ResultExt<T> {
    /// Attach a hint shown below the error message.
    fn hint(self, hint: impl Into<String>) -> Result<T>;

    /// Prefix the error message with what was being attempted.
    fn context(self, action: impl fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn hint(self, hint: impl Into<String>) -> Result<T> {
        self.map_err(|err| CliError::Hinted {
            source: Box::new(err.into()),
            hint: hint.into(),
        })
    }

    fn context(self, action: impl fmt::Display) -> Result<T> {
        self.map_err(|err| match err.into() {
            // Keep the hint outermost so it still reaches the report.
            CliError::Hinted { source, hint } => CliError::Hinted {
                source: Box::new(CliError::Custom(format!("{action}: {source}"))),
                hint,
            },
            other => CliError::Custom(format!("{action}: {other}")),
        })
    }
}

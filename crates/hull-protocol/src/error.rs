//! Error types for resolver construction.
//!
//! Resolution itself never fails; these only surface while building a
//! [`SchemeResolver`](crate::SchemeResolver) from configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid scheme name '{0}': must start with a letter and contain only letters, digits, '+', '-' or '.'")]
    InvalidScheme(String),

    #[error("default locale '{0}' has no entry in the locale table")]
    MissingDefaultLocale(String),

    #[error("entry '{entry}' for locale '{locale}' escapes the asset root")]
    EntryEscapesRoot { locale: String, entry: String },
}

//! Configuration errors

use thiserror::Error;

/// Why an entity could not be built from its configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown {kind} class '{class}'")]
    UnknownClass { kind: &'static str, class: String },

    #[error("invalid options for {class}: {reason}")]
    InvalidOptions { class: String, reason: String },

    #[error("widget {class} requires a data source")]
    MissingDataSource { class: String },

    #[error("unknown data source '{0}'")]
    UnknownDataSource(String),

    #[error("alias '{alias}' of {display} is already used by {existing}")]
    DuplicateAlias {
        alias: String,
        display: String,
        existing: String,
    },

    #[error("invalid display: {0}")]
    InvalidDisplay(String),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

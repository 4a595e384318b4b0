use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures while loading, validating or persisting client settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("No configuration directory available (tried {0})")]
    NoConfigDir(PathBuf),
}

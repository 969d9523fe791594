//! Typed outcomes for store operations.

use std::path::{Path, PathBuf};

/// Errors surfaced by the profile store.
///
/// "Not found" is never an error here: lookups return `Option`/`bool`.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// A location could not be computed (no home directory, missing project root,
    /// or an unexpected filesystem error while walking ancestors).
    #[error("could not resolve {what}: {reason}")]
    Resolution { what: String, reason: String },

    /// The store index exists but is not valid JSON for its shape.
    #[error("store index at {} is corrupt: {source}", path.display())]
    Corruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A profile or slim config file was asked for in parsed form but does not
    /// parse.
    #[error("config at {} is not valid JSON for its shape: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn resolution(what: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Resolution {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// True when the error means the on-disk index must not be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::Corruption { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

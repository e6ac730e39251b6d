use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the mirror engine.
///
/// Only `Config` is fatal; every other variant degrades the current cycle
/// to partial completion and is reported through the log.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid configuration: {field} - {reason}")]
    Config { field: String, reason: String },

    #[error("Scan aborted at {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Change detection failed for {path:?}: {source}")]
    Detect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy failed: {from:?} -> {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete stale path {path:?}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Whether this error must stop the daemon before any cycle runs.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MirrorError::Config { .. } | MirrorError::ConfigParse(_))
    }
}

pub type MirrorResult<T> = Result<T, MirrorError>;

//! Error types for agentsync-fs

use std::path::PathBuf;

/// Result type for agentsync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in agentsync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    /// Wrap an I/O error with the path it happened at.
    ///
    /// `ErrorKind::NotFound` is surfaced as [`Error::NotFound`] so callers can
    /// treat absence separately from real failures.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error reports a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

//! Error types for agentsync-core

use std::path::PathBuf;

/// Result type for agentsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in agentsync-core operations
///
/// Merges never fail on conflicting values; the protected-key rule settles
/// them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path that had to exist was absent
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// A JSON document could not be parsed or had the wrong shape
    #[error("Invalid document at {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// A batch failed and every recorded snapshot was restored
    #[error("Batch rolled back ({} path(s) reverted): {source}", .reverted.len())]
    RolledBack {
        reverted: Vec<PathBuf>,
        #[source]
        source: Box<Error>,
    },

    /// A snapshot could not be restored; the pre-sync state is not guaranteed
    #[error("Failed to restore {path} during rollback: {reason}")]
    RestoreFailed { path: PathBuf, reason: String },

    /// A per-target task could not complete
    #[error("Target {root} failed: {message}")]
    Target { root: PathBuf, message: String },

    /// Filesystem error from agentsync-fs
    #[error(transparent)]
    Fs(agentsync_fs::Error),

    /// Adapter error from agentsync-adapters
    #[error(transparent)]
    Adapter(#[from] agentsync_adapters::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<agentsync_fs::Error> for Error {
    fn from(err: agentsync_fs::Error) -> Self {
        match err {
            agentsync_fs::Error::NotFound { path } => Self::NotFound { path },
            other => Self::Fs(other),
        }
    }
}

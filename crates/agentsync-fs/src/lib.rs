//! Filesystem primitives for agentsync
//!
//! Provides the content hasher, atomic and recursive write helpers, and a
//! format-agnostic configuration store. Everything above this crate treats
//! the filesystem through these functions.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, content_fingerprint, fingerprint, is_ignored, newest_mtime};
pub use io::LinkOutcome;

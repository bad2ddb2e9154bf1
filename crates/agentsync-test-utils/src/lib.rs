//! Shared test utilities for the agentsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`mtime`]: pin modification times so drift tests are deterministic
//! - [`source`]: [`SourceFixture`] builder for a source-of-truth tree
//! - [`project`]: [`ProjectFixture`] for target directories

pub mod mtime;
pub mod project;
pub mod source;

pub use project::ProjectFixture;
pub use source::SourceFixture;

//! Host application adapters for agentsync.
//!
//! Every target directory belongs to one host application. The host decides
//! where artifacts live, how settings keys are spelled and which command
//! registers a remote tool. This crate models the supported hosts as a closed
//! set of [`TargetKind`] variants, each backed by a [`FormatAdapter`].
//!
//! The canonical dialect is the Claude one: source documents are written in
//! it, protected key paths are expressed in it, and every adapter translates
//! to and from it.

pub mod adapter;
pub mod category;
pub mod claude;
pub mod dialect;
pub mod error;
pub mod gemini;
pub mod kind;
pub mod logging;

pub use adapter::{Direction, FormatAdapter, RegistrationCommand, RegistryLocation};
pub use category::Category;
pub use claude::ClaudeAdapter;
pub use dialect::normalize_definition;
pub use error::{Error, Result};
pub use gemini::GeminiAdapter;
pub use kind::TargetKind;

//! Error types for agentsync-adapters

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown target kind: {0}")]
    UnknownKind(String),

    #[error("Invalid remote tool definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

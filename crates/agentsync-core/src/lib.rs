//! Synchronization engine for agentsync
//!
//! This crate classifies a source tree of configuration artifacts against
//! each target, merges settings documents without clobbering the keys a user
//! owns, and applies the result in all-or-nothing batches.

pub mod artifact;
pub mod backup;
pub mod change_set;
pub mod classify;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod merge;
pub mod orchestrator;
pub mod preferences;
pub mod register;
pub mod registry;
pub mod settings;
pub mod target;

pub use artifact::Artifact;
pub use backup::{BackupLedger, BackupRecord};
pub use change_set::{CategoryChanges, ChangeSet};
pub use classify::{Classification, DEFAULT_SKEW, DiffClassifier, classify};
pub use error::{Error, Result};
pub use executor::{
    ApplyMode, BatchReport, BatchState, ExcludedItem, ExecutorOptions, SyncExecutor,
};
pub use manifest::SyncManifest;
pub use merge::{MergeEngine, MergeResult, ProtectedKeySpec};
pub use orchestrator::{SyncSession, TargetOutcome, TargetSyncReport};
pub use preferences::{SyncPreferences, TargetDecl};
pub use register::{
    CommandRegistrar, RegistrationOutcome, RegistrationPlan, RegistrationStatus,
    RemoteToolRegistrar,
};
pub use target::Target;

//! Persisted sync preferences
//!
//! Loaded once by the caller and passed explicitly into the executor and the
//! session; nothing in the engine reads them from a global.

use crate::classify::DiffClassifier;
use crate::executor::{ApplyMode, ExecutorOptions};
use crate::merge::{MergeEngine, ProtectedKeySpec, DEFAULT_ADDITIVE_KEYS, DEFAULT_PROTECTED_KEYS};
use crate::target::Target;
use crate::Result;
use agentsync_adapters::TargetKind;
use agentsync_fs::ConfigStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A target declared in preferences. Without a kind, every host found under
/// `path` becomes a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDecl {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TargetKind>,
}

impl TargetDecl {
    pub fn resolve(&self) -> Vec<Target> {
        match self.kind {
            Some(kind) => vec![Target::new(&self.path, kind)],
            None => Target::discover(&self.path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPreferences {
    /// Apply mode used when the caller does not pick one
    pub mode: ApplyMode,
    /// Link artifacts instead of copying them
    pub link: bool,
    /// Overwrite drifted target items in forward mode
    pub prune: bool,
    pub skew_secs: u64,
    pub protected_keys: Vec<String>,
    pub additive_keys: Vec<String>,
    pub registration_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub targets: Vec<TargetDecl>,
}

impl Default for SyncPreferences {
    fn default() -> Self {
        Self {
            mode: ApplyMode::Forward,
            link: false,
            prune: false,
            skew_secs: 2,
            protected_keys: DEFAULT_PROTECTED_KEYS.iter().map(|s| s.to_string()).collect(),
            additive_keys: DEFAULT_ADDITIVE_KEYS.iter().map(|s| s.to_string()).collect(),
            registration_timeout_secs: 30,
            source: None,
            targets: Vec::new(),
        }
    }
}

impl SyncPreferences {
    /// `<config_dir>/agentsync/preferences.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("agentsync").join("preferences.toml"))
    }

    /// Load preferences from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let prefs = ConfigStore::new().load_or_default(path)?;
        tracing::debug!(path = %path.display(), "Loaded preferences");
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.skew_secs)
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_secs(self.registration_timeout_secs)
    }

    pub fn merge_engine(&self) -> MergeEngine {
        MergeEngine::new(ProtectedKeySpec::new(
            self.protected_keys.iter().cloned(),
            self.additive_keys.iter().cloned(),
        ))
    }

    pub fn classifier(&self) -> DiffClassifier {
        DiffClassifier::new(self.skew(), self.merge_engine())
    }

    /// Executor options for `mode` carrying the stored link and prune flags.
    pub fn executor_options(&self, mode: ApplyMode) -> ExecutorOptions {
        ExecutorOptions {
            mode,
            link: self.link,
            prune: self.prune,
            dry_run: false,
        }
    }

    /// Every declared target, with undeclared kinds discovered on disk.
    pub fn resolve_targets(&self) -> Vec<Target> {
        self.targets.iter().flat_map(TargetDecl::resolve).collect()
    }
}

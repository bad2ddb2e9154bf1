//! Consumer directories and where agentsync keeps its state inside them

use agentsync_adapters::{FormatAdapter, TargetKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under each target root holding the manifest and batch backups
pub const STATE_DIR: &str = ".agentsync";

/// One consumer directory, tagged with the host application that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub root: PathBuf,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(root: impl Into<PathBuf>, kind: TargetKind) -> Self {
        Self {
            root: root.into(),
            kind,
        }
    }

    /// Every host application found under `root`, one target per host.
    pub fn discover(root: &Path) -> Vec<Target> {
        TargetKind::discover(root)
            .into_iter()
            .map(|kind| Target::new(root, kind))
            .collect()
    }

    pub fn adapter(&self) -> &'static dyn FormatAdapter {
        self.kind.adapter()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Manifest file, one per host so that two hosts sharing a project root
    /// keep independent sync records.
    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir()
            .join(format!("manifest.{}.json", self.kind.as_str()))
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.state_dir().join("backups")
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.root.display(), self.kind)
    }
}

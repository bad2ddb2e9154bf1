//! Record of the last successful forward sync of a target

use crate::target::Target;
use crate::Result;
use agentsync_fs::ConfigStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Written after a fully committed forward batch. Only status reporting
/// reads it; classification never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncManifest {
    pub last_sync_timestamp: DateTime<Utc>,
    pub source_root: String,
    pub item_count: usize,
}

impl SyncManifest {
    pub fn new(source_root: &Path, item_count: usize) -> Self {
        Self {
            last_sync_timestamp: Utc::now(),
            source_root: source_root.display().to_string(),
            item_count,
        }
    }

    /// Read the manifest of `target`, `None` if it was never synced.
    pub fn read(target: &Target) -> Result<Option<SyncManifest>> {
        match ConfigStore::new().load(&target.manifest_path()) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(agentsync_fs::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, target: &Target) -> Result<()> {
        ConfigStore::new().save(&target.manifest_path(), self)?;
        Ok(())
    }
}

//! Diff classification of source artifacts against a target

use crate::artifact::{self, Artifact};
use crate::change_set::{CategoryChanges, ChangeSet};
use crate::merge::MergeEngine;
use crate::registry;
use crate::settings;
use crate::target::Target;
use crate::Result;
use agentsync_adapters::Category;
use agentsync_fs::{fingerprint, io, newest_mtime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Grace period absorbing the mtime bump that copying itself causes.
pub const DEFAULT_SKEW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Absent on the target
    Missing,
    /// Differs, and the target is not clearly newer
    Outdated,
    /// Differs, and the target was edited after the source beyond the skew
    Drifted,
    Unchanged,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Outdated => "outdated",
            Self::Drifted => "drifted",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a source path against its target counterpart.
///
/// Equal newest-mtimes, or a target newer by no more than `skew`, resolve to
/// [`Classification::Outdated`]. A target that is a dangling link is also
/// outdated.
pub fn classify(source: &Path, target: &Path, skew: Duration) -> Result<Classification> {
    if !io::exists(target) {
        return Ok(Classification::Missing);
    }

    let source_fp = fingerprint(source)?;
    let target_fp = match fingerprint(target) {
        Ok(fp) => fp,
        Err(e) if e.is_not_found() => return Ok(Classification::Outdated),
        Err(e) => return Err(e.into()),
    };
    if source_fp == target_fp {
        return Ok(Classification::Unchanged);
    }

    by_mtime(source, target, skew)
}

/// The tie-break between two differing paths: drifted when the target was
/// modified after the source by more than `skew`.
fn by_mtime(source: &Path, target: &Path, skew: Duration) -> Result<Classification> {
    let source_newest = newest_mtime(source)?;
    let target_newest = newest_mtime(target)?;
    if target_newest > source_newest + skew {
        Ok(Classification::Drifted)
    } else {
        Ok(Classification::Outdated)
    }
}

/// Builds change sets for targets using one skew and one merge engine.
#[derive(Debug, Clone)]
pub struct DiffClassifier {
    skew: Duration,
    merge: MergeEngine,
}

impl Default for DiffClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SKEW, MergeEngine::default())
    }
}

impl DiffClassifier {
    pub fn new(skew: Duration, merge: MergeEngine) -> Self {
        Self { skew, merge }
    }

    pub fn skew(&self) -> Duration {
        self.skew
    }

    /// Classify every source-side artifact of `categories` against `target`.
    pub fn build_change_set(
        &self,
        source_root: &Path,
        target: &Target,
        categories: &[Category],
    ) -> Result<ChangeSet> {
        let mut change_set = ChangeSet::default();

        for &category in categories {
            let inventory = artifact::inventory(source_root, target, category)?;
            let mut changes = CategoryChanges {
                total: inventory.len(),
                ..Default::default()
            };

            if category == Category::RemoteToolRegistration {
                let source = registry::read_source_registry(source_root)?;
                let existing = registry::read_target_registry(target)?;
                for (name, definition) in &source {
                    let classification =
                        registry::classify_registration(name, definition, &existing);
                    tracing::debug!(name = %name, %classification, "Classified registration");
                    changes.record(name.clone(), classification);
                }
            } else {
                for item in &inventory {
                    let classification = self.classify_artifact(target, item)?;
                    tracing::debug!(
                        category = %category,
                        name = %item.name,
                        %classification,
                        "Classified artifact"
                    );
                    changes.record(item.name.clone(), classification);
                }
            }

            change_set.insert(category, changes);
        }

        tracing::info!(
            root = %target.root.display(),
            kind = %target.kind,
            total = change_set.total(),
            drifted = change_set.drifted_count(),
            "Built change set"
        );
        Ok(change_set)
    }

    fn classify_artifact(&self, target: &Target, item: &Artifact) -> Result<Classification> {
        if item.category != Category::SharedSettings {
            return classify(&item.source_path, &item.target_path, self.skew);
        }

        if !io::exists(&item.target_path) {
            return Ok(Classification::Missing);
        }
        let plan = settings::plan_settings(
            &self.merge,
            target.adapter(),
            &item.source_path,
            &item.target_path,
        )?;
        if !plan.result.updated {
            return Ok(Classification::Unchanged);
        }
        by_mtime(&item.source_path, &item.target_path, self.skew)
    }
}

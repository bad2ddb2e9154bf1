//! Transactional application of a change set to one target
//!
//! A batch walks the categories in their fixed order and, for every item,
//! snapshots the write destination before writing it. The first failure
//! restores every snapshot of the batch in reverse order and surfaces the
//! original error, so callers only ever observe a committed batch or a
//! rolled-back one.

use crate::artifact::Artifact;
use crate::backup::BackupLedger;
use crate::change_set::ChangeSet;
use crate::manifest::SyncManifest;
use crate::merge::MergeEngine;
use crate::register::RegistrationPlan;
use crate::registry::{self, Registry};
use crate::settings;
use crate::target::Target;
use crate::{Error, Result};
use agentsync_adapters::Category;
use agentsync_fs::{LinkOutcome, io};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Direction of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMode {
    /// Source to target, for missing and outdated items
    #[default]
    Forward,
    /// Target to source, for drifted items only
    Backport,
}

impl std::fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Forward => "forward",
            Self::Backport => "backport",
        })
    }
}

/// Lifecycle of a batch. `Committed` and `RolledBack` are terminal.
///
/// A dry-run report never leaves `Planning`; its `dry_run` flag marks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchState {
    Planning,
    Applying,
    Committed,
    RollingBack,
    RolledBack,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub mode: ApplyMode,
    /// Symlink artifacts instead of copying them
    pub link: bool,
    /// In forward mode, also overwrite drifted items
    pub prune: bool,
    /// Plan and report without touching the filesystem
    pub dry_run: bool,
}

/// A drifted item left out of a forward batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedItem {
    pub category: Category,
    pub name: String,
}

/// What a batch did, or would do under `dry_run`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub target: Target,
    pub mode: ApplyMode,
    pub state: BatchState,
    /// Items written in this batch
    pub touched: usize,
    pub applied: BTreeMap<Category, usize>,
    pub excluded_drifted: Vec<ExcludedItem>,
    /// Remote tools for the registrar to register on the target
    pub registrations: RegistrationPlan,
    pub actions: Vec<String>,
    /// Unified diffs of settings documents, filled in dry runs
    pub previews: Vec<String>,
    pub warnings: Vec<String>,
    pub dry_run: bool,
}

impl BatchReport {
    fn new(target: &Target, options: &ExecutorOptions) -> Self {
        Self {
            target: target.clone(),
            mode: options.mode,
            state: BatchState::Planning,
            touched: 0,
            applied: BTreeMap::new(),
            excluded_drifted: Vec::new(),
            registrations: RegistrationPlan::new(),
            actions: Vec::new(),
            previews: Vec::new(),
            warnings: Vec::new(),
            dry_run: options.dry_run,
        }
    }
}

/// One planned write.
#[derive(Debug)]
enum Step {
    /// Copy or link `from` over `to`
    Copy {
        artifact: Artifact,
        from: PathBuf,
        to: PathBuf,
    },
    /// Merge the source settings document into the target's
    MergeSettings { artifact: Artifact },
    /// Write the target settings document, in canonical dialect, over the source's
    BackportSettings { artifact: Artifact },
    /// Write pulled registrations into the source registry
    BackportRegistrations { entries: Registry },
}

impl Step {
    fn category(&self) -> Category {
        match self {
            Self::Copy { artifact, .. }
            | Self::MergeSettings { artifact }
            | Self::BackportSettings { artifact } => artifact.category,
            Self::BackportRegistrations { .. } => Category::RemoteToolRegistration,
        }
    }

    fn destination(&self, source_root: &Path) -> PathBuf {
        match self {
            Self::Copy { to, .. } => to.clone(),
            Self::MergeSettings { artifact } => artifact.target_path.clone(),
            Self::BackportSettings { artifact } => artifact.source_path.clone(),
            Self::BackportRegistrations { .. } => registry::source_registry_path(source_root),
        }
    }

    fn count(&self) -> usize {
        match self {
            Self::BackportRegistrations { entries } => entries.len(),
            _ => 1,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Copy { artifact, from, to } => format!(
                "copy {} {} from {} to {}",
                artifact.category,
                artifact.name,
                from.display(),
                to.display()
            ),
            Self::MergeSettings { artifact } => format!(
                "merge {} into {}",
                artifact.name,
                artifact.target_path.display()
            ),
            Self::BackportSettings { artifact } => format!(
                "pull {} from {} into {}",
                artifact.name,
                artifact.target_path.display(),
                artifact.source_path.display()
            ),
            Self::BackportRegistrations { entries } => format!(
                "pull registrations {} into source registry",
                entries.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// Applies change sets to a single target.
pub struct SyncExecutor {
    source_root: PathBuf,
    target: Target,
    merge: MergeEngine,
    options: ExecutorOptions,
}

impl SyncExecutor {
    pub fn new(
        source_root: impl Into<PathBuf>,
        target: Target,
        merge: MergeEngine,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target,
            merge,
            options,
        }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Run one batch for `change_set`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RolledBack`] carrying the failure that triggered the
    /// rollback, or [`Error::RestoreFailed`] if the rollback itself failed and
    /// the target may be left partially written.
    pub fn execute(&self, change_set: &ChangeSet) -> Result<BatchReport> {
        let mut report = BatchReport::new(&self.target, &self.options);
        let steps = self.plan(change_set, &mut report)?;

        if self.options.dry_run {
            for step in &steps {
                report.actions.push(format!("[dry-run] Would {}", step.describe()));
                if let Step::MergeSettings { artifact } = step {
                    let plan = settings::plan_settings(
                        &self.merge,
                        self.target.adapter(),
                        &artifact.source_path,
                        &artifact.target_path,
                    )?;
                    report.previews.push(plan.unified_diff(&artifact.name)?);
                }
            }
            for name in report.registrations.keys() {
                report
                    .actions
                    .push(format!("[dry-run] Would register {name}"));
            }
            return Ok(report);
        }

        report.state = BatchState::Applying;
        let mut ledger = BackupLedger::for_batch(&self.target.backups_dir());
        tracing::info!(
            root = %self.target.root.display(),
            kind = %self.target.kind,
            mode = %self.options.mode,
            steps = steps.len(),
            "Applying batch"
        );

        for step in &steps {
            if let Err(err) = self.apply_step(&mut ledger, step, &mut report) {
                report.state = BatchState::RollingBack;
                return Err(self.roll_back(ledger, err));
            }
            *report.applied.entry(step.category()).or_default() += step.count();
            report.touched += step.count();
        }

        report.state = BatchState::Committed;
        self.commit(ledger, &mut report);
        Ok(report)
    }

    fn plan(&self, change_set: &ChangeSet, report: &mut BatchReport) -> Result<Vec<Step>> {
        let mut steps = Vec::new();

        for (category, changes) in change_set.iter() {
            match self.options.mode {
                ApplyMode::Forward => {
                    let mut names: Vec<&String> =
                        changes.missing.iter().chain(&changes.outdated).collect();
                    if self.options.prune {
                        names.extend(&changes.drifted);
                    } else {
                        for name in &changes.drifted {
                            tracing::warn!(
                                category = %category,
                                name = %name,
                                "Target edits are newer than the source, leaving them in place"
                            );
                            report.excluded_drifted.push(ExcludedItem {
                                category,
                                name: name.clone(),
                            });
                        }
                    }

                    if category == Category::RemoteToolRegistration {
                        let source = registry::read_source_registry(&self.source_root)?;
                        for name in names {
                            if let Some(definition) = source.get(name) {
                                report.registrations.insert(name.clone(), definition.clone());
                            }
                        }
                        continue;
                    }

                    for name in names {
                        let artifact =
                            Artifact::locate(&self.source_root, &self.target, category, name);
                        steps.push(if category == Category::SharedSettings {
                            Step::MergeSettings { artifact }
                        } else {
                            Step::Copy {
                                from: artifact.source_path.clone(),
                                to: artifact.target_path.clone(),
                                artifact,
                            }
                        });
                    }
                }
                ApplyMode::Backport => {
                    if changes.drifted.is_empty() {
                        continue;
                    }
                    if category == Category::RemoteToolRegistration {
                        let existing = registry::read_target_registry(&self.target)?;
                        let entries: Registry = changes
                            .drifted
                            .iter()
                            .filter_map(|name| {
                                existing.get(name).map(|def| (name.clone(), def.clone()))
                            })
                            .collect();
                        if !entries.is_empty() {
                            steps.push(Step::BackportRegistrations { entries });
                        }
                        continue;
                    }
                    for name in &changes.drifted {
                        let artifact =
                            Artifact::locate(&self.source_root, &self.target, category, name);
                        steps.push(if category == Category::SharedSettings {
                            Step::BackportSettings { artifact }
                        } else {
                            Step::Copy {
                                from: artifact.target_path.clone(),
                                to: artifact.source_path.clone(),
                                artifact,
                            }
                        });
                    }
                }
            }
        }

        Ok(steps)
    }

    fn apply_step(
        &self,
        ledger: &mut BackupLedger,
        step: &Step,
        report: &mut BatchReport,
    ) -> Result<()> {
        let destination = step.destination(&self.source_root);

        match step {
            Step::Copy { from, to, .. } => {
                ledger.snapshot(&destination)?;
                if self.options.link && self.options.mode == ApplyMode::Forward {
                    if io::link_or_copy(from, to)? == LinkOutcome::Copied {
                        report
                            .warnings
                            .push(format!("Copied {} instead of linking", to.display()));
                    }
                } else {
                    io::copy_tree(from, to)?;
                }
            }
            Step::MergeSettings { artifact } => {
                let plan = settings::plan_settings(
                    &self.merge,
                    self.target.adapter(),
                    &artifact.source_path,
                    &artifact.target_path,
                )?;
                let rendered = plan.render()?;
                ledger.snapshot(&destination)?;
                io::write_text(&destination, &rendered)?;
                for path in &plan.result.preserved {
                    report
                        .actions
                        .push(format!("Preserved {path} in {}", artifact.name));
                }
            }
            Step::BackportSettings { artifact } => {
                let rendered =
                    settings::canonical_document(self.target.adapter(), &artifact.target_path)?;
                ledger.snapshot(&destination)?;
                io::write_text(&destination, &rendered)?;
            }
            Step::BackportRegistrations { entries } => {
                let rendered = registry::render_source_registry(&self.source_root, entries)?;
                ledger.snapshot(&destination)?;
                io::write_text(&destination, &rendered)?;
            }
        }

        tracing::debug!(step = %step.describe(), "Applied");
        report.actions.push(step.describe());
        Ok(())
    }

    fn roll_back(&self, ledger: BackupLedger, cause: Error) -> Error {
        tracing::warn!(error = %cause, "Batch failed, rolling back");

        let mut reverted = Vec::new();
        for record in ledger.records().iter().rev() {
            if let Err(restore_err) = ledger.restore(record) {
                tracing::error!(error = %restore_err, "Rollback aborted");
                return restore_err;
            }
            reverted.push(record.original_path.clone());
        }
        if let Err(e) = ledger.discard() {
            tracing::warn!(error = %e, "Could not remove batch backups");
        }

        tracing::info!(reverted = reverted.len(), "Batch rolled back");
        Error::RolledBack {
            reverted,
            source: Box::new(cause),
        }
    }

    fn commit(&self, ledger: BackupLedger, report: &mut BatchReport) {
        for record in ledger.records() {
            if let Err(e) = ledger.release(record) {
                report
                    .warnings
                    .push(format!("Could not release backup of {}: {e}", record.original_path.display()));
            }
        }
        if let Err(e) = ledger.discard() {
            report
                .warnings
                .push(format!("Could not remove batch backups: {e}"));
        }

        if self.options.mode == ApplyMode::Forward {
            let manifest = SyncManifest::new(&self.source_root, report.touched);
            if let Err(e) = manifest.write(&self.target) {
                report.warnings.push(format!("Could not write manifest: {e}"));
            }
        }

        tracing::info!(
            root = %self.target.root.display(),
            touched = report.touched,
            excluded = report.excluded_drifted.len(),
            "Batch committed"
        );
    }
}

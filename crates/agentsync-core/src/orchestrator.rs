//! Running the engine across every configured target

use crate::change_set::ChangeSet;
use crate::executor::{BatchReport, BatchState, ExecutorOptions, SyncExecutor};
use crate::manifest::SyncManifest;
use crate::preferences::SyncPreferences;
use crate::register::{RegistrationOutcome, RemoteToolRegistrar};
use crate::target::Target;
use crate::{Error, Result};
use agentsync_adapters::Category;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of one per-target operation. A failing target never stops the
/// others.
#[derive(Debug)]
pub struct TargetOutcome<T> {
    pub target: Target,
    pub result: Result<T>,
}

/// Everything a sync did to one target.
#[derive(Debug)]
pub struct TargetSyncReport {
    pub target: Target,
    /// `None` when classification itself failed
    pub change_set: Option<ChangeSet>,
    pub batch: Result<BatchReport>,
    pub registrations: Vec<RegistrationOutcome>,
}

impl TargetSyncReport {
    pub fn is_success(&self) -> bool {
        self.batch.is_ok() && self.registrations.iter().all(|r| !r.is_failure())
    }
}

/// A source root, its targets and the preferences governing them.
pub struct SyncSession {
    source_root: PathBuf,
    targets: Vec<Target>,
    preferences: Arc<SyncPreferences>,
}

impl SyncSession {
    pub fn new(source_root: impl Into<PathBuf>, targets: Vec<Target>, preferences: SyncPreferences) -> Self {
        Self {
            source_root: source_root.into(),
            targets,
            preferences: Arc::new(preferences),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn preferences(&self) -> &SyncPreferences {
        &self.preferences
    }

    /// Classify every target concurrently. Outcomes keep target order.
    pub async fn diff_all(&self) -> Vec<TargetOutcome<ChangeSet>> {
        let mut tasks = JoinSet::new();
        for (index, target) in self.targets.iter().cloned().enumerate() {
            let source_root = self.source_root.clone();
            let preferences = Arc::clone(&self.preferences);
            tasks.spawn_blocking(move || {
                let result = preferences
                    .classifier()
                    .build_change_set(&source_root, &target, &Category::ALL);
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<ChangeSet>>> =
            (0..self.targets.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Classification task failed"),
            }
        }

        self.targets
            .iter()
            .zip(results)
            .map(|(target, result)| TargetOutcome {
                target: target.clone(),
                result: result.unwrap_or_else(|| {
                    Err(Error::Target {
                        root: target.root.clone(),
                        message: "classification task did not complete".into(),
                    })
                }),
            })
            .collect()
    }

    /// Classify and apply each target in turn, then register planned remote
    /// tools for every committed forward batch.
    pub async fn apply_all(
        &self,
        options: ExecutorOptions,
        registrar: &dyn RemoteToolRegistrar,
    ) -> Vec<TargetSyncReport> {
        let classifier = self.preferences.classifier();
        let mut reports = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let change_set =
                match classifier.build_change_set(&self.source_root, target, &Category::ALL) {
                    Ok(change_set) => change_set,
                    Err(e) => {
                        tracing::warn!(root = %target.root.display(), error = %e, "Skipping target");
                        reports.push(TargetSyncReport {
                            target: target.clone(),
                            change_set: None,
                            batch: Err(e),
                            registrations: Vec::new(),
                        });
                        continue;
                    }
                };

            let executor = SyncExecutor::new(
                &self.source_root,
                target.clone(),
                self.preferences.merge_engine(),
                options,
            );
            let batch = executor.execute(&change_set);

            let registrations = match &batch {
                Ok(report)
                    if report.state == BatchState::Committed && !report.registrations.is_empty() =>
                {
                    registrar.register(target, &report.registrations).await
                }
                _ => Vec::new(),
            };

            reports.push(TargetSyncReport {
                target: target.clone(),
                change_set: Some(change_set),
                batch,
                registrations,
            });
        }

        reports
    }

    /// Last recorded sync of every target.
    pub fn status_all(&self) -> Vec<TargetOutcome<Option<SyncManifest>>> {
        self.targets
            .iter()
            .map(|target| TargetOutcome {
                target: target.clone(),
                result: SyncManifest::read(target),
            })
            .collect()
    }
}

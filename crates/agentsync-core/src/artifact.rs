//! Artifacts: named units of synchronization, recomputed every run

use crate::registry;
use crate::target::Target;
use crate::{Error, Result};
use agentsync_adapters::Category;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A named file, directory subtree or registry entry to synchronize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub category: Category,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

impl Artifact {
    /// Resolve the source and target paths of `name` in `category`.
    pub fn locate(source_root: &Path, target: &Target, category: Category, name: &str) -> Artifact {
        let adapter = target.adapter();
        let (source_path, target_path) = match category {
            Category::ExtensionBundle | Category::HookScript => {
                let source_dir = category.source_dir().unwrap_or_default();
                let target_dir = adapter.category_dir(category).unwrap_or_default();
                (
                    source_root.join(source_dir).join(name),
                    target.root.join(target_dir).join(name),
                )
            }
            Category::SharedSettings => (
                source_root.join("settings").join(name),
                target.root.join(adapter.translate_settings_path(name)),
            ),
            Category::RemoteToolRegistration => (
                registry::source_registry_path(source_root),
                target.root.join(adapter.registry_location().path),
            ),
        };

        Artifact {
            name: name.to_string(),
            category,
            source_path,
            target_path,
        }
    }
}

/// List the source-side inventory of one category, sorted by name.
///
/// A category whose source directory does not exist has an empty inventory.
pub fn inventory(source_root: &Path, target: &Target, category: Category) -> Result<Vec<Artifact>> {
    let names = match category {
        Category::ExtensionBundle => list_names(&source_root.join("extensions"), |p| p.is_dir())?,
        Category::HookScript => list_names(&source_root.join("hooks"), |_| true)?,
        Category::SharedSettings => list_names(&source_root.join("settings"), |p| {
            p.is_file() && p.extension().is_some_and(|e| e == "json")
        })?,
        Category::RemoteToolRegistration => {
            registry::read_source_registry(source_root)?.keys().cloned().collect()
        }
    };

    let mut artifacts: Vec<Artifact> = names
        .iter()
        .map(|name| Artifact::locate(source_root, target, category, name))
        .collect();
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}

fn list_names(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(agentsync_fs::Error::io(dir, e).into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::from(agentsync_fs::Error::io(dir, e)))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if agentsync_fs::is_ignored(&name) || !keep(&entry.path()) {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

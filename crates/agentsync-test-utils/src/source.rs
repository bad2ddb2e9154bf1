//! [`SourceFixture`] builder for source-of-truth trees

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary source root laid out as `extensions/`, `hooks/`, `settings/`
/// and `mcp.json`.
///
/// # Example
///
/// ```rust,no_run
/// use agentsync_test_utils::SourceFixture;
/// use serde_json::json;
///
/// let source = SourceFixture::new()
///     .extension("documenting", &[("SKILL.md", "# Documenting")])
///     .hook("guard.py", "print('ok')")
///     .settings("settings.json", &json!({"model": "opus"}));
/// assert!(source.root().join("extensions/documenting/SKILL.md").exists());
/// ```
pub struct SourceFixture {
    temp_dir: TempDir,
}

impl Default for SourceFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Add an extension bundle with the given `(relative path, content)` files.
    pub fn extension(self, name: &str, files: &[(&str, &str)]) -> Self {
        let dir = self.root().join("extensions").join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            write(&dir.join(file), content);
        }
        self
    }

    pub fn hook(self, name: &str, content: &str) -> Self {
        write(&self.root().join("hooks").join(name), content);
        self
    }

    pub fn settings(self, doc: &str, value: &Value) -> Self {
        write(
            &self.root().join("settings").join(doc),
            &serde_json::to_string_pretty(value).unwrap(),
        );
        self
    }

    /// Write `mcp.json` exactly as given.
    pub fn registry(self, value: &Value) -> Self {
        write(
            &self.root().join("mcp.json"),
            &serde_json::to_string_pretty(value).unwrap(),
        );
        self
    }
}

pub(crate) fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content)
        .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
}

//! [`ProjectFixture`] for target directories

use crate::source::write;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory that hosts one or more target applications.
pub struct ProjectFixture {
    temp_dir: TempDir,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    /// An empty project with no host marker directories.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A project with a `.claude/` marker directory.
    pub fn claude() -> Self {
        Self::new().with_marker(".claude")
    }

    /// A project with a `.gemini/` marker directory.
    pub fn gemini() -> Self {
        Self::new().with_marker(".gemini")
    }

    pub fn with_marker(self, marker: &str) -> Self {
        fs::create_dir_all(self.root().join(marker)).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        write(&self.path(relative), content);
        self
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> &Self {
        self.write(relative, &serde_json::to_string_pretty(value).unwrap())
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Could not read {relative}: {e}"))
    }

    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative))
            .unwrap_or_else(|e| panic!("{relative} is not valid JSON: {e}"))
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let full = self.path(relative);
        assert!(full.exists(), "Expected path to exist: {}", full.display());
    }

    pub fn assert_not_exists(&self, relative: &str) {
        let full = self.path(relative);
        assert!(
            fs::symlink_metadata(&full).is_err(),
            "Expected path NOT to exist: {}",
            full.display()
        );
    }
}

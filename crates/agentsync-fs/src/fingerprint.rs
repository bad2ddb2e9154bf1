//! Content fingerprints for files and directory trees
//!
//! A fingerprint uses the canonical `sha256:<hex>` format. Directory
//! fingerprints are computed over a `dir` marker line followed by the sorted
//! `name:childFingerprint` lines of their immediate children, so renames,
//! additions and removals all change the parent's fingerprint while
//! modification times never do. Entries matching [`is_ignored`] take no part
//! in either the fingerprint or the newest modification time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Separator between child entries of a directory fingerprint
const CHILD_SEPARATOR: &str = "\n";

/// First line of every directory digest, so a directory never hashes like a file
const DIRECTORY_MARKER: &str = "dir";

/// Editor and interpreter droppings that are never part of an artifact.
pub fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name == "__pycache__" || name.ends_with(".Zone.Identifier")
}

/// Opaque, fixed-length digest of an artifact's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The canonical string form (`sha256:<hex>`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint in-memory content.
pub fn content_fingerprint(content: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content);
    Fingerprint(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Fingerprint a file or, recursively, a directory tree.
///
/// Symbolic links are followed, so a linked artifact fingerprints the same as
/// the content it points to.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` does not exist, or an I/O error if
/// any entry cannot be read.
pub fn fingerprint(path: &Path) -> Result<Fingerprint> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if metadata.is_dir() {
        directory_fingerprint(path)
    } else {
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(content_fingerprint(&content))
    }
}

fn directory_fingerprint(path: &Path) -> Result<Fingerprint> {
    let mut children = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| Error::io(path, e))? {
        let entry = entry.map_err(|e| Error::io(path, e))?;
        if is_ignored(&entry.file_name().to_string_lossy()) {
            continue;
        }
        children.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));

    let mut lines = Vec::with_capacity(children.len() + 1);
    lines.push(DIRECTORY_MARKER.to_string());
    for (name, child) in &children {
        lines.push(format!("{}:{}", name, fingerprint(child)?));
    }

    Ok(content_fingerprint(lines.join(CHILD_SEPARATOR).as_bytes()))
}

/// Newest modification time found anywhere in the tree rooted at `path`,
/// including `path` itself.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` does not exist.
pub fn newest_mtime(path: &Path) -> Result<SystemTime> {
    let mut newest = SystemTime::UNIX_EPOCH;
    let walker = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(&e.file_name().to_string_lossy()));
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(path, e))?;
        let modified = entry
            .metadata()
            .map_err(|e| walk_error(entry.path(), e))?
            .modified()
            .map_err(|e| Error::io(entry.path(), e))?;
        if modified > newest {
            newest = modified;
        }
    }
    Ok(newest)
}

fn walk_error(path: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(path).to_path_buf();
    match err.into_io_error() {
        Some(io) => Error::io(path, io),
        None => Error::Io {
            path,
            source: std::io::Error::other("filesystem loop detected"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("bundle/nested")).unwrap();
        fs::write(dir.path().join("bundle/SKILL.md"), "# skill").unwrap();
        fs::write(dir.path().join("bundle/nested/run.py"), "print(1)").unwrap();
        dir
    }

    #[test]
    fn content_fingerprint_known_value() {
        let fp = content_fingerprint(b"hello world");
        assert_eq!(
            fp.as_str(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_fingerprint_matches_content_fingerprint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hook.sh");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(fingerprint(&path).unwrap(), content_fingerprint(b"hello world"));
    }

    #[test]
    fn directory_fingerprint_is_deterministic() {
        let dir = tree();
        let a = fingerprint(&dir.path().join("bundle")).unwrap();
        let b = fingerprint(&dir.path().join("bundle")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rename_changes_directory_fingerprint() {
        let dir = tree();
        let bundle = dir.path().join("bundle");
        let before = fingerprint(&bundle).unwrap();

        fs::rename(bundle.join("SKILL.md"), bundle.join("README.md")).unwrap();

        assert_ne!(before, fingerprint(&bundle).unwrap());
    }

    #[test]
    fn adding_and_removing_leaf_changes_fingerprint() {
        let dir = tree();
        let bundle = dir.path().join("bundle");
        let original = fingerprint(&bundle).unwrap();

        fs::write(bundle.join("extra.txt"), "").unwrap();
        let added = fingerprint(&bundle).unwrap();
        assert_ne!(original, added);

        fs::remove_file(bundle.join("nested/run.py")).unwrap();
        fs::remove_file(bundle.join("extra.txt")).unwrap();
        assert_ne!(original, fingerprint(&bundle).unwrap());
    }

    #[test]
    fn mtime_change_does_not_change_fingerprint() {
        let dir = tree();
        let bundle = dir.path().join("bundle");
        let before = fingerprint(&bundle).unwrap();

        let file = File::options()
            .write(true)
            .open(bundle.join("SKILL.md"))
            .unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(3600))
            .unwrap();

        assert_eq!(before, fingerprint(&bundle).unwrap());
    }

    #[test]
    fn empty_directory_and_empty_file_differ() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty_dir")).unwrap();
        fs::write(dir.path().join("empty_file"), "").unwrap();

        assert_ne!(
            fingerprint(&dir.path().join("empty_dir")).unwrap(),
            fingerprint(&dir.path().join("empty_file")).unwrap()
        );
    }

    #[test]
    fn ignored_entries_do_not_affect_fingerprint_or_mtime() {
        let dir = tree();
        let bundle = dir.path().join("bundle");
        let before = fingerprint(&bundle).unwrap();

        fs::create_dir_all(bundle.join("nested/__pycache__")).unwrap();
        let bytecode = bundle.join("nested/__pycache__/run.cpython-312.pyc");
        fs::write(&bytecode, "bytecode").unwrap();
        fs::write(bundle.join(".DS_Store"), "finder").unwrap();
        let future = SystemTime::now() + Duration::from_secs(86_400);
        File::options()
            .write(true)
            .open(&bytecode)
            .unwrap()
            .set_modified(future)
            .unwrap();

        assert_eq!(before, fingerprint(&bundle).unwrap());
        assert!(newest_mtime(&bundle).unwrap() < future);
        assert!(is_ignored("__pycache__"));
        assert!(!is_ignored("SKILL.md"));
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = fingerprint(&dir.path().join("absent")).unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    #[test]
    fn newest_mtime_sees_nested_files() {
        let dir = tree();
        let future = SystemTime::now() + Duration::from_secs(7200);
        File::options()
            .write(true)
            .open(dir.path().join("bundle/nested/run.py"))
            .unwrap()
            .set_modified(future)
            .unwrap();

        assert_eq!(newest_mtime(&dir.path().join("bundle")).unwrap(), future);
    }
}

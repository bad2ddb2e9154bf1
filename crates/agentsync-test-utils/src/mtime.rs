//! Modification-time control

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// A fixed point one day in the past, so tests never race the wall clock.
pub fn base_time() -> SystemTime {
    SystemTime::now() - Duration::from_secs(86_400)
}

/// Set the modification time of a single file or directory.
///
/// # Panics
/// Panics if the path cannot be opened or its time cannot be set.
pub fn set_mtime(path: &Path, when: SystemTime) {
    let file = if path.is_dir() {
        File::open(path)
    } else {
        File::options().write(true).open(path)
    }
    .unwrap_or_else(|e| panic!("set_mtime: cannot open {}: {e}", path.display()));
    file.set_modified(when)
        .unwrap_or_else(|e| panic!("set_mtime: cannot set time on {}: {e}", path.display()));
}

/// Set the modification time of `path` and everything beneath it.
pub fn set_tree_mtime(path: &Path, when: SystemTime) {
    // Children first, so setting a directory's time is not undone by its entries
    let entries: Vec<_> = WalkDir::new(path)
        .contents_first(true)
        .into_iter()
        .map(|e| e.unwrap_or_else(|e| panic!("set_tree_mtime: {e}")))
        .collect();
    for entry in entries {
        set_mtime(entry.path(), when);
    }
}

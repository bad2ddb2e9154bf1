//! Backup ledger implementation

use crate::{Error, Result};
use agentsync_fs::io;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Snapshot of one target path taken immediately before it was overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    /// Where the original now lives; `None` when nothing existed to back up
    pub backup_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

impl BackupRecord {
    pub fn is_noop(&self) -> bool {
        self.backup_path.is_none()
    }
}

/// Records the snapshots of a single batch, in creation order.
#[derive(Debug)]
pub struct BackupLedger {
    dir: PathBuf,
    records: Vec<BackupRecord>,
    seq: usize,
}

impl BackupLedger {
    /// Create a ledger storing its backups under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records: Vec::new(),
            seq: 0,
        }
    }

    /// Create a ledger in a fresh batch directory beneath `backups_root`.
    pub fn for_batch(backups_root: &Path) -> Self {
        Self::new(backups_root.join(Uuid::new_v4().to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    /// Move whatever exists at `path` into the batch directory.
    ///
    /// An absent path yields a no-op record, so that restoring it removes
    /// whatever the batch created there.
    pub fn snapshot(&mut self, path: &Path) -> Result<BackupRecord> {
        let backup_path = if io::exists(path) {
            self.seq += 1;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "root".into());
            let backup = self.dir.join(format!("{:04}-{}", self.seq, name));

            fs::create_dir_all(&self.dir).map_err(|e| agentsync_fs::Error::io(&self.dir, e))?;
            move_path(path, &backup)?;
            tracing::debug!(
                path = %path.display(),
                backup = %backup.display(),
                "Snapshot taken"
            );
            Some(backup)
        } else {
            tracing::debug!(path = %path.display(), "Nothing to snapshot");
            None
        };

        let record = BackupRecord {
            original_path: path.to_path_buf(),
            backup_path,
            timestamp: Utc::now(),
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Reinstate `record`, discarding whatever the batch left at its path.
    pub fn restore(&self, record: &BackupRecord) -> Result<()> {
        let original = &record.original_path;
        let restore_failed = |reason: String| Error::RestoreFailed {
            path: original.clone(),
            reason,
        };

        if let Some(backup) = &record.backup_path
            && !io::exists(backup)
        {
            return Err(restore_failed(format!(
                "backup {} no longer exists",
                backup.display()
            )));
        }

        io::remove_path(original).map_err(|e| restore_failed(e.to_string()))?;
        if let Some(backup) = &record.backup_path {
            move_path(backup, original).map_err(|e| restore_failed(e.to_string()))?;
        }

        tracing::debug!(path = %original.display(), "Restored");
        Ok(())
    }

    /// Delete the backup held by `record`.
    pub fn release(&self, record: &BackupRecord) -> Result<()> {
        if let Some(backup) = &record.backup_path {
            io::remove_path(backup)?;
        }
        Ok(())
    }

    /// Remove the batch directory and everything left in it.
    pub fn discard(self) -> Result<()> {
        io::remove_path(&self.dir)?;
        Ok(())
    }
}

/// Rename `from` to `to`, copying when the rename crosses filesystems.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| agentsync_fs::Error::io(parent, e))?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            copy_preserving_links(from, to)?;
            io::remove_path(from)?;
            Ok(())
        }
        Err(e) => Err(agentsync_fs::Error::io(from, e).into()),
    }
}

fn copy_preserving_links(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(from).map_err(|e| agentsync_fs::Error::io(from, e))?;
    if metadata.file_type().is_symlink() {
        let link = fs::read_link(from).map_err(|e| agentsync_fs::Error::io(from, e))?;
        relink(&link, to, from.is_dir())
    } else {
        io::copy_tree(from, to)?;
        Ok(())
    }
}

#[cfg(unix)]
fn relink(link: &Path, to: &Path, _is_dir: bool) -> Result<()> {
    std::os::unix::fs::symlink(link, to).map_err(|e| agentsync_fs::Error::io(to, e).into())
}

#[cfg(windows)]
fn relink(link: &Path, to: &Path, is_dir: bool) -> Result<()> {
    let result = if is_dir {
        std::os::windows::fs::symlink_dir(link, to)
    } else {
        std::os::windows::fs::symlink_file(link, to)
    };
    result.map_err(|e| agentsync_fs::Error::io(to, e).into())
}

#[cfg(not(any(unix, windows)))]
fn relink(_link: &Path, to: &Path, _is_dir: bool) -> Result<()> {
    Err(agentsync_fs::Error::io(
        to,
        std::io::Error::new(std::io::ErrorKind::Unsupported, "symbolic links unsupported"),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger(temp: &TempDir) -> BackupLedger {
        BackupLedger::new(temp.path().join("backups/batch"))
    }

    #[test]
    fn snapshot_then_restore_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "original").unwrap();

        let mut ledger = ledger(&temp);
        let record = ledger.snapshot(&path).unwrap();
        assert!(!path.exists());
        fs::write(&path, "overwritten").unwrap();

        ledger.restore(&record).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn snapshot_then_restore_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("skill");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/a.md"), "a").unwrap();
        let before = agentsync_fs::fingerprint(&dir).unwrap();

        let mut ledger = ledger(&temp);
        let record = ledger.snapshot(&dir).unwrap();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("new.md"), "new").unwrap();

        ledger.restore(&record).unwrap();
        assert_eq!(agentsync_fs::fingerprint(&dir).unwrap(), before);
    }

    #[test]
    fn absent_path_restores_to_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new-hook.py");

        let mut ledger = ledger(&temp);
        let record = ledger.snapshot(&path).unwrap();
        assert!(record.is_noop());
        fs::write(&path, "created by batch").unwrap();

        ledger.restore(&record).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn vanished_backup_fails_restore() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a");
        fs::write(&path, "x").unwrap();

        let mut ledger = ledger(&temp);
        let record = ledger.snapshot(&path).unwrap();
        ledger.release(&record).unwrap();

        let err = ledger.restore(&record).unwrap_err();
        assert!(matches!(err, Error::RestoreFailed { .. }));
    }

    #[test]
    fn records_keep_creation_order() {
        let temp = TempDir::new().unwrap();
        let mut ledger = ledger(&temp);
        for name in ["one", "two", "three"] {
            fs::write(temp.path().join(name), name).unwrap();
            ledger.snapshot(&temp.path().join(name)).unwrap();
        }

        let names: Vec<_> = ledger
            .records()
            .iter()
            .map(|r| r.original_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["one", "two", "three"]);

        let dir = ledger.dir().to_path_buf();
        ledger.discard().unwrap();
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_restored_as_links() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        fs::write(&real, "content").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut ledger = ledger(&temp);
        let record = ledger.snapshot(&link).unwrap();
        fs::write(&link, "replaced").unwrap();
        ledger.restore(&record).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), real);
    }
}

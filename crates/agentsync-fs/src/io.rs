//! Atomic writes, recursive copies and links

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// How an artifact ended up at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A symbolic link to the source was created
    Linked,
    /// Linking was unavailable; the content was copied instead
    Copied,
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock on the temp file while writing.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;

    // Temp file lives in the same directory so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = write_locked(&mut temp_file, content, path, &temp_path);
    drop(temp_file);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    // A symlink at the destination is replaced, not written through
    if fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
        if let Err(e) = fs::remove_file(path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(path, e));
        }
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(path, e));
    }

    Ok(())
}

fn write_locked(file: &mut fs::File, content: &[u8], path: &Path, temp_path: &Path) -> Result<()> {
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    file.write_all(content).map_err(|e| Error::io(temp_path, e))?;
    file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file, symlink or directory tree. Absent paths are not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}

/// Copy a file or directory tree from `src` to `dst`.
///
/// Anything already at `dst` is removed first, so the destination ends up an
/// exact replica of the source rather than a union of both.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    remove_path(dst)?;

    if !metadata.is_dir() {
        ensure_parent(dst)?;
        fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;
        return Ok(());
    }

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            match e.into_io_error() {
                Some(io) => Error::io(path, io),
                None => Error::Io {
                    path,
                    source: std::io::Error::other("filesystem loop detected"),
                },
            }
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::Io {
                path: entry.path().to_path_buf(),
                source: std::io::Error::other("entry escaped the copied tree"),
            })?;
        let dest = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| Error::io(&dest, e))?;
        }
    }

    tracing::trace!(src = %src.display(), dst = %dst.display(), "Copied tree");
    Ok(())
}

/// Create a symbolic link at `dst` pointing to `src`, falling back to a copy
/// when the platform refuses.
pub fn link_or_copy(src: &Path, dst: &Path) -> Result<LinkOutcome> {
    let is_dir = fs::metadata(src).map_err(|e| Error::io(src, e))?.is_dir();
    remove_path(dst)?;
    ensure_parent(dst)?;

    match symlink(src, dst, is_dir) {
        Ok(()) => Ok(LinkOutcome::Linked),
        Err(e) => {
            tracing::warn!(
                src = %src.display(),
                dst = %dst.display(),
                error = %e,
                "Symbolic link unavailable, copying instead"
            );
            copy_tree(src, dst)?;
            Ok(LinkOutcome::Copied)
        }
    }
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path, _is_dir: bool) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink(src: &Path, dst: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn symlink(_src: &Path, _dst: &Path, _is_dir: bool) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

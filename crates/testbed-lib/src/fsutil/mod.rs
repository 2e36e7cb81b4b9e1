//! Filesystem primitives for staging directories
//!
//! Recursive removal that never descends through symlinks, and recursive
//! creation that tolerates the directory appearing underneath it.

use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

/// Permission bits used for every directory the provisioner creates
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// What `delete_tree` removes when pointed at a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Remove the directory and everything under it
    Tree,
    /// Remove everything under the directory, keep the directory itself
    ChildrenOnly,
}

/// Outcome of a successful `delete_tree` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Nothing existed at the path
    NotFound,
    /// The path (or its contents) was removed
    Removed,
}

/// Delete `path` and everything below it.
///
/// Files and symlinks are unlinked directly. Directories are emptied
/// depth-first, children before parents; the first failure aborts the walk
/// and is returned, leaving unvisited siblings in place.
pub fn delete_tree(path: &Path, mode: RemoveMode) -> io::Result<Deletion> {
    if path.as_os_str().is_empty() {
        return Ok(Deletion::NotFound);
    }

    // symlink_metadata so a link to a directory is treated as a leaf
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Deletion::NotFound),
        Err(e) => return Err(e),
    };

    if !metadata.is_dir() {
        fs::remove_file(path)?;
        trace!(path = %path.display(), "unlinked");
        return Ok(Deletion::Removed);
    }

    remove_children(path)?;

    if mode == RemoveMode::Tree {
        fs::remove_dir(path)?;
    }

    trace!(path = %path.display(), ?mode, "removed directory tree");
    Ok(Deletion::Removed)
}

fn remove_children(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // DirEntry::file_type does not follow symlinks
        if entry.file_type()?.is_dir() {
            remove_children(&path)?;
            fs::remove_dir(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

/// Ensure `path` exists as a directory, creating missing ancestors first.
///
/// An existing directory is success. A creation that fails because someone
/// else created the directory in the meantime is also success.
pub fn mkdirs(path: &Path, mode: u32) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            mkdirs(parent, mode)?;
        }
    }

    settle_creation(path, create_dir(path, mode))
}

/// A failed creation is forgiven when the directory exists afterwards
fn settle_creation(path: &Path, result: io::Result<()>) -> io::Result<()> {
    match result {
        Ok(()) => {
            trace!(path = %path.display(), "created directory");
            Ok(())
        }
        Err(_) if path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path, _mode: u32) -> io::Result<()> {
    fs::DirBuilder::new().create(path)
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}

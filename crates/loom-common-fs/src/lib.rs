//! File system utilities for Loom.

pub mod path;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A file system operation failed.
#[derive(Debug, Error)]
#[error("{message}: {}", path.display())]
pub struct FsError {
    pub message: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FsError {
    pub fn new(message: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// The underlying I/O error kind.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

/// What kind of entry lives at a path, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Stat a path without following symlinks. Returns `None` if nothing is there.
pub fn entry_kind(path: impl AsRef<Path>) -> Result<Option<EntryKind>> {
    let path = path.as_ref();
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let ft = meta.file_type();
            let kind = if ft.is_symlink() {
                EntryKind::Symlink
            } else if ft.is_dir() {
                EntryKind::Dir
            } else if ft.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            Ok(Some(kind))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FsError::new("failed to stat", path, e)),
    }
}

/// Check whether anything exists at `path` (symlinks included, not followed).
pub fn exists(path: impl AsRef<Path>) -> Result<bool> {
    entry_kind(path).map(|kind| kind.is_some())
}

/// Read a file's bytes together with its permission mode.
pub fn read_with_mode(path: impl AsRef<Path>) -> Result<(Vec<u8>, u32)> {
    let path = path.as_ref();
    let meta = fs::metadata(path).map_err(|e| FsError::new("failed to read metadata", path, e))?;
    let data = fs::read(path).map_err(|e| FsError::new("failed to read file", path, e))?;
    Ok((data, mode_of(&meta)))
}

/// Write bytes to a file and apply the given permission mode.
///
/// The parent directory must already exist. An existing read-only file is
/// made writable first.
pub fn write_with_mode(path: impl AsRef<Path>, contents: &[u8], mode: u32) -> Result<()> {
    let path = path.as_ref();
    make_writable(path)?;
    fs::write(path, contents).map_err(|e| FsError::new("failed to write file", path, e))?;
    set_permissions(path, mode)
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path)
            .map_err(|e| FsError::new("failed to create temporary file", &temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| FsError::new("failed to write temporary file", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| FsError::new("failed to sync temporary file", &temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FsError::new("failed to rename temporary file to target", path, e)
    })
}

/// Ensure a directory exists, creating missing parents.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| FsError::new("failed to create directory", path, e))?;
    }
    Ok(())
}

/// Delete a file. Returns `false` if it was already gone.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FsError::new("failed to remove file", path, e)),
    }
}

/// Remove a directory only if it is empty. Returns whether it was removed.
pub fn remove_dir_if_empty(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let mut entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FsError::new("failed to read directory", path, e)),
    };
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(path).map_err(|e| FsError::new("failed to remove directory", path, e))?;
    Ok(true)
}

/// List the names of immediate subdirectories, sorted.
pub fn list_subdirs(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| FsError::new("failed to read directory", dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FsError::new("failed to read directory entry", dir, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

fn make_writable(path: &Path) -> Result<()> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::new("failed to read metadata", path, e)),
    };
    let mut perms = meta.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = mode_of(&meta);
        if mode & 0o200 != 0 {
            return Ok(());
        }
        perms.set_mode(mode | 0o200);
    }
    #[cfg(not(unix))]
    {
        if !perms.readonly() {
            return Ok(());
        }
        perms.set_readonly(false);
    }

    fs::set_permissions(path, perms).map_err(|e| FsError::new("failed to set permissions", path, e))
}

/// Set file permissions.
#[cfg(unix)]
pub fn set_permissions(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| FsError::new("failed to set permissions", path, e))
}

/// Set file permissions (no-op on Windows).
#[cfg(not(unix))]
pub fn set_permissions(_path: impl AsRef<Path>, _mode: u32) -> Result<()> {
    Ok(())
}

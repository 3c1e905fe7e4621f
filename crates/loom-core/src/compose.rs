//! Enumerating the files a thread contributes.

use std::path::Path;

use loom_common_fs::path::{dir_key, to_unix_string};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{LoomError, Result};
use crate::manifest::{OwnedFiles, Thread};

/// How a thread's file set is determined.
#[derive(Debug, Clone, Copy)]
pub enum Enumeration<'a> {
    /// Every regular file under the source directory.
    FullWalk,
    /// Exactly the files the thread already owns.
    Replay(&'a Thread),
}

/// List the `(dir_key, file_name)` pairs a thread should write.
pub fn enumerate(source_dir: &Path, how: Enumeration<'_>) -> Result<OwnedFiles> {
    match how {
        Enumeration::FullWalk => walk(source_dir),
        Enumeration::Replay(thread) => Ok(thread.files.clone()),
    }
}

fn walk(source_dir: &Path) -> Result<OwnedFiles> {
    let mut files = OwnedFiles::new();

    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk failed"));
                return Err(LoomError::io("failed to read thread source", source_dir, source));
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry in thread source");
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if !file_type.is_file() {
            warn!(path = %to_unix_string(rel), "skipping non-regular entry in thread source");
            continue;
        }

        let parent = rel.parent().map(to_unix_string).unwrap_or_default();
        let file_name = entry.file_name().to_string_lossy();
        files.insert(&dir_key(parent), &file_name);
    }

    Ok(files)
}

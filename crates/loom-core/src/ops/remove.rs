//! `loom remove <thread>` and `loom remove *`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use loom_common_fs::path::{file_path, join_key, key_to_path, to_unix_string};
use loom_common_log::spans::operation_span;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{LoomError, Result};
use crate::ledger::Ledger;
use crate::manifest::{Manifest, Thread, MANIFEST_FILE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoveReport {
    pub thread: String,
    pub removed_files: Vec<String>,
    /// Owned files that were already gone or could not be deleted.
    pub warnings: Vec<String>,
    pub removed_dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoveAllReport {
    pub threads: Vec<RemoveReport>,
    pub removed_dirs: Vec<String>,
    /// No manifest or no threads; nothing was touched.
    pub nothing_to_do: bool,
}

/// Delete a thread's files and drop it from the manifest.
pub fn remove(project_root: &Path, thread: &str) -> Result<RemoveReport> {
    let _op = operation_span("remove").entered();
    let mut manifest = Manifest::load(project_root)?;

    let record = Ledger::new(&mut manifest)
        .remove_thread(thread)
        .ok_or_else(|| LoomError::ThreadNotInManifest {
            thread: thread.to_string(),
        })?;

    let mut report = RemoveReport {
        thread: thread.to_string(),
        ..RemoveReport::default()
    };
    let dirs = delete_thread_files(project_root, &record, &mut report);
    report.removed_dirs = prune_empty_dirs(project_root, dirs);

    manifest.save(project_root)?;
    Ok(report)
}

/// Delete every thread's files and empty the thread list.
pub fn remove_all(project_root: &Path) -> Result<RemoveAllReport> {
    let _op = operation_span("remove-all").entered();

    if !project_root.join(MANIFEST_FILE).exists() {
        info!("no loom.yaml, nothing to remove");
        return Ok(RemoveAllReport {
            nothing_to_do: true,
            ..RemoveAllReport::default()
        });
    }

    let mut manifest = Manifest::load(project_root)?;
    if manifest.threads.is_empty() {
        info!("no threads, nothing to remove");
        return Ok(RemoveAllReport {
            nothing_to_do: true,
            ..RemoveAllReport::default()
        });
    }

    let records = Ledger::new(&mut manifest).clear();
    let mut report = RemoveAllReport::default();
    let mut dirs = BTreeSet::new();

    for record in &records {
        let mut thread_report = RemoveReport {
            thread: record.name.clone(),
            ..RemoveReport::default()
        };
        dirs.extend(delete_thread_files(project_root, record, &mut thread_report));
        report.threads.push(thread_report);
    }
    report.removed_dirs = prune_empty_dirs(project_root, dirs);

    manifest.save(project_root)?;
    Ok(report)
}

/// Delete a thread's owned files. Returns the directories that held them.
fn delete_thread_files(project_root: &Path, thread: &Thread, report: &mut RemoveReport) -> BTreeSet<PathBuf> {
    let mut dirs = BTreeSet::new();

    for (dir, file_name) in thread.files.iter() {
        let path = file_path(project_root, dir, file_name);
        let rel = join_key(dir, file_name);

        match loom_common_fs::remove_file_if_exists(&path) {
            Ok(true) => {
                info!(path = %rel, thread = %thread.name, "removed file");
                report.removed_files.push(rel);
            }
            Ok(false) => {
                warn!(path = %rel, thread = %thread.name, "owned file not found, skipping");
                report.warnings.push(format!("file '{rel}' not found"));
            }
            Err(e) => {
                warn!(error = %e, "failed to remove file");
                report.warnings.push(e.to_string());
            }
        }
        dirs.insert(key_to_path(project_root, dir));
    }

    dirs
}

/// Remove directories left empty, deepest first, climbing toward but never
/// removing `project_root`.
fn prune_empty_dirs(project_root: &Path, dirs: BTreeSet<PathBuf>) -> Vec<String> {
    let mut candidates: BTreeSet<PathBuf> = BTreeSet::new();
    for dir in dirs {
        let mut current = dir.as_path();
        while current != project_root && current.starts_with(project_root) {
            candidates.insert(current.to_path_buf());
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    let mut ordered: Vec<PathBuf> = candidates.into_iter().collect();
    ordered.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    let mut removed = Vec::new();
    for dir in ordered {
        match loom_common_fs::remove_dir_if_empty(&dir) {
            Ok(true) => {
                let rel = dir.strip_prefix(project_root).map(to_unix_string).unwrap_or_default();
                info!(path = %rel, "removed empty directory");
                removed.push(rel);
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to remove directory"),
        }
    }
    removed
}

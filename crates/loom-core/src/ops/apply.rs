//! Writing one thread's files into the project.

use std::path::Path;

use loom_common_fs::path::{file_path, join_key};
use loom_common_fs::{entry_kind, EntryKind};
use loom_common_log::spans::file_span;
use serde::Serialize;
use tracing::{info, warn};

use crate::conflict::{resolve, Decide, Mode, Outcome};
use crate::error::{LoomError, Result};
use crate::ledger::Ledger;
use crate::manifest::OwnedFiles;

/// A file moved from one thread to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub path: String,
    pub from: String,
}

/// A source file that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub path: String,
    pub reason: String,
}

/// What happened to each file of one thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadReport {
    pub thread: String,
    pub source: String,
    pub created: Vec<String>,
    pub reapplied: Vec<String>,
    pub adopted: Vec<String>,
    pub transferred: Vec<Transfer>,
    pub declined: Vec<String>,
    pub skipped: Vec<Skipped>,
    #[serde(skip_serializing_if = "is_zero")]
    pub out_of_scope: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ThreadReport {
    pub fn new(thread: &str, source: &str) -> Self {
        Self {
            thread: thread.to_string(),
            source: source.to_string(),
            ..Self::default()
        }
    }

    /// Number of files written.
    pub fn written(&self) -> usize {
        self.created.len() + self.reapplied.len() + self.adopted.len() + self.transferred.len()
    }
}

/// Inputs for applying one thread.
pub(crate) struct ApplyThread<'a> {
    pub project_root: &'a Path,
    pub source_dir: &'a Path,
    pub thread: &'a str,
    pub files: &'a OwnedFiles,
    pub mode: &'a Mode,
}

/// Resolve and write every file of a thread.
///
/// Returns the set actually written; the caller commits it to the ledger.
/// Transfers are revoked from the losing thread as soon as the write lands.
pub(crate) fn apply_thread(
    job: ApplyThread<'_>,
    ledger: &mut Ledger<'_>,
    decider: &mut dyn Decide,
    report: &mut ThreadReport,
) -> Result<OwnedFiles> {
    let mut written = OwnedFiles::new();

    for (dir, file_name) in job.files.iter() {
        let rel = join_key(dir, file_name);
        let _span = file_span("apply", &rel).entered();
        let src = file_path(job.source_dir, dir, file_name);
        let dest = file_path(job.project_root, dir, file_name);

        match entry_kind(&src) {
            Ok(Some(EntryKind::File)) => {}
            Ok(Some(kind)) => {
                warn!(path = %src.display(), ?kind, "source is not a regular file, skipping");
                report.skipped.push(Skipped {
                    path: rel,
                    reason: "source is not a regular file".to_string(),
                });
                continue;
            }
            Ok(None) => {
                warn!(path = %src.display(), "source file missing, skipping");
                report.skipped.push(Skipped {
                    path: rel,
                    reason: "source file missing".to_string(),
                });
                continue;
            }
            Err(e) => {
                warn!(error = %e, "cannot access source file, skipping");
                report.skipped.push(Skipped {
                    path: rel,
                    reason: e.to_string(),
                });
                continue;
            }
        }

        let exists = loom_common_fs::exists(&dest)?;
        let owner = ledger.manifest().owner_of(dir, file_name).map(str::to_string);
        let outcome = resolve(&rel, job.thread, exists, owner.as_deref(), job.mode, decider)
            .map_err(|source| LoomError::ConflictAborted {
                path: rel.clone(),
                source,
            })?;

        match &outcome {
            Outcome::Declined => {
                info!(path = %rel, "declined, leaving file untouched");
                report.declined.push(rel);
                continue;
            }
            Outcome::OutOfScope => {
                report.out_of_scope += 1;
                continue;
            }
            _ => {}
        }

        let (contents, mode) = match loom_common_fs::read_with_mode(&src) {
            Ok(read) => read,
            Err(e) => {
                warn!(error = %e, "cannot read source file, skipping");
                report.skipped.push(Skipped {
                    path: rel,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Some(parent) = dest.parent() {
            loom_common_fs::ensure_dir(parent)?;
        }
        loom_common_fs::write_with_mode(&dest, &contents, mode)?;
        written.insert(dir, file_name);

        match outcome {
            Outcome::Create => {
                info!(path = %rel, "created");
                report.created.push(rel);
            }
            Outcome::Reapply => {
                info!(path = %rel, "re-applied");
                report.reapplied.push(rel);
            }
            Outcome::Adopt => {
                info!(path = %rel, thread = %job.thread, "took ownership of unmanaged file");
                report.adopted.push(rel);
            }
            Outcome::Transfer { from } => {
                ledger.revoke(&from, dir, file_name);
                info!(path = %rel, from = %from, thread = %job.thread, "took ownership");
                report.transferred.push(Transfer { path: rel, from });
            }
            Outcome::Declined | Outcome::OutOfScope => {}
        }
    }

    Ok(written)
}

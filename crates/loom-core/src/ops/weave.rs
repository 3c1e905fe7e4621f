//! `loom weave [thread]`.

use std::path::Path;

use loom_common_log::spans::{operation_span, thread_span, Timer};
use serde::Serialize;
use tracing::{info, warn};

use super::apply::{apply_thread, ApplyThread, ThreadReport};
use crate::compose::{enumerate, Enumeration};
use crate::conflict::{Decide, Mode};
use crate::error::{LoomError, Result};
use crate::ledger::Ledger;
use crate::manifest::Manifest;
use crate::store::{StoreCatalog, StoreResolver};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeaveReport {
    pub threads: Vec<ThreadReport>,
    /// Threads whose source directory could not be found.
    pub missing_sources: Vec<String>,
}

/// Re-apply every thread in manifest order, or only `target`.
///
/// A full weave walks each source again and may pick up new files; a
/// targeted weave replays exactly the files the thread already owns and
/// takes them back without asking.
pub fn weave(
    project_root: &Path,
    target: Option<&str>,
    catalog: &dyn StoreCatalog,
    decider: &mut dyn Decide,
) -> Result<WeaveReport> {
    let _op = operation_span("weave").entered();
    let timer = Timer::start("weave");
    let mut manifest = Manifest::load(project_root)?;

    if let Some(target) = target {
        if manifest.thread(target).is_none() {
            return Err(LoomError::ThreadNotInManifest {
                thread: target.to_string(),
            });
        }
    }

    let mode = match target {
        Some(target) => Mode::WeaveTarget(target.to_string()),
        None => Mode::WeaveAll,
    };
    let resolver = StoreResolver::new(project_root, catalog);

    let names: Vec<String> = manifest
        .threads
        .iter()
        .map(|t| t.name.clone())
        .filter(|name| target.map_or(true, |wanted| wanted == name))
        .collect();

    let mut report = WeaveReport::default();
    for name in names {
        let _thread = thread_span(&name).entered();
        // Re-read each time: earlier threads in this run may have revoked files.
        let Some(thread) = manifest.thread(&name).cloned() else {
            continue;
        };

        let Some(source_dir) = resolver.locate(&thread)? else {
            warn!(thread = %name, source = %thread.source, "thread source not found, skipping");
            report.missing_sources.push(name);
            continue;
        };

        let how = if target.is_some() {
            Enumeration::Replay(&thread)
        } else {
            Enumeration::FullWalk
        };
        let files = enumerate(&source_dir, how)?;

        let mut thread_report = ThreadReport::new(&name, &thread.source);
        let mut ledger = Ledger::new(&mut manifest);
        let written = apply_thread(
            ApplyThread {
                project_root,
                source_dir: &source_dir,
                thread: &name,
                files: &files,
                mode: &mode,
            },
            &mut ledger,
            decider,
            &mut thread_report,
        )?;
        ledger.commit_thread(&name, written);
        info!(thread = %name, written = thread_report.written(), "thread woven");
        report.threads.push(thread_report);
    }

    manifest.save(project_root)?;
    timer.finish();
    Ok(report)
}

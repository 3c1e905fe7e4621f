//! `loom add <thread>` and `loom add <store>/<thread>`.

use std::fmt;
use std::path::Path;

use loom_common_log::spans::{operation_span, thread_span, Timer};
use serde::Serialize;

use super::apply::{apply_thread, ApplyThread, ThreadReport};
use crate::compose::{enumerate, Enumeration};
use crate::conflict::{Decide, Mode};
use crate::error::{LoomError, Result};
use crate::ledger::Ledger;
use crate::manifest::Manifest;
use crate::store::{StoreCatalog, StoreResolver};

/// A parsed `add` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSpec {
    pub store: Option<String>,
    pub thread: String,
}

impl ThreadSpec {
    /// Parse `thread` or `store/thread`. Only the first `/` splits.
    pub fn parse(arg: &str) -> Result<Self> {
        if arg.is_empty() {
            return Err(LoomError::MissingThreadSpec);
        }
        match arg.split_once('/') {
            Some((store, thread)) if store.is_empty() || thread.is_empty() => {
                Err(LoomError::InvalidThreadSpec {
                    spec: arg.to_string(),
                })
            }
            Some((store, thread)) => Ok(Self {
                store: Some(store.to_string()),
                thread: thread.to_string(),
            }),
            None => Ok(Self {
                store: None,
                thread: arg.to_string(),
            }),
        }
    }
}

impl fmt::Display for ThreadSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.store {
            Some(store) => write!(f, "{}/{}", store, self.thread),
            None => f.write_str(&self.thread),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddReport {
    /// The argument as given.
    pub spec: String,
    #[serde(flatten)]
    pub thread: ThreadReport,
}

/// Add a thread to the project, copying its files and recording ownership.
///
/// The manifest is created if missing. Re-adding a thread replaces its
/// `source` and `files` in place.
pub fn add(
    project_root: &Path,
    arg: &str,
    catalog: &dyn StoreCatalog,
    decider: &mut dyn Decide,
) -> Result<AddReport> {
    let spec = ThreadSpec::parse(arg)?;
    let _op = operation_span("add").entered();
    let timer = Timer::start("add");

    let mut manifest = Manifest::load_or_default(project_root)?;
    let resolved = StoreResolver::new(project_root, catalog).resolve(spec.store.as_deref(), &spec.thread)?;

    let _thread = thread_span(&spec.thread).entered();
    let files = enumerate(&resolved.source_dir, Enumeration::FullWalk)?;
    let mut report = ThreadReport::new(&spec.thread, &resolved.source_label);

    let mut ledger = Ledger::new(&mut manifest);
    let written = apply_thread(
        ApplyThread {
            project_root,
            source_dir: &resolved.source_dir,
            thread: &spec.thread,
            files: &files,
            mode: &Mode::Add,
        },
        &mut ledger,
        decider,
        &mut report,
    )?;
    ledger.upsert(&spec.thread, &resolved.source_label, written);

    manifest.save(project_root)?;
    timer.finish();

    Ok(AddReport {
        spec: arg.to_string(),
        thread: report,
    })
}

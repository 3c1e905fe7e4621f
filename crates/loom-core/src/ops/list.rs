//! `loom list`.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::store::{list_store_threads, StoreCatalog, PROJECT_STORE_DIR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveThread {
    pub name: String,
    pub source: String,
    pub file_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreListing {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub threads: Vec<String>,
    /// Set when the store directory could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListReport {
    pub manifest_found: bool,
    pub active: Vec<ActiveThread>,
    pub stores: Vec<StoreListing>,
    /// Configured stores of a type that is not searched.
    pub skipped_stores: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_store: Option<StoreListing>,
}

impl ListReport {
    /// Whether any store listed at least one thread.
    pub fn has_store_threads(&self) -> bool {
        self.stores
            .iter()
            .chain(self.project_store.iter())
            .any(|s| !s.threads.is_empty())
    }
}

/// Active threads from `loom.yaml` plus threads available in each store.
///
/// A store that cannot be read is reported on its listing and does not fail
/// the whole command.
pub fn list(project_root: &Path, catalog: &dyn StoreCatalog, with_files: bool) -> Result<ListReport> {
    let mut report = ListReport::default();

    if project_root.join(MANIFEST_FILE).exists() {
        let manifest = Manifest::load(project_root)?;
        report.manifest_found = true;
        report.active = manifest
            .threads
            .iter()
            .map(|t| ActiveThread {
                name: t.name.clone(),
                source: t.source.clone(),
                file_count: t.files.len(),
                files: if with_files { t.files.paths() } else { Vec::new() },
            })
            .collect();
    }

    for store in catalog.list_configured_stores()? {
        if !store.is_local() {
            report.skipped_stores.push(store.name.clone());
            continue;
        }
        let listing = match store.resolved_path() {
            Ok(path) => listing(&store.name, store.kind.as_str(), &store.path, &path),
            Err(e) => StoreListing {
                name: store.name.clone(),
                kind: store.kind.to_string(),
                path: store.path.clone(),
                threads: Vec::new(),
                error: Some(e.to_string()),
            },
        };
        report.stores.push(listing);
    }

    let project_store = project_root.join(PROJECT_STORE_DIR);
    if project_store.is_dir() {
        report.project_store = Some(listing(
            PROJECT_STORE_DIR,
            "project",
            &project_store.to_string_lossy(),
            &project_store,
        ));
    }

    Ok(report)
}

fn listing(name: &str, kind: &str, display_path: &str, dir: &Path) -> StoreListing {
    let (threads, error) = match list_store_threads(dir) {
        Ok(threads) => (threads, None),
        Err(e) => {
            warn!(store = %name, error = %e, "cannot list store");
            (Vec::new(), Some(e.to_string()))
        }
    };
    StoreListing {
        name: name.to_string(),
        kind: kind.to_string(),
        path: display_path.to_string(),
        threads,
        error,
    }
}

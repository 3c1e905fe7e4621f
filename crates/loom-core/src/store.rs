//! Locating thread sources in the project store and configured stores.

use std::path::{Path, PathBuf};

use loom_common_config::{ConfigError, GlobalConfig, GlobalConfigLoader, Store};
use loom_common_fs::{entry_kind, EntryKind};
use tracing::debug;

use crate::error::{LoomError, Result};
use crate::manifest::Thread;

/// Directory holding the project-local store.
pub const PROJECT_STORE_DIR: &str = ".loom";

/// Directory inside a thread holding the files to copy.
pub const THREAD_DIR: &str = "_thread";

/// Store label used in messages for the project-local store.
pub const PROJECT_STORE_NAME: &str = "project";

/// Prefix of `source` values recorded for project-store threads.
pub const PROJECT_SOURCE_PREFIX: &str = "project:";

/// Prefix of `source` values pointing at a store directory.
pub const LOCAL_SOURCE_PREFIX: &str = "local:";

/// Provides the configured stores, in priority order.
pub trait StoreCatalog {
    fn list_configured_stores(&self) -> std::result::Result<Vec<Store>, ConfigError>;
}

impl StoreCatalog for GlobalConfigLoader {
    fn list_configured_stores(&self) -> std::result::Result<Vec<Store>, ConfigError> {
        Ok(self.load()?.stores)
    }
}

impl StoreCatalog for GlobalConfig {
    fn list_configured_stores(&self) -> std::result::Result<Vec<Store>, ConfigError> {
        Ok(self.stores.clone())
    }
}

impl StoreCatalog for Vec<Store> {
    fn list_configured_stores(&self) -> std::result::Result<Vec<Store>, ConfigError> {
        Ok(self.clone())
    }
}

/// A thread found in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedThread {
    pub name: String,
    /// The thread's `_thread` directory.
    pub source_dir: PathBuf,
    /// Value recorded as the thread's `source` in the manifest.
    pub source_label: String,
}

/// Searches stores for threads on behalf of one project.
pub struct StoreResolver<'a> {
    project_root: &'a Path,
    catalog: &'a dyn StoreCatalog,
}

impl<'a> StoreResolver<'a> {
    pub fn new(project_root: &'a Path, catalog: &'a dyn StoreCatalog) -> Self {
        Self {
            project_root,
            catalog,
        }
    }

    /// The project-local store directory.
    pub fn project_store_dir(&self) -> PathBuf {
        self.project_root.join(PROJECT_STORE_DIR)
    }

    /// Find `thread` in `store`, or search the project store then every
    /// configured local store when no store is given.
    pub fn resolve(&self, store: Option<&str>, thread: &str) -> Result<ResolvedThread> {
        let store = store.filter(|s| !s.is_empty());

        if store.is_none() {
            let candidate = self.project_store_dir().join(thread).join(THREAD_DIR);
            debug!(path = %candidate.display(), "searching project store");
            if check_thread_dir(&candidate, PROJECT_STORE_NAME)? {
                return Ok(ResolvedThread {
                    name: thread.to_string(),
                    source_dir: candidate,
                    source_label: format!("{PROJECT_SOURCE_PREFIX}{PROJECT_STORE_DIR}/{thread}"),
                });
            }
        }

        let stores = self.catalog.list_configured_stores()?;
        for configured in &stores {
            if store.is_some_and(|wanted| wanted != configured.name) {
                continue;
            }
            if !configured.is_local() {
                debug!(store = %configured.name, kind = %configured.kind, "skipping non-local store");
                continue;
            }
            let candidate = configured.resolved_path()?.join(thread).join(THREAD_DIR);
            debug!(store = %configured.name, path = %candidate.display(), "searching store");
            if check_thread_dir(&candidate, &configured.name)? {
                return Ok(ResolvedThread {
                    name: thread.to_string(),
                    source_dir: candidate,
                    source_label: configured.name.clone(),
                });
            }
        }

        match store {
            Some(wanted) if !stores.iter().any(|s| s.name == wanted) => Err(LoomError::UnknownStore {
                store: wanted.to_string(),
            }),
            Some(wanted) => Err(LoomError::ThreadNotInStore {
                thread: thread.to_string(),
                store: wanted.to_string(),
            }),
            None => Err(LoomError::ThreadNotFound {
                thread: thread.to_string(),
            }),
        }
    }

    /// Map a recorded thread back to its `_thread` directory.
    ///
    /// Returns `None` when that directory does not exist. The global
    /// configuration is only consulted for sources naming a store.
    pub fn locate(&self, thread: &Thread) -> Result<Option<PathBuf>> {
        let candidate = if let Some(rel) = thread.source.strip_prefix(PROJECT_SOURCE_PREFIX) {
            self.project_root.join(rel).join(THREAD_DIR)
        } else if let Some(store_path) = thread.source.strip_prefix(LOCAL_SOURCE_PREFIX) {
            PathBuf::from(store_path).join(&thread.name).join(THREAD_DIR)
        } else {
            let configured = if thread.source.is_empty() {
                None
            } else {
                self.catalog
                    .list_configured_stores()?
                    .into_iter()
                    .find(|s| s.name == thread.source && s.is_local())
            };
            match configured {
                Some(store) => store.resolved_path()?.join(&thread.name).join(THREAD_DIR),
                None => self.project_store_dir().join(&thread.name).join(THREAD_DIR),
            }
        };

        debug!(thread = %thread.name, path = %candidate.display(), "locating thread source");
        match std::fs::metadata(&candidate) {
            Ok(meta) if meta.is_dir() => Ok(Some(candidate)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoomError::io("failed to access thread source", candidate, e)),
        }
    }
}

/// `Ok(true)` if `path` is a usable thread directory, `Ok(false)` if absent.
fn check_thread_dir(path: &Path, store: &str) -> Result<bool> {
    let kind = entry_kind(path).map_err(|e| LoomError::Io {
        context: format!("error accessing thread in store '{store}'"),
        path: e.path,
        source: e.source,
    })?;

    match kind {
        None => Ok(false),
        Some(EntryKind::Dir) => Ok(true),
        Some(EntryKind::Symlink) => match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(LoomError::MalformedThread {
                path: path.to_path_buf(),
                store: store.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LoomError::io(
                format!("error accessing thread in store '{store}'"),
                path,
                e,
            )),
        },
        Some(_) => Err(LoomError::MalformedThread {
            path: path.to_path_buf(),
            store: store.to_string(),
        }),
    }
}

/// Whether a store entry looks like a thread (`_thread/` or `config.yml`).
pub fn is_thread_entry(entry: &Path) -> bool {
    entry.join(THREAD_DIR).is_dir() || entry.join("config.yml").is_file()
}

/// Thread names available in a store directory, sorted.
pub fn list_store_threads(store_dir: &Path) -> Result<Vec<String>> {
    let names = loom_common_fs::list_subdirs(store_dir)?;
    Ok(names
        .into_iter()
        .filter(|name| is_thread_entry(&store_dir.join(name)))
        .collect())
}

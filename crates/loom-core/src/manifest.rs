//! Project manifest (`loom.yaml`) and the ownership ledger it carries.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use loom_common_fs::path::{dir_key, join_key, split_key};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoomError, Result};

/// Manifest file name at the project root.
pub const MANIFEST_FILE: &str = "loom.yaml";

/// Current manifest format version.
pub const MANIFEST_VERSION: &str = "1";

/// Files owned by one thread, keyed by normalized directory key.
///
/// Directory keys always go through [`dir_key`] and a directory with no files
/// is never kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Option<Vec<String>>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct OwnedFiles(BTreeMap<String, BTreeSet<String>>);

impl OwnedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of owned files.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Add `file_name` under `dir`. Returns `false` if it was already present
    /// or the entry would point outside the project.
    pub fn insert(&mut self, dir: &str, file_name: &str) -> bool {
        if file_name.trim_matches('/').is_empty() || escapes_root(dir, file_name) {
            return false;
        }
        let (dir, file_name) = canonical(dir, file_name);
        self.0.entry(dir).or_default().insert(file_name)
    }

    pub fn insert_path(&mut self, rel_path: &str) -> bool {
        let (dir, file_name) = split_key(rel_path);
        self.insert(&dir, &file_name)
    }

    /// Remove `file_name` under `dir`, dropping the directory if it empties.
    pub fn remove(&mut self, dir: &str, file_name: &str) -> bool {
        let (dir, file_name) = canonical(dir, file_name);
        let Some(files) = self.0.get_mut(&dir) else {
            return false;
        };
        let removed = files.remove(&file_name);
        if files.is_empty() {
            self.0.remove(&dir);
        }
        removed
    }

    pub fn remove_path(&mut self, rel_path: &str) -> bool {
        let (dir, file_name) = split_key(rel_path);
        self.remove(&dir, &file_name)
    }

    pub fn contains(&self, dir: &str, file_name: &str) -> bool {
        let (dir, file_name) = canonical(dir, file_name);
        self.0
            .get(&dir)
            .map(|files| files.contains(&file_name))
            .unwrap_or(false)
    }

    pub fn contains_path(&self, rel_path: &str) -> bool {
        let (dir, file_name) = split_key(rel_path);
        self.contains(&dir, &file_name)
    }

    /// Iterate `(dir_key, file_name)` pairs, sorted by directory then file.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(dir, files)| files.iter().map(move |f| (dir.as_str(), f.as_str())))
    }

    /// Owned files as project-relative paths.
    pub fn paths(&self) -> Vec<String> {
        self.iter().map(|(dir, file)| join_key(dir, file)).collect()
    }

    /// Directory keys in use.
    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Directory keys fold `\` into `/`; a file name only splits on `/`, so a
/// backslash in a name stays part of the name.
fn canonical(dir: &str, file_name: &str) -> (String, String) {
    let dir = dir_key(dir);
    let file_name = file_name.trim_end_matches('/');
    match file_name.rsplit_once('/') {
        Some((sub, name)) => (dir_key(join_key(&dir, sub)), name.to_string()),
        None => (dir, file_name.to_string()),
    }
}

/// Whether a `..` segment (or a bare `.` name) would leave the project root.
fn escapes_root(dir: &str, file_name: &str) -> bool {
    dir.split(|c: char| c == '/' || c == '\\').any(|part| part == "..")
        || file_name.split('/').any(|part| part == "..")
        || file_name.trim_end_matches('/') == "."
}

impl TryFrom<BTreeMap<String, Option<Vec<String>>>> for OwnedFiles {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Option<Vec<String>>>) -> std::result::Result<Self, String> {
        let mut files = OwnedFiles::new();
        for (dir, names) in raw {
            for name in names.unwrap_or_default() {
                if escapes_root(&dir, &name) {
                    return Err(format!(
                        "file '{name}' under '{dir}' points outside the project"
                    ));
                }
                files.insert(&dir, &name);
            }
        }
        Ok(files)
    }
}

impl From<OwnedFiles> for BTreeMap<String, Vec<String>> {
    fn from(files: OwnedFiles) -> Self {
        files
            .0
            .into_iter()
            .map(|(dir, names)| (dir, names.into_iter().collect()))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for OwnedFiles {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut files = OwnedFiles::new();
        for (dir, name) in iter {
            files.insert(dir, name);
        }
        files
    }
}

/// A thread applied to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "OwnedFiles::is_empty")]
    pub files: OwnedFiles,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Thread {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            files: OwnedFiles::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// The project ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_version() -> String {
    MANIFEST_VERSION.to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            threads: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// True when YAML text holds nothing but whitespace and comments.
pub fn is_blank_yaml(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

impl Manifest {
    /// Path of `loom.yaml` under `project_root`.
    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(MANIFEST_FILE)
    }

    /// Load the manifest. A missing file is [`LoomError::ManifestNotFound`].
    pub fn load(project_root: &Path) -> Result<Self> {
        Self::read(project_root)?.ok_or_else(|| LoomError::ManifestNotFound {
            project: project_root.to_path_buf(),
        })
    }

    /// Load the manifest, or start an empty one if the file does not exist.
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        Ok(Self::read(project_root)?.unwrap_or_default())
    }

    fn read(project_root: &Path) -> Result<Option<Self>> {
        let path = Self::path(project_root);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LoomError::io("failed to read", path, e)),
        };

        if is_blank_yaml(&content) {
            return Ok(Some(Self::default()));
        }

        let manifest: Manifest = serde_yaml::from_str(&content)
            .map_err(|source| LoomError::ManifestFormat { path: path.clone(), source })?;
        debug!(path = %path.display(), threads = manifest.threads.len(), "loaded manifest");
        Ok(Some(manifest))
    }

    /// Write the manifest to `project_root/loom.yaml`.
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let path = Self::path(project_root);
        let yaml = self.to_yaml()?;
        loom_common_fs::write_atomic(&path, yaml.as_bytes())?;
        debug!(path = %path.display(), "saved manifest");
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(LoomError::ManifestSerialize)
    }

    pub fn thread(&self, name: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.name == name)
    }

    pub fn thread_mut(&mut self, name: &str) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| t.name == name)
    }

    /// Which thread owns the project-relative `rel_path`, if any.
    pub fn is_owned(&self, rel_path: &str) -> Option<&str> {
        let (dir, file_name) = split_key(rel_path);
        self.owner_of(&dir, &file_name)
    }

    pub fn owner_of(&self, dir: &str, file_name: &str) -> Option<&str> {
        self.threads
            .iter()
            .find(|t| t.files.contains(dir, file_name))
            .map(|t| t.name.as_str())
    }

    /// Record that `thread` owns `rel_path`. No-op for an unknown thread.
    pub fn record_ownership(&mut self, thread: &str, rel_path: &str) -> bool {
        self.thread_mut(thread)
            .map(|t| t.files.insert_path(rel_path))
            .unwrap_or(false)
    }

    /// Drop `thread`'s claim on `rel_path`.
    pub fn revoke_ownership(&mut self, thread: &str, rel_path: &str) -> bool {
        self.thread_mut(thread)
            .map(|t| t.files.remove_path(rel_path))
            .unwrap_or(false)
    }

    /// Replace `thread`'s owned files wholesale.
    pub fn replace_thread_files(&mut self, thread: &str, files: OwnedFiles) -> bool {
        match self.thread_mut(thread) {
            Some(t) => {
                t.files = files;
                true
            }
            None => false,
        }
    }

    /// Insert a thread or update an existing one in place (source and files
    /// replaced, unknown keys and position kept).
    pub fn upsert_thread(&mut self, name: &str, source: &str, files: OwnedFiles) {
        match self.thread_mut(name) {
            Some(t) => {
                t.source = source.to_string();
                t.files = files;
            }
            None => {
                let mut thread = Thread::new(name, source);
                thread.files = files;
                self.threads.push(thread);
            }
        }
    }

    pub fn remove_thread(&mut self, name: &str) -> Option<Thread> {
        let index = self.threads.iter().position(|t| t.name == name)?;
        Some(self.threads.remove(index))
    }

    /// Paths claimed by more than one thread, with their claimants.
    pub fn ownership_conflicts(&self) -> Vec<(String, Vec<String>)> {
        let mut claims: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for thread in &self.threads {
            for path in thread.files.paths() {
                claims.entry(path).or_default().push(thread.name.clone());
            }
        }
        claims.into_iter().filter(|(_, owners)| owners.len() > 1).collect()
    }
}

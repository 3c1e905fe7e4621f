//! Path keys used by the ownership ledger.
//!
//! Every component that stores or looks up ownership goes through
//! [`dir_key`], so a key built from a walked source tree, a key read back
//! from `loom.yaml` and a key reconstructed from a user-supplied path all
//! compare equal.

use std::path::{Path, PathBuf};

/// Key used for the project root.
pub const ROOT_KEY: &str = "./";

/// Normalize a directory (relative to the project root) into a ledger key.
///
/// The root is `"./"`; every other key uses forward slashes and ends with a
/// trailing slash. Empty and `.` segments are dropped.
pub fn dir_key(dir: impl AsRef<str>) -> String {
    let unified = dir.as_ref().replace('\\', "/");
    let parts: Vec<&str> = unified
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    if parts.is_empty() {
        ROOT_KEY.to_string()
    } else {
        format!("{}/", parts.join("/"))
    }
}

/// Split a project-relative file path into `(dir_key, file_name)`.
pub fn split_key(rel_path: impl AsRef<str>) -> (String, String) {
    let unified = rel_path.as_ref().replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');

    match trimmed.rsplit_once('/') {
        Some((dir, file)) => (dir_key(dir), file.to_string()),
        None => (ROOT_KEY.to_string(), trimmed.to_string()),
    }
}

/// Join a directory key and a file name back into a project-relative path
/// string (forward slashes, no leading `./`).
pub fn join_key(dir_key_value: &str, file_name: &str) -> String {
    let key = dir_key(dir_key_value);
    if key == ROOT_KEY {
        file_name.to_string()
    } else {
        format!("{key}{file_name}")
    }
}

/// Resolve a directory key against a base directory.
pub fn key_to_path(base: impl AsRef<Path>, key: &str) -> PathBuf {
    let mut path = base.as_ref().to_path_buf();
    for part in dir_key(key).split('/') {
        if !part.is_empty() && part != "." {
            path.push(part);
        }
    }
    path
}

/// Resolve a project-relative file key against a base directory.
pub fn file_path(base: impl AsRef<Path>, dir_key_value: &str, file_name: &str) -> PathBuf {
    key_to_path(base, dir_key_value).join(file_name)
}

/// Convert a path to a Unix-style string (forward slashes).
pub fn to_unix_string(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

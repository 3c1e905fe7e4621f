//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::env::expand_env_vars;
use crate::loader::ConfigError;

/// Current global configuration format.
pub const CONFIG_VERSION: &str = "1";

/// Root of the global configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stores: Vec<Store>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            stores: Vec::new(),
        }
    }
}

/// A configured thread store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: StoreKind,
    /// Filesystem path for local stores. May reference `${VAR}`.
    pub path: String,
}

/// Store type. Only `local` stores are searched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Local,
    #[serde(untagged)]
    Other(String),
}

impl StoreKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Other(kind) => kind,
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Store {
    pub fn local(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StoreKind::Local,
            path: path.into(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.kind == StoreKind::Local
    }

    /// The store directory with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(PathBuf::from(expand_env_vars(&self.path)?))
    }
}

impl GlobalConfig {
    /// Find a store by exact name.
    pub fn store(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.name == name)
    }

    /// Register a local store directory.
    ///
    /// `path` must already be absolute. The name defaults to the directory's
    /// base name; name and path are compared case-insensitively.
    pub fn add_local_store(&mut self, path: &Path, name: Option<&str>) -> Result<&Store, ConfigError> {
        let path_str = path.to_string_lossy().to_string();
        let name = match name {
            Some(n) => n.trim().to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                message: format!("cannot infer a store name from path \"{path_str}\""),
            });
        }

        if let Some(existing) = self
            .stores
            .iter()
            .find(|s| s.path.eq_ignore_ascii_case(&path_str))
        {
            return Err(ConfigError::DuplicateStorePath {
                path: path_str,
                existing: existing.name.clone(),
                kind: existing.kind.to_string(),
            });
        }

        if self.stores.iter().any(|s| s.name.eq_ignore_ascii_case(&name)) {
            return Err(ConfigError::DuplicateStoreName { name, path: path_str });
        }

        self.stores.push(Store::local(name, path_str));
        Ok(&self.stores[self.stores.len() - 1])
    }

    /// Remove a store by name (case-insensitive), falling back to its path.
    pub fn remove_store(&mut self, name_or_path: &str, abs_path: Option<&Path>) -> Result<Store, ConfigError> {
        let by_name = self
            .stores
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name_or_path));

        let index = by_name.or_else(|| {
            let wanted = abs_path
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| name_or_path.to_string());
            self.stores
                .iter()
                .position(|s| s.path.eq_ignore_ascii_case(&wanted))
        });

        match index {
            Some(i) => Ok(self.stores.remove(i)),
            None => Err(ConfigError::StoreNotFound {
                name_or_path: name_or_path.to_string(),
            }),
        }
    }
}

//! Engine error types.

use std::path::PathBuf;

use loom_common_config::ConfigError;
use loom_common_fs::FsError;
use thiserror::Error;

use crate::conflict::PromptError;

/// Broad category of a [`LoomError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Malformed,
    ConflictAborted,
    Io,
    Format,
    Usage,
    Config,
}

/// Errors produced by Loom operations.
#[derive(Debug, Error)]
pub enum LoomError {
    #[error("thread '{thread}' not found in specified store '{store}'")]
    ThreadNotInStore { thread: String, store: String },

    #[error("thread '{thread}' not found in project's .loom folder or any configured local PC stores")]
    ThreadNotFound { thread: String },

    #[error("specified store '{store}' not found in global configuration")]
    UnknownStore { store: String },

    #[error("thread '{thread}' not found in loom.yaml")]
    ThreadNotInManifest { thread: String },

    #[error("loom.yaml not found in {}", project.display())]
    ManifestNotFound { project: PathBuf },

    #[error("loom.yaml already exists and is not empty")]
    ManifestExists { path: PathBuf },

    #[error("thread path '{}' in store '{store}' is a file, not a directory", path.display())]
    MalformedThread { path: PathBuf, store: String },

    #[error("conflict resolution aborted for '{path}': {source}")]
    ConflictAborted {
        path: String,
        #[source]
        source: PromptError,
    },

    #[error("{context} '{}': {source}", path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ManifestFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize loom.yaml: {0}")]
    ManifestSerialize(#[source] serde_yaml::Error),

    #[error("thread name or store/thread is required")]
    MissingThreadSpec,

    #[error("invalid format for store/thread: '{spec}'. Both store name and thread name must be specified")]
    InvalidThreadSpec { spec: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ThreadNotInStore { .. }
            | Self::ThreadNotFound { .. }
            | Self::UnknownStore { .. }
            | Self::ThreadNotInManifest { .. }
            | Self::ManifestNotFound { .. } => ErrorKind::NotFound,
            Self::MalformedThread { .. } => ErrorKind::Malformed,
            Self::ConflictAborted { .. } => ErrorKind::ConflictAborted,
            Self::Io { .. } => ErrorKind::Io,
            Self::ManifestFormat { .. } | Self::ManifestSerialize(_) => ErrorKind::Format,
            Self::ManifestExists { .. } | Self::MissingThreadSpec | Self::InvalidThreadSpec { .. } => {
                ErrorKind::Usage
            }
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }
}

impl From<FsError> for LoomError {
    fn from(err: FsError) -> Self {
        Self::Io {
            context: err.message,
            path: err.path,
            source: err.source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoomError>;

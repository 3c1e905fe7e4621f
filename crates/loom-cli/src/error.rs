//! CLI error handling and formatting.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use loom_common_config::ConfigError;
use loom_core::{ErrorKind, LoomError};
use thiserror::Error;

pub mod formatter;

pub use formatter::ErrorFormatter;

/// Application exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    ValidationError = 5,
    NotFound = 6,
    ConflictAborted = 8,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        hint: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        hint: Option<String>,
    },

    #[error("{message}")]
    ConflictAborted {
        message: String,
        path: String,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E004",
            Self::NotFound { .. } => "E005",
            Self::ConflictAborted { .. } => "E008",
            Self::User { .. } => "E010",
            Self::Other(_) => "E999",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        self.exit().into()
    }

    pub fn exit(&self) -> Exit {
        match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Io { .. } => Exit::IoError,
            Self::Validation { .. } => Exit::ValidationError,
            Self::NotFound { .. } => Exit::NotFound,
            Self::ConflictAborted { .. } => Exit::ConflictAborted,
            Self::User { .. } | Self::Other(_) => Exit::GeneralError,
        }
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. }
            | Self::Validation { hint, .. }
            | Self::NotFound { hint, .. }
            | Self::User { hint, .. } => hint.as_deref(),
            Self::ConflictAborted { .. } => {
                Some("Run again interactively, or pass --yes or --no to answer every prompt")
            }
            _ => None,
        }
    }

    /// Path related to the error, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(message: impl Into<String>, source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
            path: Some(path.into()),
        }
    }

    /// Create a user error (user did something wrong)
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Prefix the message with what the command was doing.
    pub fn context(self, what: &str) -> Self {
        let prefix = |message: String| format!("{what}: {message}");
        match self {
            Self::Config { message, source, hint } => Self::Config {
                message: prefix(message),
                source,
                hint,
            },
            Self::Io { message, source, path } => Self::Io {
                message: prefix(message),
                source,
                path,
            },
            Self::Validation { message, hint } => Self::Validation {
                message: prefix(message),
                hint,
            },
            Self::NotFound { message, hint } => Self::NotFound {
                message: prefix(message),
                hint,
            },
            Self::ConflictAborted { message, path } => Self::ConflictAborted {
                message: prefix(message),
                path,
            },
            Self::User { message, hint } => Self::User {
                message: prefix(message),
                hint,
            },
            Self::Other(e) => Self::Other(e.context(what.to_string())),
        }
    }
}

fn loom_hint(err: &LoomError) -> Option<String> {
    let hint = match err {
        LoomError::ThreadNotFound { .. } | LoomError::ThreadNotInStore { .. } => {
            "Run 'loom list' to see available threads"
        }
        LoomError::UnknownStore { .. } => "Run 'loom config list' to see configured stores",
        LoomError::ThreadNotInManifest { .. } => "Run 'loom list' to see active threads",
        LoomError::ManifestNotFound { .. } => "Run 'loom init' to create one",
        LoomError::MalformedThread { .. } => "A thread's _thread entry must be a directory",
        LoomError::ManifestFormat { .. } => "Check loom.yaml syntax",
        LoomError::MissingThreadSpec | LoomError::InvalidThreadSpec { .. } => {
            "Use 'loom add <thread>' or 'loom add <store>/<thread>'"
        }
        _ => return None,
    };
    Some(hint.to_string())
}

impl From<LoomError> for CliError {
    fn from(err: LoomError) -> Self {
        let hint = loom_hint(&err);
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound {
                message: err.to_string(),
                hint,
            },
            ErrorKind::Malformed | ErrorKind::Format => Self::Validation {
                message: err.to_string(),
                hint,
            },
            ErrorKind::ConflictAborted => {
                let path = match &err {
                    LoomError::ConflictAborted { path, .. } => path.clone(),
                    _ => String::new(),
                };
                Self::ConflictAborted {
                    message: err.to_string(),
                    path,
                }
            }
            ErrorKind::Usage => Self::User {
                message: err.to_string(),
                hint,
            },
            ErrorKind::Io => {
                let message = err.to_string();
                match err {
                    LoomError::Io { path, source, .. } => Self::Io {
                        message,
                        source: Some(Box::new(source)),
                        path: Some(path),
                    },
                    _ => Self::Io {
                        message,
                        source: None,
                        path: None,
                    },
                }
            }
            ErrorKind::Config => match err {
                LoomError::Config(config) => config.into(),
                other => Self::config(other.to_string()),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = err.hint().map(str::to_string);
        match err {
            ConfigError::StoreNotFound { .. } => Self::NotFound {
                message: err.to_string(),
                hint,
            },
            ConfigError::DuplicateStoreName { .. }
            | ConfigError::DuplicateStorePath { .. }
            | ConfigError::InvalidStorePath { .. } => Self::User {
                message: err.to_string(),
                hint,
            },
            _ => {
                let message = err.to_string();
                let source: Option<Box<dyn std::error::Error + Send + Sync>> = match err {
                    ConfigError::ReadError { source, .. }
                    | ConfigError::WriteError { source, .. } => Some(Box::new(source)),
                    _ => None,
                };
                Self::Config {
                    message,
                    hint,
                    source,
                }
            }
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: None,
            path: None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let err: CliError = LoomError::ThreadNotInManifest { thread: "a".into() }.into();
        assert_eq!(err.code(), "E005");
        assert_eq!(err.exit(), Exit::NotFound);
        assert_eq!(err.to_string(), "thread 'a' not found in loom.yaml");
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_usage_mapping() {
        let err: CliError = LoomError::MissingThreadSpec.into();
        assert_eq!(err.exit(), Exit::GeneralError);
        assert_eq!(err.to_string(), "thread name or store/thread is required");
    }

    #[test]
    fn test_conflict_mapping() {
        let err: CliError = LoomError::ConflictAborted {
            path: "a.txt".into(),
            source: loom_core::PromptError::Eof,
        }
        .into();
        assert_eq!(err.exit(), Exit::ConflictAborted);
    }

    #[test]
    fn test_config_mapping() {
        let err: CliError = LoomError::Config(ConfigError::NoConfigDir).into();
        assert_eq!(err.exit(), Exit::ConfigError);

        let err: CliError = ConfigError::StoreNotFound {
            name_or_path: "x".into(),
        }
        .into();
        assert_eq!(err.exit(), Exit::NotFound);
    }

    #[test]
    fn test_io_cause_is_not_repeated() {
        let io = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let err: CliError = LoomError::io("failed to write", "/tmp/x", io).into();
        assert_eq!(err.exit(), Exit::IoError);
        assert_eq!(err.path(), Some(std::path::Path::new("/tmp/x")));

        let out = ErrorFormatter::new().verbose(true).format(&err);
        assert_eq!(out.matches("failed to write '/tmp/x'").count(), 1);
        assert!(out.contains("caused by:\n  disk on fire\n"));

        let err: CliError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
        let out = ErrorFormatter::new().verbose(true).format(&err);
        assert_eq!(out.matches("pipe closed").count(), 1);
    }

    #[test]
    fn test_config_cause_is_not_repeated() {
        let err: CliError = ConfigError::ValidationError {
            message: "bad store".into(),
        }
        .into();
        let out = ErrorFormatter::new().verbose(true).format(&err);
        assert_eq!(out.matches("bad store").count(), 1);
        assert!(!out.contains("caused by"));

        let err: CliError = ConfigError::ReadError {
            path: PathBuf::from("/cfg/loom.yaml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        let out = ErrorFormatter::new().verbose(true).format(&err);
        assert_eq!(out.matches("failed to read global config file").count(), 1);
        assert!(out.contains("caused by:\n  denied\n"));
    }

    #[test]
    fn test_context_prefix() {
        let err: CliError = LoomError::ManifestExists {
            path: PathBuf::from("loom.yaml"),
        }
        .into();
        let err = err.context("failed to initialize project");
        assert_eq!(
            err.to_string(),
            "failed to initialize project: loom.yaml already exists and is not empty"
        );
    }
}

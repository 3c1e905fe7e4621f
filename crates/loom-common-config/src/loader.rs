//! Global configuration loading and saving.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::env::global_config_dir;
use crate::types::GlobalConfig;

/// File name of the global configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "loom.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("failed to read global config file {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write global config file {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse global config file {} at line {}: {message}", path.display(), line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("failed to serialize global config: {message}")]
    SerializeError { message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("the path/url \"{path}\" is already registered as store \"{existing}\" (type: {kind})")]
    DuplicateStorePath {
        path: String,
        existing: String,
        kind: String,
    },

    #[error("a store named \"{name}\" already exists. The path \"{path}\" is unique")]
    DuplicateStoreName { name: String, path: String },

    #[error("store with name or path/url \"{name_or_path}\" not found")]
    StoreNotFound { name_or_path: String },

    #[error("{message}")]
    InvalidStorePath { message: String },
}

impl ConfigError {
    /// Remediation text for the CLI, where there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoConfigDir => Some("Set LOOM_GLOBAL_DIR to choose a configuration directory"),
            Self::ParseError { .. } => Some("Check the global loom.yaml syntax"),
            Self::DuplicateStoreName { .. } => Some("Pass --name to register the store under a different name"),
            Self::StoreNotFound { .. } => Some("Run 'loom config list' to see configured stores"),
            _ => None,
        }
    }
}

/// Loads and saves the global configuration from an injected directory.
#[derive(Debug, Clone)]
pub struct GlobalConfigLoader {
    config_dir: PathBuf,
}

impl GlobalConfigLoader {
    /// Create a loader rooted at `config_dir`.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a loader for `$LOOM_GLOBAL_DIR` or the user config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(global_config_dir()?))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the global `loom.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration. A missing file yields the default configuration.
    pub fn load(&self) -> Result<GlobalConfig, ConfigError> {
        let config_path = self.config_path();

        let contents = match std::fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %config_path.display(), "no global config, using defaults");
                return Ok(GlobalConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: config_path,
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(GlobalConfig::default());
        }

        let config: GlobalConfig =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: config_path.clone(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &GlobalConfig) -> Result<(), ConfigError> {
        for store in &config.stores {
            if store.name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("store with path \"{}\" has an empty name", store.path),
                });
            }
            if store.path.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("store \"{}\" has an empty path", store.name),
                });
            }
        }
        Ok(())
    }

    /// Save the configuration, creating the directory if needed.
    pub fn save(&self, config: &GlobalConfig) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::WriteError {
            path: self.config_dir.clone(),
            source,
        })?;

        let config_path = self.config_path();
        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::SerializeError {
            message: e.to_string(),
        })?;

        std::fs::write(&config_path, yaml).map_err(|source| ConfigError::WriteError {
            path: config_path.clone(),
            source,
        })?;
        restrict_permissions(&config_path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|source| {
        ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

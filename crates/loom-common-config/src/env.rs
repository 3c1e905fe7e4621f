//! Environment variable handling.

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::loader::ConfigError;

/// Environment variable names.
pub mod vars {
    /// Overrides the directory holding the global `loom.yaml`.
    pub const LOOM_GLOBAL_DIR: &str = "LOOM_GLOBAL_DIR";
    pub const LOOM_LOG_LEVEL: &str = "LOOM_LOG_LEVEL";
    pub const LOOM_LOG_FORMAT: &str = "LOOM_LOG_FORMAT";
    pub const LOOM_LOG_FILE: &str = "LOOM_LOG_FILE";
    pub const LOOM_PROJECT_DIR: &str = "LOOM_PROJECT_DIR";
}

/// Name of the directory Loom uses under the user config dir.
pub const CONFIG_DIR_NAME: &str = "loom";

/// Directory holding the global configuration, honoring `LOOM_GLOBAL_DIR`.
pub fn global_config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = env::var(vars::LOOM_GLOBAL_DIR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    default_config_dir()
}

#[cfg(windows)]
fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".config").join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(not(windows))]
fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

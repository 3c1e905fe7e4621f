//! Global configuration for Loom.
//!
//! The global `loom.yaml` lists the local thread stores a project can add
//! threads from. Its directory is injected into [`GlobalConfigLoader`];
//! [`GlobalConfigLoader::from_env`] resolves it from `LOOM_GLOBAL_DIR` or the
//! user config directory.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;

//! `loom init`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{LoomError, Result};
use crate::manifest::{is_blank_yaml, Manifest};

/// Content written to a fresh `loom.yaml`.
pub const INIT_TEMPLATE: &str =
    "# loom.yaml - Loom project configuration file\nversion: \"1\"\nthreads: []\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub path: PathBuf,
    /// An empty or comment-only file was replaced.
    pub overwrote: bool,
}

/// Create an empty `loom.yaml` in `project_root`.
///
/// An existing file holding only whitespace and comments is overwritten;
/// anything else is left alone and reported as [`LoomError::ManifestExists`].
pub fn init(project_root: &Path) -> Result<InitReport> {
    let path = Manifest::path(project_root);

    let overwrote = match std::fs::read_to_string(&path) {
        Ok(existing) if is_blank_yaml(&existing) => true,
        Ok(_) => return Err(LoomError::ManifestExists { path }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(LoomError::io("failed to read existing", path, e)),
    };

    std::fs::write(&path, INIT_TEMPLATE)
        .map_err(|e| LoomError::io("failed to write", path.clone(), e))?;
    info!(path = %path.display(), overwrote, "initialized project");

    Ok(InitReport { path, overwrote })
}

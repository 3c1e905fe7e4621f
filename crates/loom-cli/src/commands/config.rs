//! Config command implementation.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueHint};
use loom_common_config::{GlobalConfigLoader, Store};
use loom_core::store::PROJECT_STORE_DIR;
use serde::Serialize;
use tracing::info;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, SimpleOutput};

/// Manage global thread stores
#[derive(Debug, Parser)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Register a local directory as a thread store
    Add {
        /// Store directory
        #[arg(value_hint = ValueHint::DirPath)]
        path: String,

        /// Store name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a store by name or path
    Remove {
        /// Store name or path
        name_or_path: String,
    },

    /// List configured stores
    List,
}

#[derive(Debug, Serialize)]
struct StoresOutput {
    stores: Vec<Store>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_store: Option<String>,
}

impl FormattedOutput for StoresOutput {
    fn format_text(&self) -> String {
        let mut out = String::new();
        if self.stores.is_empty() {
            let _ = writeln!(
                out,
                "No global thread stores configured. Use 'loom config add <path>' to add one."
            );
        } else {
            let _ = writeln!(out, "Configured stores:");
            for store in &self.stores {
                let _ = writeln!(
                    out,
                    "- {} (Type: {}, Path: {})",
                    store.name, store.kind, store.path
                );
            }
        }
        if let Some(path) = &self.project_store {
            let _ = writeln!(out, "Project Store ({PROJECT_STORE_DIR}): {path}");
        }
        out
    }
}

/// Reject store locations that are not local directories.
fn check_local(path: &str) -> Result<(), CliError> {
    let lower = path.to_lowercase();
    if lower.starts_with("http:") || lower.starts_with("https:") || lower.contains("github.com") {
        return Err(CliError::user_with_hint(
            format!("remote store \"{path}\" is not yet supported"),
            "Only local directories can be added as stores",
        ));
    }
    Ok(())
}

fn absolute(path: &str) -> Result<PathBuf, CliError> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| CliError::io_with_path("failed to read current directory", e, "."))?;
    Ok(cwd.join(path))
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let loader = GlobalConfigLoader::from_env()?;
        match &self.action {
            ConfigAction::Add { path, name } => add_store(ctx, &loader, path, name.as_deref()),
            ConfigAction::Remove { name_or_path } => remove_store(ctx, &loader, name_or_path),
            ConfigAction::List => list_stores(ctx, &loader),
        }
    }
}

fn add_store(
    ctx: &CommandContext,
    loader: &GlobalConfigLoader,
    path: &str,
    name: Option<&str>,
) -> Result<(), CliError> {
    check_local(path)?;
    let dir = absolute(path)?;
    if !dir.is_dir() {
        return Err(CliError::user(format!(
            "store path \"{}\" does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut config = loader.load()?;
    let store = config.add_local_store(&dir, name)?.clone();
    loader.save(&config)?;
    info!(store = %store.name, path = %store.path, "added store");

    print_output(
        ctx,
        &SimpleOutput::new(format!(
            "Store '{}' added with path '{}'.",
            store.name, store.path
        )),
    )
}

fn remove_store(ctx: &CommandContext, loader: &GlobalConfigLoader, name_or_path: &str) -> Result<(), CliError> {
    let mut config = loader.load()?;
    let abs = absolute(name_or_path)?;
    let store = config.remove_store(name_or_path, Some(&abs))?;
    loader.save(&config)?;
    info!(store = %store.name, "removed store");

    print_output(
        ctx,
        &SimpleOutput::new(format!("Store '{}' removed.", store.name)),
    )
}

fn list_stores(ctx: &CommandContext, loader: &GlobalConfigLoader) -> Result<(), CliError> {
    let config = loader.load()?;
    let project_store = ctx.project_root().join(PROJECT_STORE_DIR);
    let output = StoresOutput {
        stores: config.stores,
        project_store: project_store
            .is_dir()
            .then(|| project_store.to_string_lossy().to_string()),
    };
    print_output(ctx, &output)
}

//! List command implementation.

use std::fmt::Write;

use clap::Parser;
use loom_core::ops::{list, ListReport, StoreListing};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// List active threads and threads available in stores
#[derive(Debug, Parser)]
pub struct ListCommand {
    /// Show every file owned by each active thread
    #[arg(long)]
    pub files: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct ListOutput(ListReport);

fn store_lines(out: &mut String, store: &StoreListing) {
    if let Some(error) = &store.error {
        let _ = writeln!(out, "  Error reading store: {error}");
        return;
    }
    if store.threads.is_empty() {
        let _ = writeln!(out, "  No threads found in this store.");
    }
    for thread in &store.threads {
        let _ = writeln!(out, "  - {thread}");
    }
}

impl FormattedOutput for ListOutput {
    fn format_text(&self) -> String {
        let report = &self.0;
        let mut out = String::new();

        if !report.manifest_found {
            let _ = writeln!(out, "No loom.yaml found in this project.");
        } else if report.active.is_empty() {
            let _ = writeln!(out, "No active threads in this project.");
        } else {
            let _ = writeln!(out, "Active project threads:");
            for thread in &report.active {
                let _ = writeln!(
                    out,
                    "- {} (Source: {}, Files: {})",
                    thread.name, thread.source, thread.file_count
                );
                for file in &thread.files {
                    let _ = writeln!(out, "    {file}");
                }
            }
        }

        let _ = writeln!(out, "\nAvailable store threads:");
        if report.stores.is_empty() && report.project_store.is_none() {
            let _ = writeln!(
                out,
                "No global thread stores configured. Use 'loom config add <path>' to add one."
            );
        }
        for store in &report.stores {
            let _ = writeln!(
                out,
                "Store: {} (Type: {}, Path: {})",
                store.name, store.kind, store.path
            );
            store_lines(&mut out, store);
        }
        for name in &report.skipped_stores {
            let _ = writeln!(out, "Store: {name} (not a local store, skipped)");
        }
        if let Some(project) = &report.project_store {
            let _ = writeln!(out, "Project Store ({}):", project.name);
            store_lines(&mut out, project);
        }

        out
    }
}

impl ListCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let report = list(ctx.project_root(), &ctx.catalog(), self.files)?;
        print_output(ctx, &ListOutput(report))
    }
}

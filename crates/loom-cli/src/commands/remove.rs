//! Remove command implementation.

use clap::Parser;
use loom_core::ops::{remove, remove_all, RemoveAllReport, RemoveReport};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Thread argument that removes every thread.
const ALL_THREADS: &str = "*";

/// Remove a thread and its files from the project
#[derive(Debug, Parser)]
pub struct RemoveCommand {
    /// Thread to remove, or `*` for every thread
    pub thread: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RemoveOutput {
    One(RemoveReport),
    All(RemoveAllReport),
}

fn warning_lines(out: &mut String, report: &RemoveReport) {
    for warning in &report.warnings {
        out.push_str(&format!("Warning: {warning}\n"));
    }
}

impl FormattedOutput for RemoveOutput {
    fn format_text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::One(report) => {
                warning_lines(&mut out, report);
                out.push_str(&format!("Thread '{}' removed successfully.", report.thread));
            }
            Self::All(report) if report.nothing_to_do => {
                out.push_str("No threads to remove.");
            }
            Self::All(report) => {
                for thread in &report.threads {
                    warning_lines(&mut out, thread);
                    out.push_str(&format!("Thread '{}' removed.\n", thread.thread));
                }
                out.push_str("All threads removed successfully.");
            }
        }
        out
    }
}

impl RemoveCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let output = if self.thread == ALL_THREADS {
            RemoveOutput::All(remove_all(ctx.project_root())?)
        } else {
            RemoveOutput::One(remove(ctx.project_root(), &self.thread)?)
        };
        print_output(ctx, &output)
    }
}

//! Weave command implementation.

use clap::Parser;
use loom_core::ops::{weave, WeaveReport};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::commands::thread_report_lines;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Re-apply threads recorded in loom.yaml
#[derive(Debug, Parser)]
pub struct WeaveCommand {
    /// Only re-apply this thread's files
    pub thread: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct WeaveOutput(WeaveReport);

impl FormattedOutput for WeaveOutput {
    fn format_text(&self) -> String {
        let mut out = String::new();
        for name in &self.0.missing_sources {
            out.push_str(&format!(
                "Warning: source for thread '{name}' not found, skipping.\n"
            ));
        }
        for thread in &self.0.threads {
            thread_report_lines(&mut out, thread);
        }
        out.push_str("Weave operation completed.");
        out
    }
}

impl WeaveCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let mut decider = ctx.decider();
        let report = weave(
            ctx.project_root(),
            self.thread.as_deref(),
            &ctx.catalog(),
            decider.as_mut(),
        )?;
        print_output(ctx, &WeaveOutput(report))
    }
}

//! Add command implementation.

use clap::Parser;
use loom_core::ops::{add, AddReport};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::commands::thread_report_lines;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Add a thread to the project
#[derive(Debug, Parser)]
pub struct AddCommand {
    /// Thread to add, as `<thread>` or `<store>/<thread>`
    pub thread: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct AddOutput(AddReport);

impl FormattedOutput for AddOutput {
    fn format_text(&self) -> String {
        let mut out = String::new();
        thread_report_lines(&mut out, &self.0.thread);
        out.push_str(&format!(
            "Thread '{}' added successfully from {}",
            self.0.spec, self.0.thread.source
        ));
        out
    }
}

impl AddCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let arg = self.thread.as_deref().unwrap_or_default();
        let mut decider = ctx.decider();
        let report = add(ctx.project_root(), arg, &ctx.catalog(), decider.as_mut())?;
        print_output(ctx, &AddOutput(report))
    }
}

//! Init command implementation.

use clap::Parser;
use loom_core::ops::{init, InitReport};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Create an empty loom.yaml in the project
#[derive(Debug, Parser)]
pub struct InitCommand {}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct InitOutput(InitReport);

impl FormattedOutput for InitOutput {
    fn format_text(&self) -> String {
        "Initialized empty Loom project with loom.yaml".to_string()
    }
}

impl InitCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let report = init(ctx.project_root())
            .map_err(|e| CliError::from(e).context("failed to initialize project"))?;
        print_output(ctx, &InitOutput(report))
    }
}

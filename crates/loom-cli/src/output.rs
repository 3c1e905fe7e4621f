//! Output formatting utilities for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput: Serialize {
    fn format_text(&self) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput,
{
    write_output(ctx, value, io::stdout().lock())
}

/// Print formatted output to a writer
///
/// Text output is suppressed by `--quiet`; JSON output never is.
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput,
    W: Write,
{
    let output = match ctx.format {
        OutputFormat::Text if ctx.quiet => return Ok(()),
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json()?,
    };

    if output.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{}", output.trim_end_matches('\n'))?;
    Ok(())
}

/// Helper for simple string outputs
#[derive(Debug, Serialize)]
pub struct SimpleOutput {
    pub message: String,
}

impl SimpleOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FormattedOutput for SimpleOutput {
    fn format_text(&self) -> String {
        self.message.clone()
    }
}

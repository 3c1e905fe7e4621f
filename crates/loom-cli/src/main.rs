//! Loom CLI - compose project files from reusable threads
//!
//! Main entry point for the `loom` binary.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use loom_cli::cli::{Cli, OutputFormat};
use loom_cli::error::ErrorFormatter;
use loom_cli::Exit;
use loom_common_log::LogConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env()
        .with_verbosity(cli.verbose, cli.quiet)
        .with_ansi(std::io::stderr().is_terminal());
    if let Err(e) = loom_common_log::init(log_config) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let format = cli.format;
    let verbose = cli.verbose > 0;

    match cli.execute() {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let formatter = ErrorFormatter::new().verbose(verbose);
            match format {
                OutputFormat::Json => eprintln!("{}", formatter.format_json(&e)),
                OutputFormat::Text => formatter.print(&e),
            }
            e.exit_code()
        }
    }
}

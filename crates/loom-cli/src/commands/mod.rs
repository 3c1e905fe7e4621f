//! Command implementations.

mod add;
mod config;
mod init;
mod list;
mod remove;
mod weave;

pub use add::AddCommand;
pub use config::ConfigCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use remove::RemoveCommand;
pub use weave::WeaveCommand;

use std::fmt::Write;

use loom_core::ops::ThreadReport;

/// Per-file lines for a thread that was just applied.
pub(crate) fn thread_report_lines(out: &mut String, report: &ThreadReport) {
    for path in &report.adopted {
        let _ = writeln!(
            out,
            "Thread '{}' is taking ownership of '{}'.",
            report.thread, path
        );
    }
    for transfer in &report.transferred {
        let _ = writeln!(
            out,
            "Thread '{}' is taking ownership of '{}' from thread '{}'.",
            report.thread, transfer.path, transfer.from
        );
    }
    for path in &report.declined {
        let _ = writeln!(out, "Skipping file '{path}'.");
    }
    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "Warning: skipped source entry '{}': {}",
            skipped.path, skipped.reason
        );
    }
}

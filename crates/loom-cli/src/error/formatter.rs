//! Error formatting for CLI output.

use std::fmt::Write as FmtWrite;

use crate::error::CliError;

/// Error output formatter
#[derive(Debug, Default)]
pub struct ErrorFormatter {
    verbose: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Format and print an error
    pub fn print(&self, error: &CliError) {
        eprint!("{}", self.format(error));
    }

    /// Format an error to a string
    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "error[{}]: {error}", error.code());

        if self.verbose {
            self.format_source_chain(&mut output, error);
        }

        if let Some(path) = error.path() {
            let _ = writeln!(output, "  --> {}", path.display());
        }

        if let Some(hint) = error.hint() {
            let _ = writeln!(output, "\nhint: {hint}");
        }

        output
    }

    /// Format as JSON
    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "error": {
                "code": error.code(),
                "message": error.to_string(),
                "hint": error.hint(),
            }
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }

    fn format_source_chain(&self, output: &mut String, error: &CliError) {
        use std::error::Error;

        let mut current = error.source();
        let mut first = true;
        while let Some(source) = current {
            if first {
                let _ = writeln!(output, "\ncaused by:");
                first = false;
            }
            let _ = writeln!(output, "  {source}");
            current = source.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_hint() {
        let err = CliError::user_with_hint("bad thing", "do the other thing");
        let out = ErrorFormatter::new().format(&err);
        assert!(out.starts_with("error[E010]: bad thing\n"));
        assert!(out.contains("\nhint: do the other thing"));
    }

    #[test]
    fn test_source_chain_only_when_verbose() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = CliError::io_with_path("failed to write", io, "/tmp/x");

        let quiet = ErrorFormatter::new().format(&err);
        assert!(!quiet.contains("caused by"));
        assert!(quiet.contains("--> /tmp/x"));

        let loud = ErrorFormatter::new().verbose(true).format(&err);
        assert!(loud.contains("caused by:\n  disk on fire"));
    }

    #[test]
    fn test_format_json() {
        let err = CliError::user("nope");
        let out = ErrorFormatter::new().format_json(&err);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"]["code"], "E010");
        assert_eq!(value["error"]["message"], "nope");
        assert!(value["error"]["hint"].is_null());
    }
}

//! Loom CLI Library
//!
//! Argument parsing, output formatting and interactive prompts for the
//! `loom` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod prompts;

pub use error::{CliError, Exit};

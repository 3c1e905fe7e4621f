//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use loom_common_config::{ConfigError, GlobalConfigLoader, Store};
use loom_core::{Decide, Decision, FixedDecision, StoreCatalog};

use crate::commands::{
    AddCommand, ConfigCommand, InitCommand, ListCommand, RemoveCommand, WeaveCommand,
};
use crate::error::CliError;
use crate::prompts::StdinDecider;

/// Loom - compose project files from reusable threads
///
/// Threads are bundles of files kept in stores. Loom copies them into a
/// project and records which thread owns each file in loom.yaml.
#[derive(Debug, Parser)]
#[command(
    name = "loom",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    /// Project directory (defaults to the current directory)
    #[arg(
        short = 'C',
        long,
        global = true,
        env = "LOOM_PROJECT_DIR",
        value_hint = ValueHint::DirPath
    )]
    pub project: Option<PathBuf>,

    /// Answer yes to every ownership prompt
    #[arg(short, long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer no to every ownership prompt
    #[arg(long, global = true)]
    pub no: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty loom.yaml in the project
    Init(InitCommand),

    /// Add a thread to the project
    Add(AddCommand),

    /// Remove a thread and its files from the project
    Remove(RemoveCommand),

    /// List active threads and threads available in stores
    List(ListCommand),

    /// Re-apply threads recorded in loom.yaml
    #[command(visible_alias = "install")]
    Weave(WeaveCommand),

    /// Manage global thread stores
    Config(ConfigCommand),
}

impl Cli {
    /// The project directory as an absolute path.
    pub fn project_root(&self) -> Result<PathBuf, CliError> {
        let cwd = std::env::current_dir()
            .map_err(|e| CliError::io_with_path("failed to read current directory", e, "."))?;
        Ok(match &self.project {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    /// Execute the selected command
    pub fn execute(self) -> Result<(), CliError> {
        let answer = if self.yes {
            Some(Decision::Yes)
        } else if self.no {
            Some(Decision::No)
        } else {
            None
        };

        let ctx = CommandContext {
            project_root: self.project_root()?,
            format: self.format,
            verbose: self.verbose,
            quiet: self.quiet,
            answer,
        };

        tracing::debug!(project = %ctx.project_root.display(), "running command");

        match self.command {
            Command::Init(cmd) => cmd.execute(&ctx),
            Command::Add(cmd) => cmd.execute(&ctx),
            Command::Remove(cmd) => cmd.execute(&ctx),
            Command::List(cmd) => cmd.execute(&ctx),
            Command::Weave(cmd) => cmd.execute(&ctx),
            Command::Config(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Store catalog that reads the global configuration when first asked.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalCatalog;

impl StoreCatalog for GlobalCatalog {
    fn list_configured_stores(&self) -> Result<Vec<Store>, ConfigError> {
        GlobalConfigLoader::from_env()?.list_configured_stores()
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub project_root: PathBuf,
    pub format: OutputFormat,
    pub verbose: u8,
    pub quiet: bool,
    /// Fixed answer for ownership prompts, from `--yes` or `--no`.
    pub answer: Option<Decision>,
}

impl CommandContext {
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn catalog(&self) -> GlobalCatalog {
        GlobalCatalog
    }

    /// Where ownership questions get their answers.
    pub fn decider(&self) -> Box<dyn Decide> {
        match self.answer {
            Some(answer) => Box::new(FixedDecision(answer)),
            // Keep stdout clean for machine-readable output.
            None if self.format == OutputFormat::Json => {
                Box::new(StdinDecider::new(std::io::stdin().lock(), std::io::stderr()))
            }
            None => Box::new(StdinDecider::new(std::io::stdin().lock(), std::io::stdout())),
        }
    }
}

//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Extract translatable strings and reconcile the record store
//! - `status`: Show tracked records and per-status totals
//! - `init`: Initialize a lingua configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root directory (defaults to the current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Record store file (overrides config file)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Scan templates only (the unused-marking pass is skipped)
    #[arg(long, conflicts_with = "forms_only")]
    pub templates_only: bool,

    /// Scan form definitions only (the unused-marking pass is skipped)
    #[arg(long)]
    pub forms_only: bool,
}

#[derive(Debug, Args)]
pub struct StatusCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Restrict to records in this category (prefix match on dot boundaries)
    #[arg(long)]
    pub category: Option<String>,

    /// Restrict to records in this locale
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings from templates and form definitions,
    /// reconciling them into the record store
    Scan(ScanCommand),
    /// Show tracked records and their translation status
    Status(StatusCommand),
    /// Initialize a new .linguarc.json configuration file
    Init,
}

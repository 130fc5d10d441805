//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Split source data into templates and a source-locale dictionary
//! - `populate`: Render templates against one or more locale dictionaries
//! - `init`: Initialize lexis configuration file

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

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Populate(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root; configured paths are resolved against it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Source data directory (overrides config file)
    #[arg(long)]
    pub source_dir: Option<String>,

    /// Templates output directory (overrides config file)
    #[arg(long)]
    pub templates_dir: Option<String>,

    /// Source locale output file (overrides config file)
    #[arg(long)]
    pub source_locale_file: Option<String>,
}

#[derive(Debug, Args)]
pub struct PopulateCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Locales to render (default: all available)
    /// Can be specified multiple times: --locale en --locale pt
    #[arg(long = "locale")]
    pub locales: Vec<String>,

    /// Directory of <locale>.json dictionaries (overrides config file)
    #[arg(long)]
    pub locales_dir: Option<String>,

    /// Templates directory (overrides config file)
    #[arg(long)]
    pub templates_dir: Option<String>,

    /// Populated output directory (overrides config file)
    #[arg(long)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable text into templates and a source locale
    Extract(ExtractCommand),
    /// Populate templates with locale dictionaries
    Populate(PopulateCommand),
    /// Initialize lexis configuration file
    Init,
}

//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translatable messages and write one POT file per domain
//! - `init`: Initialize transcat configuration file

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

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(args)) => args.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Template or source file, or a directory to walk
    pub resource: PathBuf,

    /// Directory the POT files are written to (overrides config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Domain for messages that do not name one (overrides config file)
    #[arg(long)]
    pub domain: Option<String>,

    /// Locale written to the POT header (overrides config file)
    #[arg(long, env = "TRANSCAT_LOCALE")]
    pub locale: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages into POT files
    Extract(ExtractArgs),
    /// Initialize a new .transcatrc.json configuration file
    Init,
}

//! CLI definition.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Per-package changelogs and version bumps for npm monorepos.
#[derive(Debug, Parser)]
#[command(name = "monorel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the changelogs for the commits since a tag
    Changelog(commands::changelog::ChangelogArgs),

    /// Run a full release (changelogs, versions, commit and push)
    Releaser(commands::releaser::ReleaserArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Changelog(args) => commands::changelog::run(&args, self.json),
            Commands::Releaser(args) => commands::releaser::run(args, self.json),
        }
    }
}

//! Monorel CLI - Per-package changelogs and version bumps for npm monorepos.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod exit;
mod report;

use exit::ExitCode;

fn main() -> std::process::ExitCode {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::Failure
        }
    };

    code.into()
}

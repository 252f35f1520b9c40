//! Command implementations.

pub mod changelog;
pub mod releaser;

use std::path::PathBuf;

use anyhow::{Context, Result};
use monorel_config::{Config, load_or_default};
use monorel_git::GitRepository;

/// Opens the repository around the current directory and loads its
/// configuration, falling back to defaults when there is no config file.
fn open_workspace() -> Result<(GitRepository, Config)> {
    let cwd: PathBuf = std::env::current_dir().context("failed to read current directory")?;
    let repo = GitRepository::discover(&cwd).context("failed to open git repository")?;
    let config = load_or_default(&cwd).context("failed to load configuration")?;
    Ok((repo, config))
}

//! Changelog command.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use monorel_core::{ChangelogGenerator, VersionsFile, resolve_latest_tag};
use monorel_git::Repository;
use tracing::info;

use crate::report;

/// Arguments for the changelog command.
#[derive(Debug, Args)]
pub struct ChangelogArgs {
    /// Tag to start from (default: latest version tag)
    pub tag: Option<String>,
}

/// Runs the changelog command.
pub fn run(args: &ChangelogArgs, json: bool) -> Result<()> {
    let (repo, config) = super::open_workspace()?;

    let previous_tag = match &args.tag {
        Some(tag) => tag.clone(),
        None => resolve_latest_tag(&repo, &config).context("failed to read tags")?,
    };
    info!(tag = %previous_tag, "generating changelogs");

    let versions_path = repo.workdir().join(&config.versions.file);
    let versions = VersionsFile::read(&versions_path)?;

    let outcome = ChangelogGenerator::new(&repo, &config, Utc::now().date_naive())
        .generate(&previous_tag, &versions)
        .context("failed to generate changelogs")?;

    let out = if json {
        report::json(&outcome)?
    } else {
        report::changelog(&outcome)
    };
    print!("{out}");

    Ok(())
}

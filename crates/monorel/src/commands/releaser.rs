//! Releaser command.

use anyhow::{Context, Result};
use clap::Args;
use monorel_core::ReleaseDriver;
use monorel_npm::NpmCli;

use crate::report;

/// Arguments for the releaser command.
#[derive(Debug, Args)]
pub struct ReleaserArgs {
    /// Tag to start from (default: latest version tag)
    pub tag: Option<String>,

    /// Suffix appended to the icon library version (e.g. `beta`)
    #[arg(long, env = "PRE_RELEASE_TAG")]
    pub pre_release_tag: Option<String>,

    /// npm executable
    #[arg(long, default_value = "npm")]
    pub npm: String,
}

/// Runs the releaser command.
pub fn run(args: ReleaserArgs, json: bool) -> Result<()> {
    let (repo, config) = super::open_workspace()?;
    let npm = NpmCli::new().with_program(&args.npm);

    let outcome = ReleaseDriver::new(&repo, &npm, &config)
        .pre_release_tag(args.pre_release_tag)
        .run(args.tag.as_deref())
        .context("release failed")?;

    let out = if json {
        report::json(&outcome)?
    } else {
        report::release(&outcome)
    };
    print!("{out}");

    Ok(())
}

//! Command reports printed on stdout.

use std::fmt::Write;

use anyhow::Result;
use monorel_core::{ChangelogOutcome, ReleaseOutcome};
use serde::Serialize;

/// Renders a changelog run as `key: value` lines.
pub fn changelog(outcome: &ChangelogOutcome) -> String {
    let mut out = String::new();
    _ = writeln!(out, "previous_tag: {}", outcome.previous_tag);
    _ = writeln!(out, "new_tag: {}", outcome.new_tag);
    if let Some(bump) = outcome.repo_bump {
        _ = writeln!(out, "bump: {bump}");
    }
    for (package, bump) in &outcome.package_bumps {
        _ = writeln!(out, "bump.{package}: {bump}");
    }
    for path in &outcome.written {
        _ = writeln!(out, "changelog: {}", path.display());
    }
    out
}

/// Renders a release run as `key: value` lines.
pub fn release(outcome: &ReleaseOutcome) -> String {
    let mut out = changelog(&outcome.changelog);
    for (package, version) in &outcome.new_versions {
        _ = writeln!(out, "version.{package}: {version}");
    }
    if let Some(reverted) = &outcome.reverted {
        _ = writeln!(out, "reverted: {reverted}");
    }
    _ = writeln!(out, "commit: {}", outcome.commit);
    if let Some(tag) = &outcome.tag {
        _ = writeln!(out, "tag: {tag}");
    }
    out
}

/// Pretty JSON with a trailing newline.
pub fn json(value: &impl Serialize) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

//! Changelog generation for a commit range.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use monorel_commit::{PackageLayout, ParsedCommit, classify_log};
use monorel_config::Config;
use monorel_git::Repository;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::changelog::{ChangelogRenderer, Heading, prepend_changelog};
use crate::plan::{ReleasePlan, Sentinels};
use crate::{BumpType, CoreResult, VersionManager, VersionsFile};

/// What a changelog run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogOutcome {
    /// Tag the range started from.
    pub previous_tag: String,

    /// Tag of the release being prepared.
    pub new_tag: String,

    /// Root section, used for the release notes.
    pub release_note: Option<String>,

    /// Aggregate bump.
    pub repo_bump: Option<BumpType>,

    /// Bump per package, sentinels included.
    pub package_bumps: BTreeMap<String, BumpType>,

    /// Changelog files written, relative to the repository root.
    pub written: Vec<PathBuf>,
}

/// Returns true if `tag` marks a repository with no release yet.
#[must_use]
pub fn is_initial_tag(tag: &str, config: &Config) -> bool {
    tag.is_empty() || tag == config.versions.initial_tag
}

/// Returns true if `commit` was created by a previous release run.
#[must_use]
pub fn is_automation_commit(commit: &ParsedCommit, config: &Config) -> bool {
    commit.r#type.as_deref() == Some("ci")
        && commit.has_scope(&config.releaser.commit_scope)
        && commit.subject.starts_with(&config.releaser.commit_subject)
}

/// Fetches tags and returns the highest version tag, or the initial tag.
///
/// A failed fetch is logged and the local tags are used.
///
/// # Errors
///
/// Returns an error if the local tags cannot be read.
pub fn resolve_latest_tag<R: Repository>(repo: &R, config: &Config) -> CoreResult<String> {
    if let Err(e) = repo.fetch_tags(&config.repository.remote) {
        warn!(error = %e, "could not fetch tags, using local tags");
    }

    let tag = repo
        .latest_version_tag(&config.versions.tag_prefix)?
        .unwrap_or_else(|| config.versions.initial_tag.clone());

    debug!(%tag, "latest tag");
    Ok(tag)
}

/// Generates and writes the changelogs for `previous_tag..HEAD`.
pub struct ChangelogGenerator<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
    date: NaiveDate,
}

impl<'a, R: Repository> ChangelogGenerator<'a, R> {
    /// Creates a generator dated `date`.
    #[must_use]
    pub fn new(repo: &'a R, config: &'a Config, date: NaiveDate) -> Self {
        Self { repo, config, date }
    }

    /// Classifies the range and aggregates it, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn plan(&self, previous_tag: &str) -> CoreResult<ReleasePlan> {
        let since = (!is_initial_tag(previous_tag, self.config)).then_some(previous_tag);
        let log = self.repo.log(since)?;

        let layout = PackageLayout::new(
            self.config.packages.dir.as_str(),
            self.config.packages.root_name.as_str(),
        );
        let commits: Vec<ParsedCommit> = classify_log(&log, &layout)
            .into_iter()
            .filter(|c| !is_automation_commit(c, self.config))
            .collect();

        info!(count = commits.len(), ?since, "classified commits");

        let sentinels = Sentinels::new(
            self.config.packages.root_name.as_str(),
            self.config.packages.icons_scope.as_str(),
        );
        Ok(ReleasePlan::build(
            &commits,
            &sentinels,
            &self.config.changelog.type_order,
        ))
    }

    /// Renders every package section and prepends it to its changelog.
    ///
    /// Packages whose directory no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read, a version cannot be
    /// bumped or a changelog cannot be written.
    pub fn generate(&self, previous_tag: &str, versions: &VersionsFile) -> CoreResult<ChangelogOutcome> {
        let plan = self.plan(previous_tag)?;
        let vm = VersionManager::new();
        let renderer = ChangelogRenderer::new(self.config);
        let root = self.config.packages.root_name.as_str();

        let new_tag = match plan.repo_bump {
            Some(bump) => vm
                .bump_text(previous_tag, Some(bump), false)?
                .replace(&self.config.versions.release_marker, ""),
            None => previous_tag.to_string(),
        };
        let compare = (!is_initial_tag(previous_tag, self.config))
            .then(|| format!("{previous_tag}...{new_tag}"));

        let mut release_note = None;
        let mut written = Vec::new();

        for (package, commits_by_type) in plan.index.iter() {
            // The root is released by the aggregate bump, and only when it
            // has a bump of its own.
            let bump = match plan.bump_for(package) {
                Some(_) if package == root => plan.repo_bump,
                other => other,
            };
            let heading = Heading {
                version: vm.bump_text(versions.version(package), bump, false)?,
                compare: compare.clone(),
                date: self.date,
            };
            let section = renderer.render(package, &heading, commits_by_type, &plan.type_order);

            if package == root {
                release_note = Some(section.clone());
            }

            let relative = renderer.changelog_path(package);
            let path = self.repo.workdir().join(&relative);
            if path.parent().is_some_and(|dir| !dir.is_dir()) {
                warn!(package, ?relative, "package directory is gone, skipping changelog");
                continue;
            }

            prepend_changelog(&path, &section)?;
            info!(package, version = %heading.version, "updated changelog");
            written.push(relative);
        }

        Ok(ChangelogOutcome {
            previous_tag: previous_tag.to_string(),
            new_tag,
            release_note,
            repo_bump: plan.repo_bump,
            package_bumps: plan.package_bumps,
            written,
        })
    }
}

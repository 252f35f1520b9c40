//! Folding classified commits into a release plan.

use std::collections::BTreeMap;

use monorel_commit::ParsedCommit;
use serde::Serialize;

use crate::bump::{BumpType, next_bump};

/// The synthetic package names used while aggregating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    /// Bucket receiving every commit that touches a file.
    pub root: String,
    /// Commit scope that also files a commit under the icon library.
    pub icons: String,
}

impl Sentinels {
    /// Creates a new pair of sentinels.
    #[must_use]
    pub fn new(root: impl Into<String>, icons: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            icons: icons.into(),
        }
    }
}

/// Commits grouped by package, then by commit type, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangelogIndex {
    packages: BTreeMap<String, BTreeMap<String, Vec<ParsedCommit>>>,
}

impl ChangelogIndex {
    fn insert(&mut self, package: &str, commit: &ParsedCommit) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .entry(commit.kind().to_string())
            .or_default()
            .push(commit.clone());
    }

    /// Returns the per-type commits of a package.
    #[must_use]
    pub fn get(&self, package: &str) -> Option<&BTreeMap<String, Vec<ParsedCommit>>> {
        self.packages.get(package)
    }

    /// Iterates over packages and their per-type commits.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<ParsedCommit>>)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the package names with at least one commit.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Returns true if no commit was filed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// The outcome of aggregating a commit range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
    /// Commits grouped for the changelogs.
    pub index: ChangelogIndex,

    /// Section order: the configured order, then new types as encountered.
    pub type_order: Vec<String>,

    /// Running bump per package, sentinels included.
    pub package_bumps: BTreeMap<String, BumpType>,

    /// Aggregate bump over every commit, including ones without files.
    pub repo_bump: Option<BumpType>,
}

impl ReleasePlan {
    /// Folds `commits` (newest first) into a plan.
    #[must_use]
    pub fn build(commits: &[ParsedCommit], sentinels: &Sentinels, type_order: &[String]) -> Self {
        let initial = Self {
            type_order: type_order.to_vec(),
            ..Self::default()
        };

        commits
            .iter()
            .fold(initial, |plan, commit| plan.apply(commit, sentinels))
    }

    fn apply(mut self, commit: &ParsedCommit, sentinels: &Sentinels) -> Self {
        let kind = commit.kind();

        if !self.type_order.iter().any(|t| t == kind) {
            self.type_order.push(kind.to_string());
        }

        if !commit.affects.is_empty() {
            // Each commit lands at most once per package bucket.
            let mut targets: Vec<&str> = Vec::new();
            for package in &commit.affects {
                self.raise(package, kind);
                targets.push(package);
            }
            targets.push(&sentinels.root);

            if commit.has_scope(&sentinels.icons) {
                self.raise(&sentinels.icons, kind);
                targets.push(&sentinels.icons);
            }

            targets.sort_unstable();
            targets.dedup();
            for package in targets {
                self.index.insert(package, commit);
            }
        }

        self.repo_bump = Some(next_bump(kind, self.repo_bump));
        self
    }

    fn raise(&mut self, package: &str, kind: &str) {
        let current = self.package_bumps.get(package).copied();
        self.package_bumps
            .insert(package.to_string(), next_bump(kind, current));
    }

    /// Returns the bump of a package.
    #[must_use]
    pub fn bump_for(&self, package: &str) -> Option<BumpType> {
        self.package_bumps.get(package).copied()
    }
}

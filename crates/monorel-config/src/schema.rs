//! Configuration schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Label used for commit types with no configured label.
const FALLBACK_LABEL: &str = "Other";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Repository configuration.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Package layout configuration.
    #[serde(default)]
    pub packages: PackagesConfig,

    /// Changelog configuration.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Versions file and tag configuration.
    #[serde(default)]
    pub versions: VersionsConfig,

    /// Release driver configuration.
    #[serde(default)]
    pub releaser: ReleaserConfig,
}

impl Config {
    /// Checks values that deserialize fine but cannot drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("repository.remote", &self.repository.remote),
            ("packages.dir", &self.packages.dir),
            ("packages.root_name", &self.packages.root_name),
            ("changelog.file", &self.changelog.file),
            ("versions.file", &self.versions.file),
            ("releaser.commit_scope", &self.releaser.commit_scope),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }

        if self.packages.dir.contains('/') {
            return Err(ConfigError::Invalid(
                "packages.dir must be a single directory name".to_string(),
            ));
        }

        if self.packages.root_name == self.packages.icons_scope {
            return Err(ConfigError::Invalid(
                "packages.root_name and packages.icons_scope must differ".to_string(),
            ));
        }

        Ok(())
    }
}

/// Repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Web URL used for compare, commit and issue links.
    #[serde(default = "default_repository_url")]
    pub url: String,

    /// Remote used to fetch tags and push the release commit.
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: default_repository_url(),
            remote: default_remote(),
        }
    }
}

fn default_repository_url() -> String {
    "https://github.com/rocketclimb/rocketicons".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Package layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Directory holding the workspace packages.
    #[serde(default = "default_packages_dir")]
    pub dir: String,

    /// Sentinel name of the root package.
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Commit scope that denotes the icon library.
    #[serde(default = "default_icons_scope")]
    pub icons_scope: String,

    /// Directory of the icon library package, relative to the repository root.
    #[serde(default = "default_icons_dir")]
    pub icons_dir: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            dir: default_packages_dir(),
            root_name: default_root_name(),
            icons_scope: default_icons_scope(),
            icons_dir: default_icons_dir(),
        }
    }
}

fn default_packages_dir() -> String {
    "packages".to_string()
}

fn default_root_name() -> String {
    "rocketclimb-icons".to_string()
}

fn default_icons_scope() -> String {
    "icons".to_string()
}

fn default_icons_dir() -> String {
    "packages/icons".to_string()
}

/// Changelog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Changelog file name, in the root and in every package directory.
    #[serde(default = "default_changelog_file")]
    pub file: String,

    /// Scopes never rendered.
    #[serde(default = "default_ignore_scopes")]
    pub ignore_scopes: Vec<String>,

    /// Release notes output file.
    #[serde(default = "default_release_notes")]
    pub release_notes: String,

    /// Section display order. Types not listed follow in encounter order.
    #[serde(default = "default_type_order")]
    pub type_order: Vec<String>,

    /// Section labels by commit type.
    #[serde(default = "default_labels")]
    pub labels: BTreeMap<String, String>,
}

impl ChangelogConfig {
    /// Returns the section label for a commit type.
    #[must_use]
    pub fn label_for(&self, commit_type: &str) -> &str {
        self.labels
            .get(commit_type)
            .map_or(FALLBACK_LABEL, String::as_str)
    }

    /// Returns true if commits with this scope are left out of the output.
    #[must_use]
    pub fn is_ignored_scope(&self, scope: Option<&str>) -> bool {
        scope.is_some_and(|scope| self.ignore_scopes.iter().any(|s| s == scope))
    }
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: default_changelog_file(),
            ignore_scopes: default_ignore_scopes(),
            release_notes: default_release_notes(),
            type_order: default_type_order(),
            labels: default_labels(),
        }
    }
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_ignore_scopes() -> Vec<String> {
    vec!["changelog".to_string()]
}

fn default_release_notes() -> String {
    "release-notes.md".to_string()
}

fn default_type_order() -> Vec<String> {
    ["feat", "fix", "docs", "style", "refactor", "test", "chore", "other"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_labels() -> BTreeMap<String, String> {
    [
        ("feat", "Features"),
        ("fix", "Bug Fixes"),
        ("docs", "Documentation"),
        ("style", "Formatting"),
        ("refactor", "Refactoring"),
        ("test", "Test"),
        ("chore", "Miscellaneous"),
        ("other", "Other"),
        ("ci", "Continuous integration"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Versions file and tag configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Path of the versions file, relative to the repository root.
    #[serde(default = "default_versions_file")]
    pub file: String,

    /// Tag prefix (e.g., "v").
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Suffix appended to the tag name when the icon library is released.
    #[serde(default = "default_release_marker")]
    pub release_marker: String,

    /// Tag used when the repository has no release tag yet.
    #[serde(default = "default_initial_tag")]
    pub initial_tag: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            file: default_versions_file(),
            tag_prefix: default_tag_prefix(),
            release_marker: default_release_marker(),
            initial_tag: default_initial_tag(),
        }
    }
}

fn default_versions_file() -> String {
    ".latest-versions.json".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_release_marker() -> String {
    "-release".to_string()
}

fn default_initial_tag() -> String {
    "v0.0.0".to_string()
}

/// Release driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaserConfig {
    /// Scope of the automation commit (`ci(<scope>): ...`).
    #[serde(default = "default_commit_scope")]
    pub commit_scope: String,

    /// Description of the automation commit, before the branch suffix.
    #[serde(default = "default_commit_subject")]
    pub commit_subject: String,
}

impl ReleaserConfig {
    /// Returns the full automation commit subject for a branch.
    #[must_use]
    pub fn commit_message(&self, branch: &str) -> String {
        format!(
            "ci({}): {} ({branch})",
            self.commit_scope, self.commit_subject
        )
    }
}

impl Default for ReleaserConfig {
    fn default() -> Self {
        Self {
            commit_scope: default_commit_scope(),
            commit_subject: default_commit_subject(),
        }
    }
}

fn default_commit_scope() -> String {
    "releaser".to_string()
}

fn default_commit_subject() -> String {
    "bump packages versions and update changelog".to_string()
}

//! Log classification: raw blocks to parsed commits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conventional::parse_subject;
use crate::parsed::ParsedCommit;
use crate::raw::RawCommitBlock;

/// How changed file paths map to package names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLayout {
    /// Directory holding the workspace packages (e.g. `packages`).
    pub packages_dir: String,

    /// Sentinel name for files outside the packages directory.
    pub root_package: String,
}

impl PackageLayout {
    /// Creates a new layout.
    #[must_use]
    pub fn new(packages_dir: impl Into<String>, root_package: impl Into<String>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            root_package: root_package.into(),
        }
    }

    /// Returns the package a changed file belongs to.
    ///
    /// `packages/<name>/...` maps to `<name>`. Everything else, including a
    /// file sitting directly in the packages directory, maps to the root
    /// sentinel.
    #[must_use]
    pub fn package_for_path<'a>(&'a self, path: &'a str) -> &'a str {
        let path = path.trim_start_matches("./");
        let mut segments = path.split('/');

        match (segments.next(), segments.next(), segments.next()) {
            (Some(dir), Some(name), Some(_)) if dir == self.packages_dir && !name.is_empty() => {
                name
            }
            _ => &self.root_package,
        }
    }

    /// Returns true if `name` is the root sentinel.
    #[must_use]
    pub fn is_root(&self, name: &str) -> bool {
        name == self.root_package
    }
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self::new("packages", "rocketclimb-icons")
    }
}

/// Classifies a single block.
#[must_use]
pub fn classify_block(block: &RawCommitBlock, layout: &PackageLayout) -> ParsedCommit {
    let subject = parse_subject(&block.subject);

    let mut commit = ParsedCommit {
        r#type: subject.r#type,
        scope: subject.scope,
        subject: subject.description,
        references: subject.references,
        short: block.short.clone(),
        hash: block.hash.clone(),
        affects: Vec::new(),
    };

    for file in &block.files {
        commit.add_affected(layout.package_for_path(file));
    }

    commit
}

/// Classifies a whole log, one commit per header, in log order.
#[must_use]
pub fn classify_log(log: &str, layout: &PackageLayout) -> Vec<ParsedCommit> {
    let commits: Vec<ParsedCommit> = RawCommitBlock::parse_all(log)
        .iter()
        .map(|block| classify_block(block, layout))
        .collect();

    debug!(count = commits.len(), "classified commits");
    commits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PackageLayout {
        PackageLayout::default()
    }

    #[test]
    fn test_package_for_path() {
        let layout = layout();
        assert_eq!(layout.package_for_path("packages/icons/src/Moon.js"), "icons");
        assert_eq!(layout.package_for_path("packages/react/package.json"), "react");
        assert_eq!(layout.package_for_path("./packages/react/index.js"), "react");
        assert_eq!(layout.package_for_path("README.md"), "rocketclimb-icons");
        assert_eq!(layout.package_for_path("bin/releaser.js"), "rocketclimb-icons");
        assert_eq!(layout.package_for_path("packages/README.md"), "rocketclimb-icons");
        assert_eq!(layout.package_for_path("packagesfoo/x/y.js"), "rocketclimb-icons");
    }

    #[test]
    fn test_custom_layout() {
        let layout = PackageLayout::new("crates", "root");
        assert_eq!(layout.package_for_path("crates/core/src/lib.rs"), "core");
        assert_eq!(layout.package_for_path("packages/icons/a.js"), "root");
        assert!(layout.is_root("root"));
        assert!(!layout.is_root("core"));
    }

    #[test]
    fn test_classify_block() {
        let block = RawCommitBlock::new("abc", "feat(icons): add moon icon", "abcdef")
            .with_file("packages/icons/src/Moon.js");

        let commit = classify_block(&block, &layout());
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.scope.as_deref(), Some("icons"));
        assert_eq!(commit.subject, "add moon icon");
        assert_eq!(commit.short, "abc");
        assert_eq!(commit.hash, "abcdef");
        assert_eq!(commit.affects, vec!["icons".to_string()]);
    }

    #[test]
    fn test_classify_block_dedups_affects() {
        let block = RawCommitBlock::new("a", "fix: sizes", "af")
            .with_file("packages/react/a.js")
            .with_file("README.md")
            .with_file("packages/react/b.js")
            .with_file("bin/x.js");

        let commit = classify_block(&block, &layout());
        assert_eq!(
            commit.affects,
            vec!["react".to_string(), "rocketclimb-icons".to_string()]
        );
    }

    #[test]
    fn test_classify_block_without_files() {
        let block = RawCommitBlock::new("a", "chore: release", "af");
        let commit = classify_block(&block, &layout());
        assert!(commit.affects.is_empty());
    }

    #[test]
    fn test_classify_log_one_commit_per_header() {
        let log = "##a|||feat(icons): add moon icon|||af\n\
                   packages/icons/src/Moon.js\n\
                   ##b|||not conventional at all|||bf\n\
                   README.md\n\
                   ##c|||docs: empty|||cf\n";

        let commits = classify_log(log, &layout());
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].kind(), "feat");
        assert_eq!(commits[1].kind(), "other");
        assert_eq!(commits[1].subject, "not conventional at all");
        assert_eq!(commits[1].affects, vec!["rocketclimb-icons".to_string()]);
        assert!(commits[2].affects.is_empty());
    }
}

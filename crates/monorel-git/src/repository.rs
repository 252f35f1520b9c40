//! The repository seam used by the release driver.

use std::path::Path;

use tracing::debug;

use crate::GitResult;

/// Git operations needed for a release run.
pub trait Repository {
    /// Returns the working tree root.
    fn workdir(&self) -> &Path;

    /// Returns the name of the checked out branch.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD is unborn or detached.
    fn current_branch(&self) -> GitResult<String>;

    /// Fetches tags from `remote`, pruning the ones deleted there.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    fn fetch_tags(&self, remote: &str) -> GitResult<()>;

    /// Returns all tag names.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    fn tags(&self) -> GitResult<Vec<String>>;

    /// Returns the commits reachable from HEAD, newest first, rendered as a
    /// block log. With `since`, commits reachable from that tag are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if `since` does not resolve or history cannot be read.
    fn log(&self, since: Option<&str>) -> GitResult<String>;

    /// Puts `paths` back to their content in the first parent of `hash`.
    /// Paths absent from the parent are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be found or a file cannot be
    /// written.
    fn restore_from_parent(&self, hash: &str, paths: &[String]) -> GitResult<()>;

    /// Stages `paths` and commits them on HEAD. Returns the new commit hash.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    fn commit(&self, message: &str, paths: &[String]) -> GitResult<String>;

    /// Pushes `branch` to `remote` without running hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    fn push(&self, remote: &str, branch: &str) -> GitResult<()>;

    /// Returns the highest tag that is `prefix` followed by a semver version.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    fn latest_version_tag(&self, prefix: &str) -> GitResult<Option<String>> {
        let tags = self.tags()?;

        let mut version_tags: Vec<_> = tags
            .into_iter()
            .filter_map(|t| {
                let version_str = t.strip_prefix(prefix)?;
                semver::Version::parse(version_str).ok().map(|v| (t, v))
            })
            .collect();

        version_tags.sort_by(|a, b| b.1.cmp(&a.1));

        let latest = version_tags.into_iter().next().map(|(tag, _)| tag);
        debug!(?latest, prefix, "resolved latest version tag");
        Ok(latest)
    }
}

//! git2-backed repository.

use std::path::Path;
use std::process::Command;

use git2::{Commit, ErrorCode, Repository as Git2Repo, Sort};
use monorel_commit::RawCommitBlock;
use tracing::{debug, info};

use crate::{GitError, GitResult, Repository};

/// A Git repository on disk.
pub struct GitRepository {
    inner: Git2Repo,
}

impl GitRepository {
    /// Opens a repository at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a valid Git repository.
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner = Git2Repo::open(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    /// Discovers the repository from the given directory upwards.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner =
            Git2Repo::discover(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    fn find_commit(&self, rev: &str) -> GitResult<Commit<'_>> {
        self.inner
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| GitError::CommitNotFound(rev.to_string()))
    }

    fn block_for(&self, commit: &Commit<'_>) -> GitResult<RawCommitBlock> {
        let short_id = commit.as_object().short_id()?;
        let short = short_id.as_str().unwrap_or_default();
        let subject = commit.summary().unwrap_or_default();

        let mut block = RawCommitBlock::new(short, subject, commit.id().to_string());
        block.files = self.changed_files(commit)?;
        Ok(block)
    }

    /// Files changed against the first parent. Merge commits list none, the
    /// same as `git log --name-only`.
    fn changed_files(&self, commit: &Commit<'_>) -> GitResult<Vec<String>> {
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() == 0 {
            None
        } else {
            Some(commit.parent(0)?.tree()?)
        };

        let diff = self
            .inner
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .collect())
    }

    fn run_git(&self, args: &[&str]) -> GitResult<String> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(self.workdir())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(GitError::CommandFailed { command, reason });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Repository for GitRepository {
    fn workdir(&self) -> &Path {
        self.inner.workdir().unwrap_or_else(|| self.inner.path())
    }

    fn current_branch(&self) -> GitResult<String> {
        let head = self.inner.head()?;
        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }
        head.shorthand()
            .map(String::from)
            .ok_or(GitError::DetachedHead)
    }

    fn fetch_tags(&self, remote: &str) -> GitResult<()> {
        self.run_git(&["fetch", "--prune-tags", "--prune", "-q", remote])?;
        Ok(())
    }

    fn tags(&self) -> GitResult<Vec<String>> {
        let tags = self.inner.tag_names(None)?;
        Ok(tags.iter().flatten().map(String::from).collect())
    }

    fn log(&self, since: Option<&str>) -> GitResult<String> {
        let mut revwalk = self.inner.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        if let Some(tag_name) = since {
            let tag_commit = self
                .inner
                .revparse_single(tag_name)
                .and_then(|object| object.peel_to_commit())
                .map_err(|_| GitError::TagNotFound(tag_name.to_string()))?;
            revwalk.hide(tag_commit.id())?;
        }

        let mut blocks = Vec::new();
        for oid in revwalk {
            let commit = self.inner.find_commit(oid?)?;
            blocks.push(self.block_for(&commit)?);
        }

        debug!(count = blocks.len(), ?since, "read commit log");
        Ok(RawCommitBlock::render_all(&blocks))
    }

    fn restore_from_parent(&self, hash: &str, paths: &[String]) -> GitResult<()> {
        let commit = self.find_commit(hash)?;
        let parent_tree = commit.parent(0)?.tree()?;

        for path in paths {
            let target = self.workdir().join(path);
            match parent_tree.get_path(Path::new(path)) {
                Ok(entry) => {
                    let blob = self.inner.find_blob(entry.id())?;
                    if let Some(dir) = target.parent() {
                        std::fs::create_dir_all(dir)?;
                    }
                    std::fs::write(&target, blob.content())?;
                    debug!(path, "restored from parent");
                }
                Err(e) if e.code() == ErrorCode::NotFound => {
                    if target.exists() {
                        std::fs::remove_file(&target)?;
                        debug!(path, "removed, absent in parent");
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    fn commit(&self, message: &str, paths: &[String]) -> GitResult<String> {
        let mut index = self.inner.index()?;

        for path in paths {
            let relative = Path::new(path);
            if self.workdir().join(relative).exists() {
                index.add_path(relative)?;
            } else if index.get_path(relative, 0).is_some() {
                index.remove_path(relative)?;
            }
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;
        let sig = self.inner.signature()?;

        let parent = self.inner.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self
            .inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        info!(hash = %oid, message, "created commit");
        Ok(oid.to_string())
    }

    fn push(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.run_git(&["push", "--no-verify", remote, branch])?;
        info!(remote, branch, "pushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, GitRepository) {
        let temp_dir = TempDir::new().unwrap();
        let git2_repo = Git2Repo::init(temp_dir.path()).unwrap();

        let mut config = git2_repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        git2_repo.set_head("refs/heads/main").unwrap();

        let repo = GitRepository { inner: git2_repo };
        (temp_dir, repo)
    }

    fn commit_files(repo: &GitRepository, message: &str, files: &[(&str, &str)]) -> git2::Oid {
        let mut index = repo.inner.index().unwrap();
        for (path, content) in files {
            let target = repo.workdir().join(path);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(&target, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.inner.find_tree(tree_id).unwrap();

        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.inner.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        repo.inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn tag_head(repo: &GitRepository, name: &str) {
        let head = repo.inner.head().unwrap().peel_to_commit().unwrap();
        repo.inner
            .tag_lightweight(name, head.as_object(), false)
            .unwrap();
    }

    #[test]
    fn test_open_not_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            GitRepository::open(temp_dir.path()),
            Err(GitError::NotARepo(_))
        ));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (temp_dir, _repo) = create_test_repo();
        let sub = temp_dir.path().join("packages").join("react");
        std::fs::create_dir_all(&sub).unwrap();
        assert!(GitRepository::discover(&sub).is_ok());
    }

    #[test]
    fn test_current_branch() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        assert_eq!(repo.current_branch().unwrap(), "main");
    }

    #[test]
    fn test_current_branch_detached() {
        let (_temp_dir, repo) = create_test_repo();
        let oid = commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        repo.inner.set_head_detached(oid).unwrap();
        assert!(matches!(repo.current_branch(), Err(GitError::DetachedHead)));
    }

    #[test]
    fn test_latest_version_tag() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        tag_head(&repo, "v1.2.0");
        tag_head(&repo, "v1.10.0");
        tag_head(&repo, "v1.9.3-release");
        tag_head(&repo, "nightly");

        assert_eq!(
            repo.latest_version_tag("v").unwrap().as_deref(),
            Some("v1.10.0")
        );
        assert_eq!(repo.latest_version_tag("release-").unwrap(), None);
    }

    #[test]
    fn test_log_full_history() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        commit_files(
            &repo,
            "feat(icons): add moon icon",
            &[("packages/icons/src/Moon.js", "moon")],
        );

        let blocks = RawCommitBlock::parse_all(&repo.log(None).unwrap());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].subject, "feat(icons): add moon icon");
        assert_eq!(blocks[0].files, vec!["packages/icons/src/Moon.js".to_string()]);
        assert_eq!(blocks[0].hash.len(), 40);
        assert!(blocks[0].hash.starts_with(&blocks[0].short));
        assert_eq!(blocks[1].files, vec!["README.md".to_string()]);
    }

    #[test]
    fn test_log_since_tag() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        tag_head(&repo, "v1.0.0");
        commit_files(&repo, "fix: second", &[("a.js", "a")]);
        commit_files(&repo, "fix: third", &[("b.js", "b")]);

        let blocks = RawCommitBlock::parse_all(&repo.log(Some("v1.0.0")).unwrap());
        let subjects: Vec<_> = blocks.iter().map(|b| b.subject.as_str()).collect();
        assert_eq!(subjects, vec!["fix: third", "fix: second"]);
    }

    #[test]
    fn test_log_unknown_tag() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        assert!(matches!(
            repo.log(Some("v9.9.9")),
            Err(GitError::TagNotFound(_))
        ));
    }

    #[test]
    fn test_commit_and_restore_from_parent() {
        let (temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("CHANGELOG.md", "old\n")]);

        std::fs::write(temp_dir.path().join("CHANGELOG.md"), "new\n").unwrap();
        std::fs::write(temp_dir.path().join(".latest-versions.json"), "{}").unwrap();
        let paths = vec!["CHANGELOG.md".to_string(), ".latest-versions.json".to_string()];
        let hash = repo.commit("ci(releaser): bump (main)", &paths).unwrap();

        let blocks = RawCommitBlock::parse_all(&repo.log(None).unwrap());
        assert_eq!(blocks[0].hash, hash);
        assert_eq!(blocks[0].files.len(), 2);

        repo.restore_from_parent(&hash, &paths).unwrap();
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("CHANGELOG.md")).unwrap(),
            "old\n"
        );
        assert!(!temp_dir.path().join(".latest-versions.json").exists());
    }

    #[test]
    fn test_restore_unknown_commit() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        assert!(matches!(
            repo.restore_from_parent("deadbeef", &[]),
            Err(GitError::CommitNotFound(_))
        ));
    }

    #[test]
    fn test_push_without_remote_fails() {
        let (_temp_dir, repo) = create_test_repo();
        commit_files(&repo, "chore: init", &[("README.md", "hi")]);
        assert!(repo.push("origin", "main").is_err());
    }
}

//! In-memory repository for tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use monorel_commit::RawCommitBlock;

use crate::{GitError, GitResult, Repository};

#[derive(Debug, Clone)]
struct MemoryCommit {
    block: RawCommitBlock,
    /// Content of each touched path before this commit; `None` if absent.
    before: BTreeMap<String, Option<String>>,
}

/// A repository that keeps history in memory and reads file content from a
/// real working directory.
///
/// Committing snapshots the current content of the given paths, so a later
/// [`Repository::restore_from_parent`] can put them back.
#[derive(Debug)]
pub struct MemoryRepository {
    workdir: PathBuf,
    branch: String,
    commits: RefCell<Vec<MemoryCommit>>,
    tags: RefCell<Vec<(String, usize)>>,
    committed: RefCell<BTreeMap<String, String>>,
    pushes: RefCell<Vec<(String, String)>>,
    fetches: Cell<usize>,
    fail_fetch: bool,
    fail_push: bool,
}

impl MemoryRepository {
    /// Creates an empty repository on branch `main`.
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            branch: "main".to_string(),
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            committed: RefCell::new(BTreeMap::new()),
            pushes: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
            fail_fetch: false,
            fail_push: false,
        }
    }

    /// Sets the checked out branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Makes [`Repository::fetch_tags`] fail.
    #[must_use]
    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Makes [`Repository::push`] fail.
    #[must_use]
    pub fn with_failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Records a commit touching `files` without reading the working tree.
    /// Returns the full hash.
    pub fn add_commit(&self, subject: &str, files: &[&str]) -> String {
        let files: Vec<String> = files.iter().map(|f| (*f).to_string()).collect();
        self.record(subject, files, BTreeMap::new())
    }

    /// Tags the current HEAD.
    pub fn tag(&self, name: impl Into<String>) {
        let head = self.commits.borrow().len();
        self.tags.borrow_mut().push((name.into(), head));
    }

    /// Returns the subjects of all commits, newest first.
    #[must_use]
    pub fn subjects(&self) -> Vec<String> {
        self.commits
            .borrow()
            .iter()
            .rev()
            .map(|c| c.block.subject.clone())
            .collect()
    }

    /// Returns every `(remote, branch)` pushed so far.
    #[must_use]
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.borrow().clone()
    }

    /// Returns how many times tags were fetched.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn record(
        &self,
        subject: &str,
        files: Vec<String>,
        before: BTreeMap<String, Option<String>>,
    ) -> String {
        let mut commits = self.commits.borrow_mut();
        let hash = format!("{:040x}", commits.len() + 1);
        let short = hash[hash.len() - 7..].to_string();

        let mut block = RawCommitBlock::new(short, subject, hash.clone());
        block.files = files;
        commits.push(MemoryCommit { block, before });
        hash
    }

    /// Content of `path` just before the first of `commits`: the snapshot
    /// taken by the earliest of them touching it, or the committed content
    /// when none did.
    fn content_before(&self, commits: &[MemoryCommit], path: &str) -> Option<String> {
        commits
            .iter()
            .find_map(|c| c.before.get(path))
            .cloned()
            .unwrap_or_else(|| self.committed.borrow().get(path).cloned())
    }

    fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.workdir.join(path)).ok()
    }
}

impl Repository for MemoryRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn current_branch(&self) -> GitResult<String> {
        Ok(self.branch.clone())
    }

    fn fetch_tags(&self, remote: &str) -> GitResult<()> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail_fetch {
            return Err(GitError::CommandFailed {
                command: format!("git fetch --prune-tags --prune -q {remote}"),
                reason: "no network".to_string(),
            });
        }
        Ok(())
    }

    fn tags(&self) -> GitResult<Vec<String>> {
        Ok(self.tags.borrow().iter().map(|(t, _)| t.clone()).collect())
    }

    fn log(&self, since: Option<&str>) -> GitResult<String> {
        let start = match since {
            Some(tag) => self
                .tags
                .borrow()
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, at)| *at)
                .ok_or_else(|| GitError::TagNotFound(tag.to_string()))?,
            None => 0,
        };

        let blocks: Vec<RawCommitBlock> = self.commits.borrow()[start..]
            .iter()
            .rev()
            .map(|c| c.block.clone())
            .collect();

        Ok(RawCommitBlock::render_all(&blocks))
    }

    fn restore_from_parent(&self, hash: &str, paths: &[String]) -> GitResult<()> {
        let commits = self.commits.borrow();
        let idx = commits
            .iter()
            .position(|c| c.block.hash == hash || c.block.short == hash)
            .ok_or_else(|| GitError::CommitNotFound(hash.to_string()))?;

        for path in paths {
            let target = self.workdir.join(path);
            match self.content_before(&commits[idx..], path) {
                Some(content) => {
                    if let Some(dir) = target.parent() {
                        std::fs::create_dir_all(dir)?;
                    }
                    std::fs::write(&target, content)?;
                }
                None => {
                    if target.exists() {
                        std::fs::remove_file(&target)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn commit(&self, message: &str, paths: &[String]) -> GitResult<String> {
        let mut before = BTreeMap::new();
        let mut changed = Vec::new();

        {
            let mut committed = self.committed.borrow_mut();
            for path in paths {
                let previous = committed.get(path).cloned();
                let current = self.read(path);
                if previous == current {
                    continue;
                }

                match &current {
                    Some(content) => committed.insert(path.clone(), content.clone()),
                    None => committed.remove(path),
                };
                before.insert(path.clone(), previous);
                changed.push(path.clone());
            }
        }

        Ok(self.record(message, changed, before))
    }

    fn push(&self, remote: &str, branch: &str) -> GitResult<()> {
        if self.fail_push {
            return Err(GitError::CommandFailed {
                command: format!("git push --no-verify {remote} {branch}"),
                reason: "rejected".to_string(),
            });
        }
        self.pushes
            .borrow_mut()
            .push((remote.to_string(), branch.to_string()));
        Ok(())
    }
}

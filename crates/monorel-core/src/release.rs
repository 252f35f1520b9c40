//! Release orchestration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use monorel_commit::{PackageLayout, RawCommitBlock, classify_block};
use monorel_config::Config;
use monorel_git::Repository;
use monorel_npm::{MANIFEST_FILE, PackageManager, remove_tarballs};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::generate::{
    ChangelogGenerator, ChangelogOutcome, is_automation_commit, is_initial_tag, resolve_latest_tag,
};
use crate::{BumpType, CoreResult, VersionManager, VersionsFile, Workspace};

/// Lock file refreshed by `npm version` next to a manifest.
const LOCK_FILE: &str = "package-lock.json";

/// What a release run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    /// The changelog step.
    pub changelog: ChangelogOutcome,

    /// Tag name to publish; set only when the root package was bumped.
    pub tag: Option<String>,

    /// Versions set during this run.
    pub new_versions: BTreeMap<String, String>,

    /// Hash of the release commit.
    pub commit: String,

    /// Automation commit that was undone before this run, if any.
    pub reverted: Option<String>,
}

/// Drives a full release run.
pub struct ReleaseDriver<'a, R: Repository, P: PackageManager> {
    repo: &'a R,
    npm: &'a P,
    config: &'a Config,
    pre_release_tag: Option<String>,
    date: NaiveDate,
    version_manager: VersionManager,
}

impl<'a, R: Repository, P: PackageManager> ReleaseDriver<'a, R, P> {
    /// Creates a new release driver dated today (UTC).
    #[must_use]
    pub fn new(repo: &'a R, npm: &'a P, config: &'a Config) -> Self {
        Self {
            repo,
            npm,
            config,
            pre_release_tag: None,
            date: chrono::Utc::now().date_naive(),
            version_manager: VersionManager::new(),
        }
    }

    /// Sets the pre-release suffix for the icon library version.
    #[must_use]
    pub fn pre_release_tag(mut self, tag: Option<String>) -> Self {
        self.pre_release_tag = tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    /// Sets the date used in changelog headings.
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Runs the release.
    ///
    /// `previous_tag` overrides the latest version tag as range start.
    ///
    /// # Errors
    ///
    /// Returns an error on any step that cannot be skipped: reading tags,
    /// the versions file or the log, writing changelogs, setting versions,
    /// packing after a bump, committing and pushing.
    pub fn run(&self, previous_tag: Option<&str>) -> CoreResult<ReleaseOutcome> {
        info!("starting release");
        let root_dir = self.repo.workdir();

        let workspace = Workspace::discover(root_dir, &self.config.packages.dir)?;
        let branch = self.repo.current_branch()?;
        let latest_tag = match previous_tag {
            Some(tag) => tag.to_string(),
            None => resolve_latest_tag(self.repo, self.config)?,
        };
        debug!(%branch, %latest_tag, "release range");

        let reverted = self.revert_previous_run(&branch, &latest_tag);

        let versions_path = root_dir.join(&self.config.versions.file);
        let mut versions = VersionsFile::read(&versions_path)?;

        let changelog = ChangelogGenerator::new(self.repo, self.config, self.date)
            .generate(&latest_tag, &versions)?;

        let mut new_versions = BTreeMap::new();
        let mut touched: Vec<PathBuf> = Vec::new();
        let mut tag_name = changelog.new_tag.clone();

        let packages = &self.config.packages;
        for (package, bump) in &changelog.package_bumps {
            if *package == packages.root_name || *package == packages.icons_scope {
                continue;
            }
            let Some(member) = workspace.find(package) else {
                debug!(package, "not a workspace package, skipping version bump");
                continue;
            };

            let next = self
                .version_manager
                .bump_text(versions.version(package), Some(*bump), true)?;
            let recorded = self.npm.set_version(&root_dir.join(&member.dir), &next)?;
            info!(package, version = %recorded, "bumped package");

            new_versions.insert(package.clone(), recorded);
            touched.extend(manifest_files(root_dir, &member.dir));
        }

        if let Some(version) = self.release_icons(&changelog, &mut versions)? {
            new_versions.insert(packages.icons_scope.clone(), version);
            touched.extend(manifest_files(root_dir, Path::new(&packages.icons_dir)));
            tag_name.push_str(&self.config.versions.release_marker);
        }

        if changelog.package_bumps.contains_key(&packages.root_name) {
            let bump = changelog.repo_bump.unwrap_or(BumpType::Patch);
            let next = self.version_manager.bump_text(
                versions.version(&packages.root_name),
                Some(bump),
                true,
            )?;
            let recorded = self.npm.set_version(root_dir, &next)?;
            info!(version = %recorded, "bumped root package");

            new_versions.insert(packages.root_name.clone(), recorded);
            touched.extend(manifest_files(root_dir, Path::new("")));
        }

        versions.merge(&new_versions);
        versions.write(&versions_path)?;

        let mut paths = vec![self.config.versions.file.clone()];
        paths.extend(changelog.written.iter().map(|p| path_string(p)));
        paths.extend(touched.iter().map(|p| path_string(p)));
        paths.sort();
        paths.dedup();

        let message = self.config.releaser.commit_message(&branch);
        let commit = self.repo.commit(&message, &paths)?;
        self.repo.push(&self.config.repository.remote, &branch)?;

        if let Some(note) = &changelog.release_note {
            let notes_path = root_dir.join(&self.config.changelog.release_notes);
            std::fs::write(&notes_path, format!("{note}\n"))?;
            debug!(?notes_path, "wrote release notes");
        }

        let tag = new_versions
            .contains_key(&packages.root_name)
            .then(|| tag_name.clone());
        info!(?tag, %commit, "release completed");

        Ok(ReleaseOutcome {
            changelog,
            tag,
            new_versions,
            commit,
            reverted,
        })
    }

    /// Undoes automation commits left in `latest_tag..HEAD` by earlier runs
    /// on `branch`. Restores from the parent of the oldest one. Failures are
    /// logged and the run goes on.
    fn revert_previous_run(&self, branch: &str, latest_tag: &str) -> Option<String> {
        let since = (!is_initial_tag(latest_tag, self.config)).then_some(latest_tag);
        let log = match self.repo.log(since) {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "could not look for a previous release commit");
                return None;
            }
        };

        let layout = PackageLayout::new(
            self.config.packages.dir.as_str(),
            self.config.packages.root_name.as_str(),
        );
        let suffix = format!("({branch})");
        let blocks: Vec<_> = RawCommitBlock::parse_all(&log)
            .into_iter()
            .filter(|block| {
                let commit = classify_block(block, &layout);
                is_automation_commit(&commit, self.config) && block.subject.ends_with(&suffix)
            })
            .collect();

        let oldest = blocks.last()?;

        let mut paths: Vec<String> = blocks
            .iter()
            .flat_map(|block| block.files.iter())
            .filter(|file| self.is_release_artifact(file))
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();

        match self.repo.restore_from_parent(&oldest.hash, &paths) {
            Ok(()) => {
                info!(commit = %oldest.short, files = paths.len(), "reverted previous release commit");
                Some(oldest.hash.clone())
            }
            Err(e) => {
                warn!(commit = %oldest.short, error = %e, "could not revert previous release commit");
                None
            }
        }
    }

    fn is_release_artifact(&self, path: &str) -> bool {
        path == self.config.versions.file
            || Path::new(path)
                .file_name()
                .is_some_and(|name| name == self.config.changelog.file.as_str())
    }

    /// Bumps and repacks the icon library when it has a bump or its packed
    /// content changed. Returns the new version.
    fn release_icons(
        &self,
        changelog: &ChangelogOutcome,
        versions: &mut VersionsFile,
    ) -> CoreResult<Option<String>> {
        let packages = &self.config.packages;
        let icons_dir = self.repo.workdir().join(&packages.icons_dir);
        if !icons_dir.join(MANIFEST_FILE).is_file() {
            debug!(?icons_dir, "no icon library package");
            return Ok(None);
        }

        let bump = changelog.package_bumps.get(&packages.icons_scope).copied();
        if bump.is_none() && !self.pack_changed(&icons_dir, versions.hash.as_deref()) {
            debug!("icon library unchanged");
            return Ok(None);
        }

        if let Err(e) = remove_tarballs(&icons_dir) {
            warn!(error = %e, "could not remove stale tarballs");
        }

        let mut version = self.version_manager.bump_text(
            versions.version(&packages.icons_scope),
            Some(bump.unwrap_or(BumpType::Patch)),
            true,
        )?;
        if let Some(tag) = &self.pre_release_tag {
            version = format!("{version}-{tag}");
        }

        let recorded = self.npm.set_version(&icons_dir, &version)?;
        let tarball = self.npm.pack(&icons_dir)?;
        versions.hash = Some(file_hash(&tarball)?);
        info!(version = %recorded, "released icon library");

        Ok(Some(recorded))
    }

    /// Packs the icon library and compares the tarball hash with `recorded`.
    /// A failed pack counts as changed.
    fn pack_changed(&self, icons_dir: &Path, recorded: Option<&str>) -> bool {
        let tarball = match self.npm.pack(icons_dir) {
            Ok(tarball) => tarball,
            Err(e) => {
                warn!(error = %e, "could not pack icon library, assuming it changed");
                return true;
            }
        };

        let hash = file_hash(&tarball);
        if let Err(e) = std::fs::remove_file(&tarball) {
            debug!(?tarball, error = %e, "could not remove comparison tarball");
        }

        match hash {
            Ok(hash) => recorded != Some(hash.as_str()),
            Err(e) => {
                warn!(error = %e, "could not hash icon library tarball, assuming it changed");
                true
            }
        }
    }
}

/// Returns the hex SHA-256 of a file.
fn file_hash(path: &Path) -> CoreResult<String> {
    let data = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&data)))
}

/// The manifest in `dir`, plus the lock file when there is one.
fn manifest_files(root: &Path, dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![dir.join(MANIFEST_FILE)];
    let lock = dir.join(LOCK_FILE);
    if root.join(&lock).is_file() {
        files.push(lock);
    }
    files
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.tgz");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_hash(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("packages/react")).unwrap();
        std::fs::write(dir.path().join("packages/react/package-lock.json"), "{}").unwrap();

        assert_eq!(
            manifest_files(dir.path(), Path::new("packages/react")),
            vec![
                PathBuf::from("packages/react/package.json"),
                PathBuf::from("packages/react/package-lock.json"),
            ]
        );
        assert_eq!(
            manifest_files(dir.path(), Path::new("")),
            vec![PathBuf::from("package.json")]
        );
    }
}

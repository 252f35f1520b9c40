//! Workspace package discovery.

use std::path::{Path, PathBuf};

use monorel_npm::MANIFEST_FILE;
use serde::Deserialize;
use tracing::debug;

use crate::CoreResult;

/// A package found under the packages directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePackage {
    /// Directory name; the key used in commits and the versions file.
    pub name: String,

    /// Directory relative to the repository root.
    pub dir: PathBuf,

    /// `name` field of the manifest, if any.
    pub manifest_name: Option<String>,
}

impl WorkspacePackage {
    /// Returns the manifest path relative to the repository root.
    #[must_use]
    pub fn manifest(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }
}

#[derive(Deserialize)]
struct Manifest {
    name: Option<String>,
}

/// The packages of a repository.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    packages: Vec<WorkspacePackage>,
}

impl Workspace {
    /// Lists `<root>/<packages_dir>/*/package.json`, sorted by name.
    ///
    /// A missing packages directory yields an empty workspace. A manifest
    /// that cannot be parsed still counts as a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the packages directory cannot be listed.
    pub fn discover(root: &Path, packages_dir: &str) -> CoreResult<Self> {
        let base = root.join(packages_dir);
        if !base.is_dir() {
            debug!(?base, "no packages directory");
            return Ok(Self::default());
        }

        let mut packages = Vec::new();
        for entry in std::fs::read_dir(&base)? {
            let entry = entry?;
            let manifest_path = entry.path().join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let manifest_name = std::fs::read_to_string(&manifest_path)
                .ok()
                .and_then(|content| serde_json::from_str::<Manifest>(&content).ok())
                .and_then(|manifest| manifest.name);

            packages.push(WorkspacePackage {
                dir: Path::new(packages_dir).join(&name),
                name,
                manifest_name,
            });
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = packages.len(), "discovered workspace packages");
        Ok(Self { packages })
    }

    /// Finds a package by directory name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&WorkspacePackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Returns all packages.
    #[must_use]
    pub fn packages(&self) -> &[WorkspacePackage] {
        &self.packages
    }
}

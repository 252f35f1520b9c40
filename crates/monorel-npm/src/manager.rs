//! The package manager seam.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::NpmResult;

/// Manifest file name of an npm package.
pub const MANIFEST_FILE: &str = "package.json";

/// Package manager operations needed for a release run.
pub trait PackageManager {
    /// Sets the version of the package in `dir`. Returns the version as
    /// recorded by the package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be set.
    fn set_version(&self, dir: &Path, version: &str) -> NpmResult<String>;

    /// Packs the package in `dir` and returns the tarball path.
    ///
    /// # Errors
    ///
    /// Returns an error if packing fails.
    fn pack(&self, dir: &Path) -> NpmResult<PathBuf>;
}

/// Removes every `*.tgz` in `dir`. Returns how many were removed.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a file cannot be
/// removed.
pub fn remove_tarballs(dir: &Path) -> NpmResult<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tgz") {
            std::fs::remove_file(&path)?;
            debug!(?path, "removed stale tarball");
            removed += 1;
        }
    }

    Ok(removed)
}

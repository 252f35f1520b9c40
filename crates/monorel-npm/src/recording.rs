//! A package manager that edits manifests directly and records its calls.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{MANIFEST_FILE, NpmError, NpmResult, PackageManager};

/// A call made to [`RecordingPackageManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManagerCall {
    /// `set_version(dir, version)`.
    SetVersion(PathBuf, String),
    /// `pack(dir)`.
    Pack(PathBuf),
}

/// Writes `version` into `package.json` and packs by copying the manifest
/// into `<name>-<version>.tgz`, so the tarball changes whenever the
/// manifest does.
#[derive(Debug, Default)]
pub struct RecordingPackageManager {
    calls: RefCell<Vec<PackageManagerCall>>,
    fail_pack: bool,
    fail_set_version: bool,
}

impl RecordingPackageManager {
    /// Creates a new recording package manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `pack` call fail.
    #[must_use]
    pub fn with_failing_pack(mut self) -> Self {
        self.fail_pack = true;
        self
    }

    /// Makes every `set_version` call fail.
    #[must_use]
    pub fn with_failing_set_version(mut self) -> Self {
        self.fail_set_version = true;
        self
    }

    /// Returns the calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<PackageManagerCall> {
        self.calls.borrow().clone()
    }

    /// Returns the versions set so far, as `(dir, version)`.
    #[must_use]
    pub fn versions_set(&self) -> Vec<(PathBuf, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PackageManagerCall::SetVersion(dir, v) => Some((dir.clone(), v.clone())),
                PackageManagerCall::Pack(_) => None,
            })
            .collect()
    }

    fn read_manifest(dir: &Path) -> NpmResult<(PathBuf, Value)> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)?;
        let manifest: Value = serde_json::from_str(&content)?;
        if !manifest.is_object() {
            return Err(NpmError::InvalidManifest {
                path,
                reason: "not a JSON object".to_string(),
            });
        }
        Ok((path, manifest))
    }
}

impl PackageManager for RecordingPackageManager {
    fn set_version(&self, dir: &Path, version: &str) -> NpmResult<String> {
        self.calls.borrow_mut().push(PackageManagerCall::SetVersion(
            dir.to_path_buf(),
            version.to_string(),
        ));

        if self.fail_set_version {
            return Err(NpmError::CommandFailed {
                command: format!("npm version {version}"),
                reason: "simulated failure".to_string(),
            });
        }

        let (path, mut manifest) = Self::read_manifest(dir)?;
        if let Some(object) = manifest.as_object_mut() {
            object.insert("version".to_string(), Value::String(version.to_string()));
        }
        std::fs::write(&path, format!("{}\n", serde_json::to_string_pretty(&manifest)?))?;

        Ok(version.to_string())
    }

    fn pack(&self, dir: &Path) -> NpmResult<PathBuf> {
        self.calls
            .borrow_mut()
            .push(PackageManagerCall::Pack(dir.to_path_buf()));

        if self.fail_pack {
            return Err(NpmError::CommandFailed {
                command: "npm pack".to_string(),
                reason: "simulated failure".to_string(),
            });
        }

        let (path, manifest) = Self::read_manifest(dir)?;
        let field = |key: &str| {
            manifest
                .get(key)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| NpmError::InvalidManifest {
                    path: path.clone(),
                    reason: format!("missing `{key}`"),
                })
        };
        let name = field("name")?;
        let version = field("version")?;

        let file_name = format!(
            "{}-{version}.tgz",
            name.trim_start_matches('@').replace('/', "-")
        );
        let tarball = dir.join(file_name);
        std::fs::copy(&path, &tarball)?;

        Ok(tarball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package(dir: &Path, name: &str, version: &str) {
        std::fs::write(
            dir.join(MANIFEST_FILE),
            format!("{{\"name\": \"{name}\", \"version\": \"{version}\"}}"),
        )
        .unwrap();
    }

    #[test]
    fn test_set_version_rewrites_manifest() {
        let dir = TempDir::new().unwrap();
        package(dir.path(), "@rocketicons/react", "1.0.0");

        let pm = RecordingPackageManager::new();
        assert_eq!(pm.set_version(dir.path(), "1.1.0").unwrap(), "1.1.0");

        let content = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        let manifest: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(manifest["version"], "1.1.0");
        assert_eq!(manifest["name"], "@rocketicons/react");
        assert_eq!(
            pm.versions_set(),
            vec![(dir.path().to_path_buf(), "1.1.0".to_string())]
        );
    }

    #[test]
    fn test_pack_names_tarball() {
        let dir = TempDir::new().unwrap();
        package(dir.path(), "@rocketicons/icons", "2.0.0");

        let pm = RecordingPackageManager::new();
        let tarball = pm.pack(dir.path()).unwrap();
        assert_eq!(tarball, dir.path().join("rocketicons-icons-2.0.0.tgz"));
        assert!(tarball.exists());
        assert_eq!(pm.calls(), vec![PackageManagerCall::Pack(dir.path().to_path_buf())]);
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let pm = RecordingPackageManager::new();
        assert!(matches!(pm.pack(dir.path()), Err(NpmError::Io(_))));
    }

    #[test]
    fn test_manifest_not_an_object() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[]").unwrap();
        let pm = RecordingPackageManager::new();
        assert!(matches!(
            pm.set_version(dir.path(), "1.0.0"),
            Err(NpmError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn test_failures_are_recorded() {
        let dir = TempDir::new().unwrap();
        package(dir.path(), "icons", "1.0.0");
        let pm = RecordingPackageManager::new()
            .with_failing_pack()
            .with_failing_set_version();

        assert!(pm.pack(dir.path()).is_err());
        assert!(pm.set_version(dir.path(), "1.0.1").is_err());
        assert_eq!(pm.calls().len(), 2);
    }
}

//! The persisted versions file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CoreError, CoreResult};

/// Version reported for packages missing from the file.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Package versions plus the checksum of the packed icon library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsFile {
    /// Checksum of the last packed icon library tarball.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Version per package or sentinel name.
    #[serde(flatten)]
    pub versions: BTreeMap<String, String>,
}

impl VersionsFile {
    /// Reads the file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::VersionsFile`] if the file is missing or is not a
    /// JSON object of strings.
    pub fn read(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::VersionsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file: Self = serde_json::from_str(&content).map_err(|e| CoreError::VersionsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(?path, packages = file.versions.len(), "read versions file");
        Ok(file)
    }

    /// Writes the file through a temporary sibling and a rename.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn write(&self, path: &Path) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(self)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));

        std::fs::write(&tmp, format!("{content}\n"))?;
        std::fs::rename(&tmp, path)?;

        debug!(?path, "wrote versions file");
        Ok(())
    }

    /// Returns the version of a package, `0.0.0` when unknown.
    #[must_use]
    pub fn version(&self, package: &str) -> &str {
        self.versions
            .get(package)
            .map_or(DEFAULT_VERSION, String::as_str)
    }

    /// Overwrites entries with `updates`; other entries are kept.
    pub fn merge(&mut self, updates: &BTreeMap<String, String>) {
        for (package, version) in updates {
            self.versions.insert(package.clone(), version.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".latest-versions.json");
        std::fs::write(
            &path,
            r#"{"rocketclimb-icons": "0.3.0", "icons": "0.2.1-beta", "react": "0.1.4", "hash": "abc"}"#,
        )
        .unwrap();

        let file = VersionsFile::read(&path).unwrap();
        assert_eq!(file.hash.as_deref(), Some("abc"));
        assert_eq!(file.version("icons"), "0.2.1-beta");
        assert_eq!(file.version("react"), "0.1.4");
        assert_eq!(file.version("vue"), "0.0.0");
        assert!(!file.versions.contains_key("hash"));
    }

    #[test]
    fn test_read_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let err = VersionsFile::read(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CoreError::VersionsFile { .. }));
    }

    #[test]
    fn test_read_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.json");
        std::fs::write(&path, r#"{"react": 1}"#).unwrap();
        assert!(matches!(
            VersionsFile::read(&path),
            Err(CoreError::VersionsFile { .. })
        ));
    }

    #[test]
    fn test_merge_and_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".latest-versions.json");

        let mut file = VersionsFile::default();
        file.versions.insert("react".to_string(), "0.1.0".to_string());
        file.versions.insert("vue".to_string(), "0.5.0".to_string());

        let updates = BTreeMap::from([("react".to_string(), "0.2.0".to_string())]);
        file.merge(&updates);
        file.hash = Some("f00d".to_string());
        file.write(&path).unwrap();

        let back = VersionsFile::read(&path).unwrap();
        assert_eq!(back, file);
        assert_eq!(back.version("react"), "0.2.0");
        assert_eq!(back.version("vue"), "0.5.0");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\"hash\": \"f00d\""));
        assert!(!dir.path().join("..latest-versions.json.tmp").exists());
    }
}

//! Version management.

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::{BumpType, CoreError, CoreResult};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)").expect("invalid regex")
});

/// Manages version operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionManager;

impl VersionManager {
    /// Creates a new version manager.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Bumps a version according to the bump type.
    #[must_use]
    pub fn bump(&self, version: &Version, bump_type: BumpType) -> Version {
        let mut new_version = version.clone();

        match bump_type {
            BumpType::Major => {
                new_version.major += 1;
                new_version.minor = 0;
                new_version.patch = 0;
            }
            BumpType::Minor => {
                new_version.minor += 1;
                new_version.patch = 0;
            }
            BumpType::Patch => {
                new_version.patch += 1;
            }
        }
        new_version.pre = semver::Prerelease::EMPTY;
        new_version.build = semver::BuildMetadata::EMPTY;

        new_version
    }

    /// Finds the first `major.minor.patch` in `text` (e.g. `v1.2.3-release`)
    /// and bumps it.
    ///
    /// With `only_version`, returns the bare bumped version. Otherwise
    /// returns `text` with the version replaced and its surroundings kept.
    /// Without a bump the version is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidVersion`] if `text` holds no version.
    pub fn bump_text(
        &self,
        text: &str,
        bump_type: Option<BumpType>,
        only_version: bool,
    ) -> CoreResult<String> {
        let captures = VERSION_RE
            .captures(text)
            .ok_or_else(|| CoreError::InvalidVersion(text.to_string()))?;

        let part = |name: &str| -> CoreResult<u64> {
            captures[name]
                .parse()
                .map_err(|_| CoreError::InvalidVersion(text.to_string()))
        };
        let current = Version::new(part("major")?, part("minor")?, part("patch")?);

        let next = match bump_type {
            Some(bump_type) => self.bump(&current, bump_type),
            None => current,
        };

        if only_version {
            return Ok(next.to_string());
        }

        Ok(VERSION_RE.replace(text, next.to_string()).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_major() {
        let vm = VersionManager::new();
        let bumped = vm.bump(&Version::new(1, 2, 3), BumpType::Major);
        assert_eq!(bumped, Version::new(2, 0, 0));
    }

    #[test]
    fn test_bump_minor() {
        let vm = VersionManager::new();
        let bumped = vm.bump(&Version::new(1, 2, 3), BumpType::Minor);
        assert_eq!(bumped, Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_patch() {
        let vm = VersionManager::new();
        let bumped = vm.bump(&Version::new(1, 2, 3), BumpType::Patch);
        assert_eq!(bumped, Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_clears_prerelease() {
        let vm = VersionManager::new();
        let version = Version::parse("1.2.3-alpha.1").unwrap();
        let bumped = vm.bump(&version, BumpType::Patch);
        assert_eq!(bumped, Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_text_tag() {
        let vm = VersionManager::new();
        assert_eq!(
            vm.bump_text("v1.2.3", Some(BumpType::Minor), false).unwrap(),
            "v1.3.0"
        );
        assert_eq!(
            vm.bump_text("v1.2.3-release", Some(BumpType::Patch), false)
                .unwrap(),
            "v1.2.4-release"
        );
    }

    #[test]
    fn test_bump_text_only_version() {
        let vm = VersionManager::new();
        assert_eq!(
            vm.bump_text("1.2.3-beta", Some(BumpType::Patch), true).unwrap(),
            "1.2.4"
        );
        assert_eq!(
            vm.bump_text("v0.9.9", Some(BumpType::Major), true).unwrap(),
            "1.0.0"
        );
    }

    #[test]
    fn test_bump_text_without_bump() {
        let vm = VersionManager::new();
        assert_eq!(vm.bump_text("v1.2.3", None, false).unwrap(), "v1.2.3");
        assert_eq!(vm.bump_text("v1.2.3-beta", None, true).unwrap(), "1.2.3");
    }

    #[test]
    fn test_bump_text_no_version() {
        let vm = VersionManager::new();
        assert!(matches!(
            vm.bump_text("next", Some(BumpType::Patch), false),
            Err(CoreError::InvalidVersion(_))
        ));
    }
}

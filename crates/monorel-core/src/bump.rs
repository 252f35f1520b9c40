//! Bump types and the bump precedence rule.

use serde::{Deserialize, Serialize};

/// Version bump type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Patch version bump (bug fixes and everything else).
    Patch,
    /// Minor version bump (new features).
    Minor,
    /// Major version bump. Never produced from commits.
    Major,
}

impl std::fmt::Display for BumpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// Folds one commit type into a running bump.
///
/// A feature starts or raises the bump to minor; anything else starts it at
/// patch. An existing bump is never lowered and never raised past minor.
#[must_use]
pub fn next_bump(commit_type: &str, current: Option<BumpType>) -> BumpType {
    let is_feature = commit_type == "feat";

    match current {
        None if is_feature => BumpType::Minor,
        None => BumpType::Patch,
        Some(BumpType::Patch) if is_feature => BumpType::Minor,
        Some(current) => current,
    }
}

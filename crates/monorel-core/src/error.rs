//! Core error types.

use std::path::PathBuf;

use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Git error.
    #[error("git error: {0}")]
    Git(#[from] monorel_git::GitError),

    /// Package manager error.
    #[error("package manager error: {0}")]
    Npm(#[from] monorel_npm::NpmError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] monorel_config::ConfigError),

    /// No `major.minor.patch` found where a version was expected.
    #[error("no version found in {0:?}")]
    InvalidVersion(String),

    /// The versions file is missing or unreadable.
    #[error("cannot read versions file {path}: {reason}")]
    VersionsFile {
        /// Versions file path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A changelog could not be written.
    #[error("cannot write changelog {path}: {source}")]
    Changelog {
        /// Changelog path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_version_display() {
        let err = CoreError::InvalidVersion("vnext".to_string());
        assert_eq!(err.to_string(), "no version found in \"vnext\"");
    }

    #[test]
    fn test_versions_file_display() {
        let err = CoreError::VersionsFile {
            path: PathBuf::from(".latest-versions.json"),
            reason: "not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot read versions file .latest-versions.json: not found"
        );
    }

    #[test]
    fn test_from_git_error() {
        let err: CoreError = monorel_git::GitError::DetachedHead.into();
        assert!(matches!(err, CoreError::Git(_)));
    }
}

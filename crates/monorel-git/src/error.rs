//! Git error types.

use thiserror::Error;

/// Git-related errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(std::path::PathBuf),

    /// Tag not found.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Commit not found.
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// HEAD does not point to a branch.
    #[error("HEAD is detached, a branch is required")]
    DetachedHead,

    /// A `git` subprocess failed.
    #[error("command `{command}` failed: {reason}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Stderr or the exit status.
        reason: String,
    },

    /// Git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_not_a_repo_display() {
        let err = GitError::NotARepo(PathBuf::from("/tmp/not-git"));
        assert_eq!(err.to_string(), "not a git repository: /tmp/not-git");
    }

    #[test]
    fn test_tag_not_found_display() {
        let err = GitError::TagNotFound("v1.0.0".to_string());
        assert_eq!(err.to_string(), "tag not found: v1.0.0");
    }

    #[test]
    fn test_command_failed_display() {
        let err = GitError::CommandFailed {
            command: "git push --no-verify origin main".to_string(),
            reason: "rejected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command `git push --no-verify origin main` failed: rejected"
        );
    }
}

//! npm error types.

use std::path::PathBuf;

use thiserror::Error;

/// Package manager errors.
#[derive(Debug, Error)]
pub enum NpmError {
    /// The command could not be run or exited with a failure.
    #[error("command `{command}` failed: {reason}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Stderr, the exit status or the spawn error.
        reason: String,
    },

    /// The command succeeded but printed something unusable.
    #[error("unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput {
        /// The command line that was run.
        command: String,
        /// What it printed.
        output: String,
    },

    /// A `package.json` could not be understood.
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest {
        /// Manifest path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for package manager operations.
pub type NpmResult<T> = Result<T, NpmError>;

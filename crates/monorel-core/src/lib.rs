//! Core library for Monorel.
//!
//! This crate turns a commit range into per-package changelogs and version
//! bumps, and drives the release commit that records them.

mod bump;
mod changelog;
mod error;
mod generate;
mod plan;
mod release;
mod version;
mod versions_file;
mod workspace;

pub use bump::{BumpType, next_bump};
pub use changelog::{ChangelogRenderer, Heading, prepend_changelog};
pub use error::{CoreError, CoreResult};
pub use generate::{
    ChangelogGenerator, ChangelogOutcome, is_automation_commit, is_initial_tag, resolve_latest_tag,
};
pub use plan::{ChangelogIndex, ReleasePlan, Sentinels};
pub use release::{ReleaseDriver, ReleaseOutcome};
pub use version::VersionManager;
pub use versions_file::{DEFAULT_VERSION, VersionsFile};
pub use workspace::{Workspace, WorkspacePackage};

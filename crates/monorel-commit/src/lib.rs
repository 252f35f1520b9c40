//! Commit types and log classification for Monorel.
//!
//! This crate provides the commit side of a release run:
//! - [`RawCommitBlock`]: A log entry as emitted by the git log collaborator
//! - [`ParsedCommit`]: A classified commit with its affected packages
//! - [`parse_subject`]: The conventional-commit grammar as a pure function
//! - [`classify_log`]: Turns a whole log into parsed commits

mod classify;
mod conventional;
mod parsed;
mod raw;

pub use classify::{PackageLayout, classify_block, classify_log};
pub use conventional::{Subject, link_references, parse_subject};
pub use parsed::{ParsedCommit, ParsedCommitBuilder, Reference};
pub use raw::{FIELD_DELIMITER, HEADER_MARKER, LOG_FORMAT, RawCommitBlock};

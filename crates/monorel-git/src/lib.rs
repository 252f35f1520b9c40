//! Git abstraction layer for Monorel.
//!
//! This crate provides Git operations behind the [`Repository`] trait:
//! - Branch and tag lookup
//! - Commit logs in the `##short|||subject|||hash` block format
//! - File restore, commit and push for the release commit
//!
//! [`GitRepository`] is backed by git2 (and the `git` CLI for network
//! operations). [`MemoryRepository`] keeps everything in memory for tests.

mod error;
mod git;
mod memory;
mod repository;

pub use error::{GitError, GitResult};
pub use git::GitRepository;
pub use memory::MemoryRepository;
pub use repository::Repository;

//! npm integration for Monorel.
//!
//! The release driver talks to the package manager through
//! [`PackageManager`]: setting a package version and packing a tarball.
//! [`NpmCli`] shells out to `npm`; [`RecordingPackageManager`] edits
//! `package.json` directly and records every call, for tests.

mod cli;
mod error;
mod manager;
mod recording;

pub use cli::NpmCli;
pub use error::{NpmError, NpmResult};
pub use manager::{MANIFEST_FILE, PackageManager, remove_tarballs};
pub use recording::{PackageManagerCall, RecordingPackageManager};

//! Configuration management for Monorel.
//!
//! This crate handles loading and validating the optional `monorel.toml`
//! file. Every setting has a default, so a repository without the file gets
//! the stock layout.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_NAME, find_and_load_config_from, load_config, load_or_default};
pub use schema::{
    ChangelogConfig, Config, PackagesConfig, ReleaserConfig, RepositoryConfig, VersionsConfig,
};

//! `npm` command line implementation.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::{NpmError, NpmResult, PackageManager};

/// Runs the `npm` executable.
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: String,
}

impl NpmCli {
    /// Creates a runner for `npm` on the `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "npm".to_string(),
        }
    }

    /// Uses another executable (e.g. an absolute path to `npm`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the executable that will be run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, dir: &Path, args: &[&str]) -> NpmResult<String> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, ?dir, "running package manager");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| NpmError::CommandFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(NpmError::CommandFailed {
                command,
                reason: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for NpmCli {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for NpmCli {
    fn set_version(&self, dir: &Path, version: &str) -> NpmResult<String> {
        let stdout = self.run(
            dir,
            &[
                "version",
                version,
                "--no-git-tag-version",
                "--allow-same-version",
            ],
        )?;

        let recorded = parse_version_output(&stdout).unwrap_or(version).to_string();
        info!(?dir, version = %recorded, "set package version");
        Ok(recorded)
    }

    fn pack(&self, dir: &Path) -> NpmResult<PathBuf> {
        let stdout = self.run(dir, &["pack"])?;

        let tarball = parse_pack_output(&stdout).ok_or_else(|| NpmError::UnexpectedOutput {
            command: format!("{} pack", self.program),
            output: stdout.clone(),
        })?;

        let path = dir.join(tarball);
        debug!(?path, "packed");
        Ok(path)
    }
}

/// `npm version` prints the new version with a `v` prefix as its last line.
fn parse_version_output(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(|line| line.strip_prefix('v').unwrap_or(line))
}

/// `npm pack` prints the tarball file name as its last line.
fn parse_pack_output(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .filter(|line| line.ends_with(".tgz"))
}

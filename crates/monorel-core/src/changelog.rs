//! Markdown changelog rendering and writing.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use monorel_commit::{ParsedCommit, link_references};
use monorel_config::Config;
use tracing::debug;

use crate::{CoreError, CoreResult};

/// The first line of a changelog section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Version shown in the heading.
    pub version: String,

    /// `<previous>...<new>` tag range; `None` for the initial release.
    pub compare: Option<String>,

    /// Release date.
    pub date: NaiveDate,
}

/// Renders changelog sections for one repository layout.
#[derive(Debug, Clone, Copy)]
pub struct ChangelogRenderer<'a> {
    config: &'a Config,
}

impl<'a> ChangelogRenderer<'a> {
    /// Creates a renderer.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Returns the changelog path of a package, relative to the repository
    /// root.
    #[must_use]
    pub fn changelog_path(&self, package: &str) -> PathBuf {
        let packages = &self.config.packages;
        let file = &self.config.changelog.file;

        if package == packages.root_name {
            PathBuf::from(file)
        } else if package == packages.icons_scope {
            Path::new(&packages.icons_dir).join(file)
        } else {
            Path::new(&packages.dir).join(package).join(file)
        }
    }

    /// Renders one section. Commits with an ignored scope are left out and
    /// sections left empty are omitted. The result is trimmed.
    #[must_use]
    pub fn render(
        &self,
        package: &str,
        heading: &Heading,
        commits_by_type: &BTreeMap<String, Vec<ParsedCommit>>,
        type_order: &[String],
    ) -> String {
        let mut out = self.heading(heading);
        out.push('\n');

        for commit_type in type_order {
            let Some(commits) = commits_by_type.get(commit_type) else {
                continue;
            };

            let wanted: Vec<&ParsedCommit> = commits
                .iter()
                .filter(|c| !self.config.changelog.is_ignored_scope(c.scope.as_deref()))
                .collect();
            if wanted.is_empty() {
                continue;
            }

            let label = self.config.changelog.label_for(commit_type);
            _ = write!(out, "\n### {label}\n\n");
            for commit in wanted {
                _ = writeln!(out, "{}", self.entry(package, commit));
            }
        }

        out.trim().to_string()
    }

    fn heading(&self, heading: &Heading) -> String {
        let title = match &heading.compare {
            Some(range) => format!(
                "[{}]({}/compare/{range})",
                heading.version, self.config.repository.url
            ),
            None => heading.version.clone(),
        };

        format!("## {title} ({})", heading.date.format("%Y-%m-%d"))
    }

    fn entry(&self, package: &str, commit: &ParsedCommit) -> String {
        let repo_url = &self.config.repository.url;

        let scope = commit
            .scope
            .as_ref()
            .map(|s| format!("**{s}** "))
            .unwrap_or_default();
        let subject = link_references(&commit.subject, repo_url);
        let affects = self.affects(package, commit);

        format!(
            "- {scope}{subject}{affects} ([{}]({repo_url}/commit/{}))",
            commit.short, commit.hash
        )
    }

    /// Cross links for root entries touching at least two real packages.
    fn affects(&self, package: &str, commit: &ParsedCommit) -> String {
        let root = &self.config.packages.root_name;
        if package != root {
            return String::new();
        }

        let others: Vec<&String> = commit.affects.iter().filter(|p| *p != root).collect();
        if others.len() < 2 {
            return String::new();
        }

        let links: Vec<String> = others
            .iter()
            .map(|p| {
                format!(
                    "[{p}](./{}/{p}/{})",
                    self.config.packages.dir, self.config.changelog.file
                )
            })
            .collect();

        format!(" [{}]", links.join(", "))
    }
}

/// Prepends `section` to the changelog at `path`, creating it if needed.
///
/// The file ends up as the trimmed section, a blank line, the trimmed
/// previous content and a trailing newline.
///
/// # Errors
///
/// Returns [`CoreError::Changelog`] if the file cannot be read or written.
pub fn prepend_changelog(path: &Path, section: &str) -> CoreResult<()> {
    let previous = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(CoreError::Changelog {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut content = section.trim().to_string();
    let previous = previous.trim();
    if !previous.is_empty() {
        content.push_str("\n\n");
        content.push_str(previous);
    }
    content.push('\n');

    std::fs::write(path, content).map_err(|source| CoreError::Changelog {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(?path, "prepended changelog section");
    Ok(())
}

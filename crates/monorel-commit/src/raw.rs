//! Raw log blocks as produced by the git log collaborator.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix that marks a header line in the log.
pub const HEADER_MARKER: &str = "##";

/// Separator between the header fields.
pub const FIELD_DELIMITER: &str = "|||";

/// `git log --pretty=format:` string producing header lines.
pub const LOG_FORMAT: &str = "##%h|||%s|||%H";

/// One log entry: a header followed by the files it changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawCommitBlock {
    /// The abbreviated hash.
    pub short: String,

    /// The commit subject line.
    pub subject: String,

    /// The full hash.
    pub hash: String,

    /// Changed file paths, relative to the repository root.
    pub files: Vec<String>,
}

impl RawCommitBlock {
    /// Creates a block with no changed files.
    #[must_use]
    pub fn new(
        short: impl Into<String>,
        subject: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            short: short.into(),
            subject: subject.into(),
            hash: hash.into(),
            files: Vec::new(),
        }
    }

    /// Adds a changed file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Returns true if the line is a header line.
    #[must_use]
    pub fn is_header(line: &str) -> bool {
        line.starts_with(HEADER_MARKER)
    }

    /// Parses a header line.
    ///
    /// The short hash is everything before the first delimiter and the full
    /// hash everything after the last one, so a subject containing the
    /// delimiter survives intact. Returns `None` for non-header lines.
    #[must_use]
    pub fn from_header(line: &str) -> Option<Self> {
        let fields = line.strip_prefix(HEADER_MARKER)?;

        let Some((short, rest)) = fields.split_once(FIELD_DELIMITER) else {
            return Some(Self::new(fields.trim(), "", ""));
        };

        let (subject, hash) = rest.rsplit_once(FIELD_DELIMITER).unwrap_or((rest, ""));

        Some(Self::new(short.trim(), subject.trim(), hash.trim()))
    }

    /// Renders the header line.
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "{HEADER_MARKER}{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            self.short, self.subject, self.hash
        )
    }

    /// Renders the block in log format (header, then one path per line).
    #[must_use]
    pub fn to_log(&self) -> String {
        let mut out = self.header();
        for file in &self.files {
            out.push('\n');
            out.push_str(file);
        }
        out
    }

    /// Renders blocks as one log, in the given order.
    #[must_use]
    pub fn render_all(blocks: &[Self]) -> String {
        blocks
            .iter()
            .map(Self::to_log)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Splits a whole log into blocks.
    ///
    /// Blank lines are skipped. File lines before the first header have no
    /// commit to belong to and are dropped.
    #[must_use]
    pub fn parse_all(log: &str) -> Vec<Self> {
        let mut blocks: Vec<Self> = Vec::new();

        for line in log.lines().map(str::trim_end) {
            if line.is_empty() {
                continue;
            }

            if let Some(block) = Self::from_header(line) {
                blocks.push(block);
            } else if let Some(current) = blocks.last_mut() {
                current.files.push(line.to_string());
            } else {
                debug!(line, "ignoring file line before first commit header");
            }
        }

        blocks
    }
}

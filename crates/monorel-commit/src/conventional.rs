//! Conventional Commits subject grammar.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::Reference;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^)]*)\))?!?: (?P<description>.+)$")
        .expect("invalid regex")
});

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<raw>(?:[\w.-]+/[\w.-]+)?#(?P<issue>\d+))").expect("invalid regex")
});

/// A commit subject split into its conventional-commit parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subject {
    /// The commit type, if the subject follows the grammar.
    pub r#type: Option<String>,

    /// The optional scope.
    pub scope: Option<String>,

    /// The description; the whole subject when the grammar does not match.
    pub description: String,

    /// Issue and pull request mentions, in order of appearance.
    pub references: Vec<Reference>,
}

/// Parses a commit subject.
///
/// Never fails: a subject outside the grammar yields no type and no scope.
#[must_use]
pub fn parse_subject(subject: &str) -> Subject {
    let subject = subject.trim();
    let references = extract_references(subject);

    let Some(captures) = HEADER_RE.captures(subject) else {
        return Subject {
            r#type: None,
            scope: None,
            description: subject.to_string(),
            references,
        };
    };

    let r#type = captures.name("type").map(|m| m.as_str().to_string());
    let scope = captures
        .name("scope")
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(String::from);
    let description = captures
        .name("description")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Subject {
        r#type,
        scope,
        description,
        references,
    }
}

fn extract_references(text: &str) -> Vec<Reference> {
    REFERENCE_RE
        .captures_iter(text)
        .map(|caps| Reference::new(&caps["issue"], &caps["raw"]))
        .collect()
}

/// Replaces every issue mention in `text` with a Markdown link to
/// `{repo_url}/issues/{issue}`.
///
/// Works in a single pass so a mention repeated in the text is linked once
/// per occurrence.
#[must_use]
pub fn link_references(text: &str, repo_url: &str) -> String {
    REFERENCE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            format!("[{}]({repo_url}/issues/{})", &caps["raw"], &caps["issue"])
        })
        .into_owned()
}

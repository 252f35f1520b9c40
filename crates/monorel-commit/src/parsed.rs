//! Parsed commit type after classification.

use serde::{Deserialize, Serialize};

/// Type bucket used for commits without a conventional type.
const OTHER_TYPE: &str = "other";

/// An issue or pull request mention found in a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The issue number.
    pub issue: String,

    /// The mention as written (e.g. `#12` or `owner/repo#12`).
    pub raw: String,
}

impl Reference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(issue: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            raw: raw.into(),
        }
    }
}

/// A commit after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// The commit type (feat, fix, docs, ...), `None` outside the grammar.
    pub r#type: Option<String>,

    /// The optional scope.
    pub scope: Option<String>,

    /// The description text.
    pub subject: String,

    /// Issue mentions in the subject.
    pub references: Vec<Reference>,

    /// The abbreviated hash.
    pub short: String,

    /// The full hash.
    pub hash: String,

    /// Packages touched by this commit, in first-seen order, no duplicates.
    pub affects: Vec<String>,
}

impl ParsedCommit {
    /// Creates a new parsed commit builder.
    #[must_use]
    pub fn builder(short: impl Into<String>, hash: impl Into<String>) -> ParsedCommitBuilder {
        ParsedCommitBuilder::new(short, hash)
    }

    /// Returns the type used for grouping: the commit type, or `other`.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.r#type.as_deref().unwrap_or(OTHER_TYPE)
    }

    /// Returns true if this commit represents a feature.
    #[must_use]
    pub fn is_feature(&self) -> bool {
        self.r#type.as_deref() == Some("feat")
    }

    /// Returns true if the commit scope equals `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.as_deref() == Some(scope)
    }

    /// Records an affected package. Returns false if it was already known.
    pub fn add_affected(&mut self, package: impl Into<String>) -> bool {
        let package = package.into();
        if self.affects.contains(&package) {
            return false;
        }
        self.affects.push(package);
        true
    }
}

/// Builder for [`ParsedCommit`].
#[derive(Debug)]
pub struct ParsedCommitBuilder {
    commit: ParsedCommit,
}

impl ParsedCommitBuilder {
    fn new(short: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            commit: ParsedCommit {
                r#type: None,
                scope: None,
                subject: String::new(),
                references: Vec::new(),
                short: short.into(),
                hash: hash.into(),
                affects: Vec::new(),
            },
        }
    }

    /// Sets the commit type.
    #[must_use]
    pub fn commit_type(mut self, r#type: impl Into<String>) -> Self {
        self.commit.r#type = Some(r#type.into());
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.commit.scope = Some(scope.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.commit.subject = subject.into();
        self
    }

    /// Adds a reference.
    #[must_use]
    pub fn reference(mut self, reference: Reference) -> Self {
        self.commit.references.push(reference);
        self
    }

    /// Adds an affected package.
    #[must_use]
    pub fn affects(mut self, package: impl Into<String>) -> Self {
        self.commit.add_affected(package);
        self
    }

    /// Builds the [`ParsedCommit`].
    #[must_use]
    pub fn build(self) -> ParsedCommit {
        self.commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let commit = ParsedCommit::builder("abc", "abcdef")
            .commit_type("feat")
            .scope("icons")
            .subject("add moon icon (#4)")
            .reference(Reference::new("4", "#4"))
            .affects("icons")
            .build();

        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.scope.as_deref(), Some("icons"));
        assert_eq!(commit.subject, "add moon icon (#4)");
        assert_eq!(commit.references.len(), 1);
        assert_eq!(commit.short, "abc");
        assert_eq!(commit.hash, "abcdef");
        assert_eq!(commit.affects, vec!["icons".to_string()]);
    }

    #[test]
    fn test_kind() {
        let typed = ParsedCommit::builder("a", "af").commit_type("docs").build();
        assert_eq!(typed.kind(), "docs");

        let untyped = ParsedCommit::builder("a", "af").build();
        assert_eq!(untyped.kind(), "other");
    }

    #[test]
    fn test_is_feature() {
        assert!(ParsedCommit::builder("a", "af").commit_type("feat").build().is_feature());
        assert!(!ParsedCommit::builder("a", "af").commit_type("fix").build().is_feature());
        assert!(!ParsedCommit::builder("a", "af").build().is_feature());
    }

    #[test]
    fn test_has_scope() {
        let commit = ParsedCommit::builder("a", "af").scope("icons").build();
        assert!(commit.has_scope("icons"));
        assert!(!commit.has_scope("react"));
        assert!(!ParsedCommit::builder("a", "af").build().has_scope("icons"));
    }

    #[test]
    fn test_add_affected_dedups() {
        let mut commit = ParsedCommit::builder("a", "af").build();
        assert!(commit.add_affected("react"));
        assert!(commit.add_affected("icons"));
        assert!(!commit.add_affected("react"));
        assert_eq!(commit.affects, vec!["react".to_string(), "icons".to_string()]);
    }

    #[test]
    fn test_serialize_deserialize() {
        let commit = ParsedCommit::builder("a", "af")
            .commit_type("fix")
            .subject("x")
            .affects("react")
            .build();
        let json = serde_json::to_string(&commit).unwrap();
        let back: ParsedCommit = serde_json::from_str(&json).unwrap();
        assert_eq!(commit, back);
    }
}

//! Issue context
//!
//! Collects path-scoped issues while a schema is walked against a record.
//! Child contexts extend the path but report into the same accumulator, so
//! every issue recorded anywhere in the walk is visible from the root.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// A structural problem found at a location in the source record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Property-access chain from the root of the source record
    pub path: Vec<String>,

    /// Human-readable cause
    pub details: String,
}

impl Issue {
    /// Create a new issue
    pub fn new(path: Vec<String>, details: impl Into<String>) -> Self {
        Self {
            path,
            details: details.into(),
        }
    }

    /// Dotted rendering of the path, `<root>` when empty
    #[must_use]
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.details)
    }
}

/// Insertion-ordered set of issues, deduplicated by value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// Create an empty issue set
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert an issue, returning `false` if an equal one was already present
    pub fn insert(&mut self, issue: Issue) -> bool {
        if self.0.contains(&issue) {
            return false;
        }
        self.0.push(issue);
        true
    }

    /// Number of distinct issues
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no issues were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over issues in the order they were recorded
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    /// Borrow the issues as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    /// Consume the set into a plain list
    #[must_use]
    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }
}

impl FromIterator<Issue> for Issues {
    fn from_iter<I: IntoIterator<Item = Issue>>(iter: I) -> Self {
        let mut issues = Self::new();
        for issue in iter {
            issues.insert(issue);
        }
        issues
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Current location in the source record plus the shared issue accumulator
///
/// The accumulator is owned by the caller of the walk and borrowed by every
/// context derived from it with [`IssueContext::at`].
#[derive(Debug, Clone)]
pub struct IssueContext<'a> {
    issues: &'a RefCell<Issues>,
    path: Vec<String>,
}

impl<'a> IssueContext<'a> {
    /// Create a root context reporting into `issues`
    #[must_use]
    pub fn new(issues: &'a RefCell<Issues>) -> Self {
        Self {
            issues,
            path: Vec::new(),
        }
    }

    /// Check if this context points at the root of the record
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Snapshot of the issues recorded so far
    #[must_use]
    pub fn issues(&self) -> Issues {
        self.issues.borrow().clone()
    }

    /// Number of distinct issues recorded so far
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.borrow().len()
    }

    /// Copy of the current path
    #[must_use]
    pub fn path(&self) -> Vec<String> {
        self.path.clone()
    }

    /// Borrow the current path
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.path
    }

    /// Derive a child context one segment deeper, sharing the accumulator
    #[must_use]
    pub fn at(&self, segment: impl Into<String>) -> IssueContext<'a> {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend(self.path.iter().cloned());
        path.push(segment.into());

        IssueContext {
            issues: self.issues,
            path,
        }
    }

    /// Record an issue at the current path
    pub fn add(&self, details: impl Into<String>) {
        let issue = Issue::new(self.path.clone(), details);
        if !self.issues.borrow_mut().insert(issue) {
            tracing::trace!(path = %self.path.join("."), "Duplicate issue ignored");
        }
    }
}

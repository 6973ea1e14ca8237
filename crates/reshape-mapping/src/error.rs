//! Mapping failure value

use crate::context::{Issue, IssueContext, Issues};
use std::fmt;

/// Failure produced when a walk recorded one or more issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError {
    issues: Issues,
}

impl MapError {
    /// Create a failure from an explicit list of issues
    pub fn new(issues: impl IntoIterator<Item = Issue>) -> Self {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Create a failure from the issues accumulated in a context
    #[must_use]
    pub fn from_context(context: &IssueContext<'_>) -> Self {
        Self {
            issues: context.issues(),
        }
    }

    /// Issues in the order they were recorded
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        self.issues.as_slice()
    }

    /// Consume the failure into its issue set
    #[must_use]
    pub fn into_issues(self) -> Issues {
        self.issues
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mapping failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_from_explicit_list_dedups() {
        let issue = Issue::new(vec!["a".into()], "bad");
        let err = MapError::new(vec![issue.clone(), issue.clone()]);

        assert_eq!(err.issues(), &[issue]);
    }

    #[test]
    fn test_from_context() {
        let issues = RefCell::new(Issues::new());
        let context = IssueContext::new(&issues);
        context.at("x").add("expected object, received number");

        let err = MapError::from_context(&context);
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].path, vec!["x"]);
    }

    #[test]
    fn test_display_lists_every_issue() {
        let err = MapError::new(vec![
            Issue::new(vec!["a".into()], "first"),
            Issue::new(vec!["b".into()], "second"),
        ]);

        let rendered = err.to_string();
        assert!(rendered.starts_with("Mapping failed with 2 issue(s)"));
        assert!(rendered.contains("a: first"));
        assert!(rendered.contains("b: second"));
    }
}

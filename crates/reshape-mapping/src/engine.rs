//! Mapping engine
//!
//! Walks a source record against an [`ObjectNode`]'s shape, building the
//! output record and recording structural issues in an [`IssueContext`].
//!
//! Keys without a declared node are copied through unchanged. A value that
//! should be a record but is not produces an issue for that subtree only;
//! sibling keys keep being processed so one call reports every mismatch.

use crate::context::{IssueContext, Issues};
use crate::error::MapError;
use crate::node::{EnumNode, Node, ObjectNode, RenameNode, RenamedNode};
use crate::{Error, Record};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use tracing::{debug, trace, warn};

/// Runtime type name used in "expected object" issues
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ObjectNode {
    /// Map `source` through this schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Issues`] when any structural issue was recorded.
    pub fn map(&self, source: &Value) -> crate::Result<Record> {
        let (record, issues) = self.run(source);
        if issues.is_empty() {
            Ok(record)
        } else {
            Err(Error::Issues(MapError::new(issues)))
        }
    }

    /// Map `source` through this schema, returning collected issues as a
    /// failure value.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] holding every issue recorded during the walk.
    pub fn safe_map(&self, source: &Value) -> Result<Record, MapError> {
        let (record, issues) = self.run(source);

        if issues.is_empty() {
            Ok(record)
        } else {
            Err(MapError::new(issues))
        }
    }

    /// Serialize `source`, map it, and deserialize the result into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails, the walk records issues, or
    /// the output record does not fit `T`.
    pub fn map_into<S, T>(&self, source: &S) -> crate::Result<T>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(source)?;
        let record = self.map(&value)?;
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    fn run(&self, source: &Value) -> (Record, Issues) {
        debug!(fields = self.len(), "Mapping record");

        let issues = RefCell::new(Issues::new());
        let context = IssueContext::new(&issues);
        let record = self.walk(source, &context);

        let issues = issues.into_inner();
        if !issues.is_empty() {
            warn!(count = issues.len(), "Mapping recorded issues");
        }
        (record, issues)
    }

    /// Walk `source` against this shape, recording issues in `context`.
    #[must_use]
    pub fn walk(&self, source: &Value, context: &IssueContext<'_>) -> Record {
        let mut output = Record::new();

        let Value::Object(fields) = source else {
            context.add(format!("expected object, received {}", type_name(source)));
            return output;
        };

        for (key, value) in fields {
            let Some(node) = self.get(key) else {
                trace!(key = %key, "Passing through undeclared key");
                output.insert(key.clone(), value.clone());
                continue;
            };

            trace!(key = %key, kind = %node.kind(), "Resolving declared key");
            match node {
                Node::Object(object) => {
                    let nested = object.walk(value, &context.at(key.as_str()));
                    output.insert(key.clone(), Value::Object(nested));
                }
                Node::Rename(rename) => {
                    let resolved = resolve_rename(rename, key, value, context);
                    output.insert(rename.target().to_string(), resolved);
                }
                Node::Enum(remap) => {
                    let translated = translate(remap, value, &context.at(key.as_str()));
                    output.insert(key.clone(), translated);
                }
                Node::Transform(transform) => {
                    output.insert(key.clone(), transform.apply(value));
                }
            }
        }

        output
    }
}

/// Output value of a renamed key, before it is written under the target key
fn resolve_rename(
    rename: &RenameNode,
    key: &str,
    value: &Value,
    context: &IssueContext<'_>,
) -> Value {
    match rename.inner() {
        None => value.clone(),
        Some(RenamedNode::Object(object)) => Value::Object(object.walk(value, &context.at(key))),
        Some(RenamedNode::Enum(remap)) => translate(remap, value, &context.at(key)),
        Some(RenamedNode::Transform(transform)) => transform.apply(value),
    }
}

/// Enum lookup; a miss is recorded as an issue and the value kept as is
fn translate(remap: &EnumNode, value: &Value, context: &IssueContext<'_>) -> Value {
    match remap.translate(value) {
        Some(output) => Value::String(output.to_string()),
        None => {
            context.add(format!(
                "expected one of {}, received {}",
                remap.describe_from(),
                value
            ));
            value.clone()
        }
    }
}

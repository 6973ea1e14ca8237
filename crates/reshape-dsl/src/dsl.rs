//! Schema definition language
//!
//! A declarative YAML format for reshape schemas. JSON documents are accepted
//! as well since they are valid YAML.
//!
//! ```yaml
//! name: order_payload
//! shape:
//!   order_id: { to: orderId }
//!   status:
//!     enum: { from: [0, 1, 2], to: [Pending, Shipped, Delivered] }
//!     to: statusLabel
//!   customer:
//!     object:
//!       first_name: { to: firstName }
//!     to: buyer
//!   created_at: { transform: timestamp, to: createdAt }
//! ```

use crate::registry::TransformRegistry;
use crate::{Error, Result};
use reshape_mapping::{Node, ObjectNode, TransformNode, enumeration};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// A complete schema definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Schema name
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Root record shape
    #[serde(default)]
    pub shape: Shape,
}

/// Field definitions of a record shape, kept in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape(Vec<(String, FieldDefinition)>);

impl Shape {
    /// Definition declared for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, definition)| definition)
    }

    /// Keys and definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.0
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    /// Number of declared keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no keys are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, definition) in &self.0 {
            map.serialize_entry(name, definition)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ShapeVisitor)
    }
}

struct ShapeVisitor;

impl<'de> Visitor<'de> for ShapeVisitor {
    type Value = Shape;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to field definitions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Shape, A::Error> {
        let mut fields: Vec<(String, FieldDefinition)> =
            Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, definition)) = map.next_entry::<String, FieldDefinition>()? {
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!("duplicate field '{name}'")));
            }
            fields.push((name, definition));
        }
        Ok(Shape(fields))
    }
}

/// How a single source key is reshaped
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    /// Output key, when the value moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Nested record shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Shape>,

    /// Value translation table
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<EnumDefinition>,

    /// Name of a registered transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// Positional value translation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnumDefinition {
    pub from: Vec<Value>,
    pub to: Vec<String>,
}

impl SchemaDefinition {
    /// Compile the definition into a root object node
    ///
    /// # Errors
    ///
    /// Returns an error when a field definition is contradictory or empty, an
    /// enum table is invalid, or a transform name is not registered.
    pub fn compile(&self, registry: &TransformRegistry) -> Result<ObjectNode> {
        debug!(schema = %self.name, fields = self.shape.len(), "Compiling schema");
        compile_shape(&self.shape, &[], registry)
    }

    /// Total number of field definitions, nested ones included
    #[must_use]
    pub fn field_count(&self) -> usize {
        count_fields(&self.shape)
    }
}

impl FieldDefinition {
    fn compile(&self, path: &[&str], registry: &TransformRegistry) -> Result<Node> {
        let field = path.join(".");
        let declared = [
            self.object.is_some(),
            self.enumeration.is_some(),
            self.transform.is_some(),
        ]
        .into_iter()
        .filter(|declared| *declared)
        .count();

        if declared > 1 {
            return Err(Error::definition(
                field,
                "only one of 'object', 'enum' or 'transform' may be given",
            ));
        }

        let inner: Option<Node> = if let Some(shape) = &self.object {
            Some(compile_shape(shape, path, registry)?.into())
        } else if let Some(table) = &self.enumeration {
            let remap = enumeration(table.from.iter().cloned(), table.to.iter().cloned())
                .map_err(|source| Error::Schema {
                    field: field.clone(),
                    source,
                })?;
            Some(remap.into())
        } else if let Some(name) = &self.transform {
            let func = registry.get(name).ok_or_else(|| Error::UnknownTransform {
                name: name.clone(),
                field: field.clone(),
                available: registry.names(),
            })?;
            Some(TransformNode::from_shared(func).with_name(name.as_str()).into())
        } else {
            None
        };

        match (inner, &self.to) {
            (Some(node), Some(target)) => Ok(node.to(target.as_str())),
            (Some(node), None) => Ok(node),
            (None, Some(target)) => Ok(reshape_mapping::to(target.as_str())),
            (None, None) => Err(Error::definition(
                field,
                "expected at least one of 'to', 'object', 'enum' or 'transform'",
            )),
        }
    }
}

fn compile_shape(
    shape: &Shape,
    path: &[&str],
    registry: &TransformRegistry,
) -> Result<ObjectNode> {
    let mut object = ObjectNode::new();
    for (key, definition) in shape.iter() {
        let mut field_path = path.to_vec();
        field_path.push(key);
        object = object.field(key, definition.compile(&field_path, registry)?);
    }
    Ok(object)
}

fn count_fields(shape: &Shape) -> usize {
    shape
        .iter()
        .map(|(_, field)| 1 + field.object.as_ref().map_or(0, count_fields))
        .sum()
}

/// DSL Parser
pub struct SchemaDsl;

/// Failure to read, parse or serialize a schema document
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}{}", location_suffix(.line, .column))]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

#[allow(clippy::ref_option)]
fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        _ => String::new(),
    }
}

impl ParseError {
    fn yaml(context: &str, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self {
            message: format!("{context}: {err}"),
            line: location.as_ref().map(serde_yaml::Location::line),
            column: location.as_ref().map(serde_yaml::Location::column),
        }
    }

    fn read(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self {
            message: format!("Failed to read file {}: {err}", path.display()),
            line: None,
            column: None,
        }
    }
}

impl SchemaDsl {
    /// Parse a schema definition from YAML or JSON
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a valid schema definition.
    pub fn parse(yaml: &str) -> std::result::Result<SchemaDefinition, ParseError> {
        serde_yaml::from_str(yaml).map_err(|e| ParseError::yaml("Failed to parse schema", &e))
    }

    /// Parse a schema definition from a file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn parse_file(
        path: &std::path::Path,
    ) -> std::result::Result<SchemaDefinition, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::read(path, &e))?;
        debug!(path = %path.display(), "Read schema file");
        Self::parse(&content)
    }

    /// Serialize a schema definition to YAML
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_yaml(definition: &SchemaDefinition) -> std::result::Result<String, ParseError> {
        serde_yaml::to_string(definition)
            .map_err(|e| ParseError::yaml("Failed to serialize schema", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDER_SCHEMA: &str = r"
name: order_payload
shape:
  order_id:
    to: orderId
  status:
    enum:
      from: [0, 1, 2]
      to: [Pending, Shipped, Delivered]
    to: statusLabel
  customer:
    object:
      first_name:
        to: firstName
    to: buyer
  created_at:
    transform: timestamp
    to: createdAt
";

    #[test]
    fn test_parse_schema() {
        let definition = SchemaDsl::parse(ORDER_SCHEMA).unwrap();

        assert_eq!(definition.name, "order_payload");
        assert_eq!(definition.shape.len(), 4);
        assert_eq!(definition.field_count(), 5);

        let status = definition.shape.get("status").unwrap();
        assert_eq!(status.to.as_deref(), Some("statusLabel"));
        let table = status.enumeration.as_ref().unwrap();
        assert_eq!(table.from, vec![json!(0), json!(1), json!(2)]);
        assert_eq!(table.to, vec!["Pending", "Shipped", "Delivered"]);
    }

    #[test]
    fn test_compile_and_map() {
        let definition = SchemaDsl::parse(ORDER_SCHEMA).unwrap();
        let schema = definition
            .compile(&TransformRegistry::with_builtins())
            .unwrap();

        let record = schema
            .map(&json!({
                "order_id": 12,
                "status": 1,
                "customer": {"first_name": "Ada", "vip": true},
                "created_at": 0,
                "channel": "web"
            }))
            .unwrap();

        assert_eq!(
            Value::Object(record),
            json!({
                "orderId": 12,
                "statusLabel": "Shipped",
                "buyer": {"firstName": "Ada", "vip": true},
                "createdAt": "1970-01-01T00:00:00.000Z",
                "channel": "web"
            })
        );
    }

    #[test]
    fn test_parse_json_document() {
        let definition =
            SchemaDsl::parse(r#"{"name": "json_schema", "shape": {"a": {"to": "b"}}}"#).unwrap();

        assert_eq!(definition.name, "json_schema");
        assert_eq!(definition.shape.get("a").unwrap().to.as_deref(), Some("b"));
    }

    #[test]
    fn test_shape_keeps_declaration_order() {
        let definition = SchemaDsl::parse(ORDER_SCHEMA).unwrap();
        let schema = definition
            .compile(&TransformRegistry::with_builtins())
            .unwrap();

        let declared: Vec<&str> = definition.shape.iter().map(|(key, _)| key).collect();
        let compiled: Vec<&str> = schema.fields().map(|(key, _)| key).collect();
        let expected = vec!["order_id", "status", "customer", "created_at"];
        assert_eq!(declared, expected);
        assert_eq!(compiled, expected);
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let result = SchemaDsl::parse("name: x\nshape:\n  a: { to: b }\n  a: { to: c }\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_display_includes_location() {
        let err = ParseError {
            message: "Failed to parse schema: bad".to_string(),
            line: Some(3),
            column: Some(7),
        };
        let without_location = ParseError {
            line: None,
            column: None,
            ..err.clone()
        };

        assert_eq!(
            err.to_string(),
            "Failed to parse schema: bad at line 3, column 7"
        );
        assert_eq!(without_location.to_string(), "Failed to parse schema: bad");
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = SchemaDsl::parse("name: x\nshape:\n  a:\n    rename: b\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_has_location() {
        let err = SchemaDsl::parse("name: broken\nshape: [\n").unwrap_err();

        assert!(err.message.contains("Failed to parse schema"));
        assert!(err.line.is_some());
    }

    #[test]
    fn test_compile_rejects_conflicting_field() {
        let definition = SchemaDsl::parse(
            "name: x\nshape:\n  a:\n    transform: trim\n    object:\n      b: { to: c }\n",
        )
        .unwrap();

        let err = definition
            .compile(&TransformRegistry::with_builtins())
            .unwrap_err();
        assert!(matches!(err, Error::Definition { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_compile_rejects_empty_field() {
        let definition = SchemaDsl::parse("name: x\nshape:\n  outer:\n    object:\n      inner: {}\n")
            .unwrap();

        let err = definition.compile(&TransformRegistry::new()).unwrap_err();
        assert!(matches!(err, Error::Definition { ref field, .. } if field == "outer.inner"));
    }

    #[test]
    fn test_compile_rejects_unknown_transform() {
        let definition = SchemaDsl::parse("name: x\nshape:\n  a: { transform: shout }\n").unwrap();

        let err = definition
            .compile(&TransformRegistry::with_builtins())
            .unwrap_err();
        match err {
            Error::UnknownTransform {
                name,
                field,
                available,
            } => {
                assert_eq!(name, "shout");
                assert_eq!(field, "a");
                assert!(available.contains(&"uppercase".to_string()));
            }
            other => panic!("Expected unknown transform error, got {other}"),
        }
    }

    #[test]
    fn test_compile_rejects_mismatched_enum() {
        let definition = SchemaDsl::parse(
            "name: x\nshape:\n  a:\n    enum: { from: [1, 2], to: [one] }\n",
        )
        .unwrap();

        let err = definition.compile(&TransformRegistry::new()).unwrap_err();
        assert!(matches!(err, Error::Schema { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_to_yaml_round_trips_definition() {
        let definition = SchemaDsl::parse(ORDER_SCHEMA).unwrap();

        let yaml = SchemaDsl::to_yaml(&definition).unwrap();
        assert!(!yaml.contains("null"));
        assert_eq!(SchemaDsl::parse(&yaml).unwrap(), definition);
    }
}

//! Schema nodes
//!
//! A schema is a tree of [`Node`]s rooted at an [`ObjectNode`]. Nodes are
//! built with the functions in this module and are immutable afterwards, so a
//! single tree can be shared and reused across any number of mapping calls.

use crate::SchemaError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Pure function applied to a source value by a transform node
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A schema element describing how one source value contributes to the output
#[derive(Debug, Clone)]
pub enum Node {
    /// Recurse into a nested record
    Object(ObjectNode),

    /// Move the value to another key, optionally reshaping it first
    Rename(RenameNode),

    /// Translate a primitive value through a fixed lookup table
    Enum(EnumNode),

    /// Replace the value with the result of a function
    Transform(TransformNode),
}

/// Discriminant of a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Rename,
    Enum,
    Transform,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Object => "object",
            NodeKind::Rename => "rename",
            NodeKind::Enum => "enum",
            NodeKind::Transform => "transform",
        };
        f.write_str(name)
    }
}

impl Node {
    /// Kind of this node
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Object(_) => NodeKind::Object,
            Node::Rename(_) => NodeKind::Rename,
            Node::Enum(_) => NodeKind::Enum,
            Node::Transform(_) => NodeKind::Transform,
        }
    }

    /// Write the output of this node under `key` instead of the source key.
    ///
    /// Calling this on a rename node re-targets it rather than nesting a
    /// second rename.
    #[must_use]
    pub fn to(self, key: impl Into<String>) -> Node {
        let inner = match self {
            Node::Rename(rename) => rename.inner,
            Node::Object(object) => Some(Box::new(RenamedNode::Object(object))),
            Node::Enum(remap) => Some(Box::new(RenamedNode::Enum(remap))),
            Node::Transform(transform) => Some(Box::new(RenamedNode::Transform(transform))),
        };

        Node::Rename(RenameNode {
            target: key.into(),
            inner,
        })
    }

    /// Borrow the object payload, if this is an object node
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// Nested record shape: source key to child node
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    shape: Vec<(String, Node)>,
}

impl ObjectNode {
    /// Create an object node with an empty shape
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the node for `key`
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(key.into(), node.into());
        self
    }

    /// Node declared for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.shape
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Declared keys and nodes in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.shape.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of declared keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Check if no keys are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Map this object to another key
    #[must_use]
    pub fn to(self, key: impl Into<String>) -> Node {
        Node::Object(self).to(key)
    }

    fn insert(&mut self, key: String, node: Node) {
        if let Some(slot) = self.shape.iter_mut().find(|(name, _)| *name == key) {
            slot.1 = node;
        } else {
            self.shape.push((key, node));
        }
    }
}

/// Redirect of a value to a different output key
#[derive(Debug, Clone)]
pub struct RenameNode {
    target: String,
    inner: Option<Box<RenamedNode>>,
}

/// Node a rename applies before moving the value; never another rename
#[derive(Debug, Clone)]
pub enum RenamedNode {
    Object(ObjectNode),
    Enum(EnumNode),
    Transform(TransformNode),
}

impl RenamedNode {
    /// Kind of the wrapped node
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            RenamedNode::Object(_) => NodeKind::Object,
            RenamedNode::Enum(_) => NodeKind::Enum,
            RenamedNode::Transform(_) => NodeKind::Transform,
        }
    }
}

impl RenameNode {
    /// Output key the value is written under
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Node applied to the value before it is moved
    #[must_use]
    pub fn inner(&self) -> Option<&RenamedNode> {
        self.inner.as_deref()
    }
}

/// Positional lookup table from primitive source values to output strings
#[derive(Debug, Clone, PartialEq)]
pub struct EnumNode {
    from: Vec<Value>,
    to: Vec<String>,
}

impl EnumNode {
    /// Translate `input` to the output at the position of its first match in
    /// the source values
    #[must_use]
    pub fn translate(&self, input: &Value) -> Option<&str> {
        self.from
            .iter()
            .position(|candidate| same_primitive(candidate, input))
            .map(|index| self.to[index].as_str())
    }

    /// Source values in declaration order
    #[must_use]
    pub fn from_values(&self) -> &[Value] {
        &self.from
    }

    /// Output values in declaration order
    #[must_use]
    pub fn to_values(&self) -> &[String] {
        &self.to
    }

    /// Map this enum to another key
    #[must_use]
    pub fn to(self, key: impl Into<String>) -> Node {
        Node::Enum(self).to(key)
    }

    pub(crate) fn describe_from(&self) -> String {
        let values: Vec<String> = self.from.iter().map(Value::to_string).collect();
        format!("[{}]", values.join(", "))
    }
}

/// Numbers match by numeric value, so `1` and `1.0` are the same key
#[allow(clippy::float_cmp)]
fn same_primitive(candidate: &Value, input: &Value) -> bool {
    match (candidate, input) {
        (Value::Number(left), Value::Number(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => left == right,
        },
        _ => candidate == input,
    }
}

/// Value replacement through a pure function
#[derive(Clone)]
pub struct TransformNode {
    name: Option<String>,
    func: TransformFn,
}

impl TransformNode {
    /// Wrap an already shared transform function
    #[must_use]
    pub fn from_shared(func: TransformFn) -> Self {
        Self { name: None, func }
    }

    /// Attach a name, used in logs and debug output
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name of the transform, if one was given
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Apply the function to a value
    #[must_use]
    pub fn apply(&self, value: &Value) -> Value {
        (self.func)(value)
    }

    /// Map the transformed value to another key
    #[must_use]
    pub fn to(self, key: impl Into<String>) -> Node {
        Node::Transform(self).to(key)
    }
}

impl fmt::Debug for TransformNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl From<ObjectNode> for Node {
    fn from(node: ObjectNode) -> Self {
        Node::Object(node)
    }
}

impl From<RenameNode> for Node {
    fn from(node: RenameNode) -> Self {
        Node::Rename(node)
    }
}

impl From<EnumNode> for Node {
    fn from(node: EnumNode) -> Self {
        Node::Enum(node)
    }
}

impl From<TransformNode> for Node {
    fn from(node: TransformNode) -> Self {
        Node::Transform(node)
    }
}

/// Reshape an object. This is also the root of a schema.
pub fn object<K, N>(shape: impl IntoIterator<Item = (K, N)>) -> ObjectNode
where
    K: Into<String>,
    N: Into<Node>,
{
    shape
        .into_iter()
        .fold(ObjectNode::default(), |object, (key, node)| {
            object.field(key, node)
        })
}

/// Move whatever is at this key to `key`.
pub fn to(key: impl Into<String>) -> Node {
    Node::Rename(RenameNode {
        target: key.into(),
        inner: None,
    })
}

/// Translate primitive values by position: `from[i]` becomes `to[i]`.
///
/// # Errors
///
/// Returns an error when either list is empty, the lists differ in length, or
/// a source value is not a string, number or boolean.
pub fn enumeration<F, T>(
    from: impl IntoIterator<Item = F>,
    to: impl IntoIterator<Item = T>,
) -> Result<EnumNode, SchemaError>
where
    F: Into<Value>,
    T: Into<String>,
{
    let from: Vec<Value> = from.into_iter().map(Into::into).collect();
    let to: Vec<String> = to.into_iter().map(Into::into).collect();

    if from.is_empty() || to.is_empty() {
        return Err(SchemaError::EmptyEnum);
    }
    if from.len() != to.len() {
        return Err(SchemaError::EnumLengthMismatch {
            from: from.len(),
            to: to.len(),
        });
    }
    if let Some(bad) = from
        .iter()
        .find(|value| !(value.is_string() || value.is_number() || value.is_boolean()))
    {
        return Err(SchemaError::NonPrimitiveEnumValue {
            found: bad.to_string(),
        });
    }

    Ok(EnumNode { from, to })
}

/// Replace the value at this key with `func(value)`.
pub fn transform(func: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Node {
    Node::Transform(TransformNode::from_shared(Arc::new(func)))
}

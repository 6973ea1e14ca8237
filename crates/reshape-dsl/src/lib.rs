//! # reshape-dsl
//!
//! Schema definition language and named transforms for reshape mappings.
//!
//! This crate lets a schema be written as a YAML (or JSON) document instead of
//! being assembled in code, and compiles it into a `reshape-mapping` node tree.
//! Transforms are referenced by name and resolved through a
//! [`TransformRegistry`].

pub mod dsl;
pub mod registry;
pub mod transforms;

pub use dsl::{EnumDefinition, FieldDefinition, ParseError, SchemaDefinition, SchemaDsl, Shape};
pub use registry::TransformRegistry;

use thiserror::Error;

/// Errors that can occur when loading or compiling a schema definition
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid definition for field '{field}': {reason}")]
    Definition { field: String, reason: String },

    #[error("Unknown transform '{name}' for field '{field}', available transforms: {available:?}")]
    UnknownTransform {
        name: String,
        field: String,
        available: Vec<String>,
    },

    #[error("Invalid schema for field '{field}': {source}")]
    Schema {
        field: String,
        #[source]
        source: reshape_mapping::SchemaError,
    },
}

impl Error {
    /// Build a definition error for a dotted field path.
    pub fn definition(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Definition {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

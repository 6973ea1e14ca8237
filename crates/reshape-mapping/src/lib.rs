#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # reshape-mapping
//!
//! Schema node tree, issue context, and recursive mapping engine.
//!
//! A schema is assembled from [`object`], [`to`], [`enumeration`] and
//! [`transform`], then applied to a JSON record with
//! [`ObjectNode::map`] or [`ObjectNode::safe_map`]. Keys the schema does not
//! mention are copied through unchanged; structural mismatches are collected
//! as path-scoped [`Issue`]s instead of aborting on the first one.

/// Path-scoped issue accumulation shared across a single walk.
pub mod context;
/// Recursive walk pairing schema nodes with source values.
pub mod engine;
/// Mapping failure carrying the collected issues.
pub mod error;
/// Schema node variants and the builder functions that assemble them.
pub mod node;

/// Issue primitives and the context threaded through the walk.
pub use context::{Issue, IssueContext, Issues};
/// Failure value returned when a walk records issues.
pub use error::MapError;
/// Node tree types and builder entry points.
pub use node::{
    EnumNode, Node, NodeKind, ObjectNode, RenameNode, RenamedNode, TransformFn, TransformNode,
    enumeration, object, to, transform,
};

use thiserror::Error;

/// An output record produced by a mapping call.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur when mapping a record
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Issues(#[from] MapError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Issues carried by this error, empty for non-issue failures.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Issues(err) => err.issues(),
            Self::Serialization(_) => &[],
        }
    }
}

/// Errors raised while building a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Enum mapping requires at least one value")]
    EmptyEnum,

    #[error("Enum arrays must be the same size: {from} source values, {to} target values")]
    EnumLengthMismatch { from: usize, to: usize },

    #[error("Enum source values must be strings, numbers or booleans, found {found}")]
    NonPrimitiveEnumValue { found: String },
}

/// Crate-local result type for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

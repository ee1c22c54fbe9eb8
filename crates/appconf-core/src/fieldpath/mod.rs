//! Path-addressed access to schema-less attribute trees
//!
//! Resource bodies are `serde_json::Value` trees. A field path addresses a
//! node inside such a tree:
//!
//! - `spec.workload.path` walks nested object fields
//! - `spec.containers[0].image` indexes into an array
//! - `metadata.labels["app.kubernetes.io/name"]` (or `[app.kubernetes.io/name]`)
//!   addresses a key that itself contains dots
//!
//! Reads fail when a segment does not exist. Writes create any missing
//! intermediate object or array and may append one element to an array.
//! They fail when an index is past the end of an array or when a segment
//! runs into a value of the wrong shape (e.g. a string where an object is
//! needed).
//!
//! ```
//! use appconf_core::fieldpath::{get_value, set_value};
//! use serde_json::json;
//!
//! let mut tree = json!({});
//! set_value(&mut tree, "spec.workload.path", json!("w")).unwrap();
//! assert_eq!(get_value(&tree, "spec.workload.path").unwrap(), &json!("w"));
//! ```

mod segments;
mod tree;

pub use segments::{parse, Segment};
pub use tree::{get_value, set_value, value_type_name};

use thiserror::Error;

/// Errors produced while parsing a field path or walking a tree with it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldPathError {
    /// The path string itself is malformed
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A segment names a field that is not present
    #[error("{path}: no such field {segment:?}")]
    NotFound { path: String, segment: String },

    /// A segment indexes past the end of an array
    #[error("{path}: index {index} is out of bounds (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    /// A segment expects an object or array but found another kind of value
    #[error("{path}: {segment:?} expects {expected}, found {found}")]
    NotAContainer {
        path: String,
        segment: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value at the path exists but has the wrong type for the caller
    #[error("{path}: expected {expected}, found {found}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A resource body was not a JSON object
    #[error("resource body must be an object, found {found}")]
    InvalidBody { found: &'static str },
}

impl FieldPathError {
    /// The path the failing operation was asked to resolve, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            FieldPathError::InvalidPath { path, .. }
            | FieldPathError::NotFound { path, .. }
            | FieldPathError::IndexOutOfBounds { path, .. }
            | FieldPathError::NotAContainer { path, .. }
            | FieldPathError::UnexpectedType { path, .. } => Some(path),
            FieldPathError::InvalidBody { .. } => None,
        }
    }

    /// Whether the error only says "nothing is there"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FieldPathError::NotFound { .. } | FieldPathError::IndexOutOfBounds { .. }
        )
    }
}

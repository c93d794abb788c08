//! Error types for field path resolution.

use crate::Path;
use thiserror::Error;

/// Result type alias for paved document operations.
pub type PavedResult<T> = Result<T, PavedError>;

/// Errors that can occur while parsing field paths or resolving them
/// against a document.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PavedError {
    /// A segment of the path does not exist in the document.
    #[error("{path}: no such field")]
    NotFound {
        /// The path up to and including the missing segment.
        path: Path,
    },

    /// A segment addresses into a value of the wrong kind.
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path of the offending value.
        path: Path,
        /// The kind of value the segment required.
        expected: &'static str,
        /// The kind of value actually present.
        found: &'static str,
    },

    /// Setting an index would pad a sequence past the allowed growth.
    #[error("{path}: index {index} is out of bounds for sequence of length {len}")]
    IndexOutOfBounds {
        /// The path of the sequence.
        path: Path,
        /// The requested index.
        index: usize,
        /// The sequence's current length.
        len: usize,
    },

    /// The field path string is malformed, or uses a wildcard where a
    /// concrete path is required.
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path, as written.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl PavedError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(path: Path) -> Self {
        PavedError::NotFound { path }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        PavedError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        PavedError::IndexOutOfBounds { path, index, len }
    }

    /// Create an invalid path error.
    #[inline]
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        PavedError::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Returns true if this error reports a missing field or element.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, PavedError::NotFound { .. })
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn test_error_display() {
        let err = PavedError::not_found(path!("spec", "replicas"));
        assert_eq!(err.to_string(), "spec.replicas: no such field");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_type_mismatch_is_not_not_found() {
        let err = PavedError::type_mismatch(path!("spec"), "object", "string");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "spec: expected object, found string");
    }

    #[test]
    fn test_value_type_name() {
        use serde_json::json;

        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "boolean");
        assert_eq!(value_type_name(&json!(42)), "number");
        assert_eq!(value_type_name(&json!("hello")), "string");
        assert_eq!(value_type_name(&json!([1, 2, 3])), "array");
        assert_eq!(value_type_name(&json!({"a": 1})), "object");
    }
}

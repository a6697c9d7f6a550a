//! Error types for document-layer operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for document-layer operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while resolving paths or applying patches.
#[derive(Debug, Error)]
pub enum StateError {
    /// A concrete document operation was given a path containing a pattern
    /// wildcard. Wildcards are only valid in type-map patterns.
    #[error("wildcard segment in concrete path: {path}")]
    WildcardInConcretePath {
        /// The offending path.
        path: Path,
    },

    /// Sequence index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the sequence.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the sequence.
        len: usize,
    },

    /// Type mismatch while descending into a value.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },

    /// A raw field value could not be coerced to its declared type.
    #[error("cannot coerce {raw:?} to {tag} at {path}")]
    CoercionFailed {
        /// The field path.
        path: Path,
        /// The raw value as entered.
        raw: String,
        /// The declared type tag name.
        tag: &'static str,
    },

    /// A type-map pattern was registered twice.
    #[error("duplicate type-map pattern: {pattern}")]
    DuplicatePattern {
        /// The pattern registered twice.
        pattern: Path,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StateError {
    /// Create a wildcard-in-concrete-path error.
    #[inline]
    pub fn wildcard_in_concrete_path(path: Path) -> Self {
        StateError::WildcardInConcretePath { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        StateError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        StateError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create a coercion failure.
    #[inline]
    pub fn coercion_failed(path: Path, raw: impl Into<String>, tag: &'static str) -> Self {
        StateError::CoercionFailed {
            path,
            raw: raw.into(),
            tag,
        }
    }

    /// Create a duplicate-pattern error.
    #[inline]
    pub fn duplicate_pattern(pattern: Path) -> Self {
        StateError::DuplicatePattern { pattern }
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
        let err = StateError::wildcard_in_concrete_path(Path::parse("a.<INDEX>"));
        assert!(err.to_string().contains("wildcard segment"));

        let err = StateError::coercion_failed(path!("settlementDays"), "five", "byte");
        let msg = err.to_string();
        assert!(msg.contains("five"));
        assert!(msg.contains("settlementDays"));
    }

    #[test]
    fn test_value_type_name() {
        use serde_json::json;

        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "boolean");
        assert_eq!(value_type_name(&json!(3)), "number");
        assert_eq!(value_type_name(&json!("s")), "string");
        assert_eq!(value_type_name(&json!([])), "array");
        assert_eq!(value_type_name(&json!({})), "object");
    }
}

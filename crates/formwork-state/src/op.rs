//! Patch operations and the patch container.
//!
//! An extraction pass produces patches: ordered lists of operations that are
//! applied to the candidate document in sequence.

use crate::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single patch operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Set a value at the path.
    ///
    /// Creates intermediate mappings for absent key segments.
    Set {
        /// Target path.
        path: Path,
        /// Value to set.
        value: Value,
    },

    /// Delete the value at the path. No-op if the path doesn't exist.
    Delete {
        /// Target path.
        path: Path,
    },

    /// Append a value to a sequence at the path.
    ///
    /// Creates the sequence if it doesn't exist; errors if the target exists
    /// but is not a sequence.
    Append {
        /// Target path.
        path: Path,
        /// Value to append.
        value: Value,
    },

    /// Merge a mapping into the mapping at the path.
    ///
    /// Creates the mapping if it doesn't exist; errors if the target exists
    /// but is not a mapping.
    MergeObject {
        /// Target path.
        path: Path,
        /// Mapping to merge.
        value: Value,
    },
}

impl Op {
    /// Create a Set operation.
    #[inline]
    pub fn set(path: Path, value: impl Into<Value>) -> Self {
        Op::Set {
            path,
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    #[inline]
    pub fn delete(path: Path) -> Self {
        Op::Delete { path }
    }

    /// Create an Append operation.
    #[inline]
    pub fn append(path: Path, value: impl Into<Value>) -> Self {
        Op::Append {
            path,
            value: value.into(),
        }
    }

    /// Create a MergeObject operation.
    #[inline]
    pub fn merge_object(path: Path, value: impl Into<Value>) -> Self {
        Op::MergeObject {
            path,
            value: value.into(),
        }
    }

    /// Get the path this operation targets.
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Op::Set { path, .. } => path,
            Op::Delete { path } => path,
            Op::Append { path, .. } => path,
            Op::MergeObject { path, .. } => path,
        }
    }

    /// Get the operation name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Op::Set { .. } => "set",
            Op::Delete { .. } => "delete",
            Op::Append { .. } => "append",
            Op::MergeObject { .. } => "merge_object",
        }
    }
}

/// An ordered collection of operations.
///
/// # Examples
///
/// ```
/// use formwork_state::{Patch, Op, path};
/// use serde_json::json;
///
/// let patch = Patch::new()
///     .with_op(Op::set(path!("name"), json!("EUR deposit")))
///     .with_op(Op::set(path!("settlementDays"), json!(2)));
///
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    ops: Vec<Op>,
}

impl Patch {
    /// Create an empty patch.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a patch with the given operations.
    #[inline]
    pub fn with_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Add an operation (builder pattern).
    #[inline]
    pub fn with_op(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    /// Push an operation.
    #[inline]
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Get the operations.
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Consume this patch and return the operations.
    #[inline]
    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Check if this patch is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Get the number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Extend this patch with operations from another patch.
    #[inline]
    pub fn extend(&mut self, other: Patch) {
        self.ops.extend(other.ops);
    }

    /// Iterate over the operations.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Patch {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_op_constructors() {
        let set = Op::set(path!("a"), json!(1));
        assert_eq!(set.name(), "set");
        assert_eq!(set.path(), &path!("a"));

        let app = Op::append(path!("ID"), json!({"Scheme": "ISDA"}));
        assert_eq!(app.name(), "append");
    }

    #[test]
    fn test_op_serde() {
        let op = Op::set(path!("ID", 0, "Value"), json!("GB"));
        let json = serde_json::to_string(&op).unwrap();
        let parsed: Op = serde_json::from_str(&json).unwrap();
        assert_eq!(op, parsed);
    }

    #[test]
    fn test_patch_builder_and_extend() {
        let mut p = Patch::new().with_op(Op::set(path!("a"), json!(1)));
        p.extend(Patch::with_ops(vec![Op::delete(path!("b"))]));
        assert_eq!(p.len(), 2);
        assert_eq!(p.ops()[1].name(), "delete");
    }
}

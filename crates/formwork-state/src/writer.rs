//! Patch-building writer handed to extraction processors.
//!
//! A `DocWriter` collects operations relative to an optional base path, so a
//! block's processor describes its own sub-tree contribution without
//! reaching into a shared mutable document root.

use crate::{Op, Patch, Path};
use serde_json::Value;

/// A writer that accumulates operations into a patch.
///
/// # Examples
///
/// ```
/// use formwork_state::{DocWriter, path};
/// use serde_json::json;
///
/// let mut w = DocWriter::new();
/// w.set(path!("name"), json!("EUR deposit"));
/// w.append(path!("externalIdBundle", "ID"), json!({"Scheme": "ISDA", "Value": "GB"}));
///
/// let patch = w.build();
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocWriter {
    base: Path,
    ops: Vec<Op>,
}

impl DocWriter {
    /// Create a writer at the document root.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer scoped to a base path.
    #[inline]
    pub fn at(base: Path) -> Self {
        Self {
            base,
            ops: Vec::new(),
        }
    }

    /// The base path of this writer.
    #[inline]
    pub fn base(&self) -> &Path {
        &self.base
    }

    #[inline]
    fn full_path(&self, path: Path) -> Path {
        if path.is_empty() {
            self.base.clone()
        } else {
            self.base.join(&path)
        }
    }

    /// Set a value at the given path (relative to the base).
    #[inline]
    pub fn set(&mut self, path: Path, value: impl Into<Value>) -> &mut Self {
        self.ops.push(Op::Set {
            path: self.full_path(path),
            value: value.into(),
        });
        self
    }

    /// Delete the value at the given path.
    #[inline]
    pub fn delete(&mut self, path: Path) -> &mut Self {
        self.ops.push(Op::Delete {
            path: self.full_path(path),
        });
        self
    }

    /// Append a value to the sequence at the given path.
    #[inline]
    pub fn append(&mut self, path: Path, value: impl Into<Value>) -> &mut Self {
        self.ops.push(Op::Append {
            path: self.full_path(path),
            value: value.into(),
        });
        self
    }

    /// Merge a mapping into the mapping at the given path.
    #[inline]
    pub fn merge_object(&mut self, path: Path, value: impl Into<Value>) -> &mut Self {
        self.ops.push(Op::MergeObject {
            path: self.full_path(path),
            value: value.into(),
        });
        self
    }

    /// Take the accumulated operations, leaving the writer empty.
    #[inline]
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    /// Consume the writer and build a patch.
    #[inline]
    pub fn build(self) -> Patch {
        Patch::with_ops(self.ops)
    }

    /// Check whether any operations have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The number of recorded operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

//! Document layer for the formwork form engine.
//!
//! Forms edit one JSON-like document per session. This crate provides the
//! pieces the binding layer builds on:
//!
//! - **Path**: dotted field paths with the `<INDEX>`/`<EMPTY>` pattern
//!   wildcards used by type-map keys
//! - **Op / Patch**: the operations an extraction pass produces
//! - **apply**: pure patch application, plus the in-place variant extraction
//!   uses so earlier contributions stay observable on failure
//! - **DocWriter**: the patch builder handed to block processors
//! - **TypeMap**: pattern → type-tag resolution and strict raw-field coercion
//!
//! # Quick start
//!
//! ```
//! use formwork_state::{apply_patch, Op, Patch, Path, TypeMap, TypeTag, RawField, path};
//! use serde_json::json;
//!
//! let mut types = TypeMap::new();
//! types.insert("settlementDays", TypeTag::Byte).unwrap();
//!
//! let raw = RawField::text("5");
//! let value = types.coerce(&Path::parse("settlementDays"), &raw).unwrap();
//!
//! let doc = json!({});
//! let patch = Patch::new().with_op(Op::set(path!("settlementDays"), value));
//! let out = apply_patch(&doc, &patch).unwrap();
//! assert_eq!(out["settlementDays"], 5);
//! ```

mod apply;
mod error;
mod op;
mod path;
mod typemap;
mod writer;

pub use apply::{apply_op, apply_patch, get_at_path, set_at_path};
pub use error::{value_type_name, StateError, StateResult};
pub use op::{Op, Patch};
pub use path::{Path, Seg, EMPTY_TOKEN, INDEX_TOKEN};
pub use typemap::{RawField, TypeMap, TypeTag};
pub use writer::DocWriter;

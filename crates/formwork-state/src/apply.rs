//! Patch application and path resolution against JSON documents.
//!
//! `apply_patch` is pure: it clones the input document and applies every
//! operation in order. `apply_op` mutates in place and is what extraction
//! uses, so contributions already applied stay observable when a later
//! operation fails.

use crate::{
    error::{value_type_name, StateError, StateResult},
    Op, Patch, Path, Seg,
};
use serde_json::{Map, Value};

/// Apply a patch to a document (pure function).
///
/// # Examples
///
/// ```
/// use formwork_state::{apply_patch, Patch, Op, path};
/// use serde_json::json;
///
/// let doc = json!({"name": "EUR deposit"});
/// let patch = Patch::new().with_op(Op::set(path!("settlementDays"), json!(2)));
///
/// let out = apply_patch(&doc, &patch).unwrap();
/// assert_eq!(out["settlementDays"], 2);
/// assert_eq!(doc.get("settlementDays"), None); // input unchanged
/// ```
pub fn apply_patch(doc: &Value, patch: &Patch) -> StateResult<Value> {
    let mut result = doc.clone();
    for op in patch.ops() {
        apply_op(&mut result, op)?;
    }
    Ok(result)
}

/// Apply a single operation to a document in place.
pub fn apply_op(doc: &mut Value, op: &Op) -> StateResult<()> {
    match op {
        Op::Set { path, value } => set_at_path(doc, path, value.clone()),
        Op::Delete { path } => delete_at_path(doc, path),
        Op::Append { path, value } => append_at_path(doc, path, value.clone()),
        Op::MergeObject { path, value } => merge_object_at_path(doc, path, value),
    }
}

/// Read the value at a concrete path. Returns `None` for absent locations
/// and for paths containing pattern wildcards.
pub fn get_at_path<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = doc;
    for seg in path.iter() {
        current = match seg {
            Seg::Key(k) => current.as_object()?.get(k)?,
            Seg::Index(i) => current.as_array()?.get(*i)?,
            Seg::AnyIndex | Seg::NewIndex => return None,
        };
    }
    Some(current)
}

/// Set a value at a concrete path, creating intermediate mappings for absent
/// key segments. The terminal index of a sequence may be one past the end,
/// which appends.
pub fn set_at_path(doc: &mut Value, path: &Path, value: Value) -> StateResult<()> {
    if !path.is_concrete() {
        return Err(StateError::wildcard_in_concrete_path(path.clone()));
    }
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    descend_set(doc, path.segments(), value, path)
}

fn descend_set(current: &mut Value, segments: &[Seg], value: Value, full: &Path) -> StateResult<()> {
    match segments {
        [] => {
            *current = value;
            Ok(())
        }
        [Seg::Key(key), rest @ ..] => {
            // Each segment that does not yet exist as a mapping is created
            // as an empty mapping before descending.
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let obj = current.as_object_mut().expect("just ensured object");
            if rest.is_empty() {
                obj.insert(key.clone(), value);
                Ok(())
            } else {
                let entry = obj.entry(key.clone()).or_insert(Value::Null);
                descend_set(entry, rest, value, full)
            }
        }
        [Seg::Index(idx), rest @ ..] => {
            let found = value_type_name(current);
            let arr = current
                .as_array_mut()
                .ok_or_else(|| StateError::type_mismatch(full.clone(), "array", found))?;
            let len = arr.len();
            if rest.is_empty() && *idx == len {
                arr.push(value);
                return Ok(());
            }
            let slot = arr
                .get_mut(*idx)
                .ok_or_else(|| StateError::index_out_of_bounds(full.clone(), *idx, len))?;
            descend_set(slot, rest, value, full)
        }
        [Seg::AnyIndex | Seg::NewIndex, ..] => {
            Err(StateError::wildcard_in_concrete_path(full.clone()))
        }
    }
}

fn delete_at_path(doc: &mut Value, path: &Path) -> StateResult<()> {
    if !path.is_concrete() {
        return Err(StateError::wildcard_in_concrete_path(path.clone()));
    }
    let Some(parent_path) = path.parent() else {
        *doc = Value::Object(Map::new());
        return Ok(());
    };
    let Some(parent) = get_at_path_mut(doc, &parent_path) else {
        return Ok(());
    };
    match (parent, path.last()) {
        (Value::Object(obj), Some(Seg::Key(k))) => {
            obj.remove(k);
        }
        (Value::Array(arr), Some(Seg::Index(i))) => {
            if *i < arr.len() {
                arr.remove(*i);
            }
        }
        _ => {}
    }
    Ok(())
}

fn append_at_path(doc: &mut Value, path: &Path, value: Value) -> StateResult<()> {
    if !path.is_concrete() {
        return Err(StateError::wildcard_in_concrete_path(path.clone()));
    }
    ensure_container(doc, path, Value::Array(Vec::new()))?;
    let target = get_at_path_mut(doc, path).expect("just ensured container");
    match target {
        Value::Array(arr) => {
            arr.push(value);
            Ok(())
        }
        other => Err(StateError::type_mismatch(
            path.clone(),
            "array",
            value_type_name(other),
        )),
    }
}

fn merge_object_at_path(doc: &mut Value, path: &Path, value: &Value) -> StateResult<()> {
    if !path.is_concrete() {
        return Err(StateError::wildcard_in_concrete_path(path.clone()));
    }
    let incoming = value.as_object().ok_or_else(|| {
        StateError::type_mismatch(path.clone(), "object", value_type_name(value))
    })?;
    ensure_container(doc, path, Value::Object(Map::new()))?;
    let target = get_at_path_mut(doc, path).expect("just ensured container");
    match target {
        Value::Object(obj) => {
            for (k, v) in incoming {
                obj.insert(k.clone(), v.clone());
            }
            Ok(())
        }
        other => Err(StateError::type_mismatch(
            path.clone(),
            "object",
            value_type_name(other),
        )),
    }
}

/// Make sure `path` resolves to some container, seeding `empty` when the
/// location is absent or null.
fn ensure_container(doc: &mut Value, path: &Path, empty: Value) -> StateResult<()> {
    match get_at_path(doc, path) {
        None | Some(Value::Null) => set_at_path(doc, path, empty),
        Some(_) => Ok(()),
    }
}

fn get_at_path_mut<'a>(doc: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut current = doc;
    for seg in path.iter() {
        current = match seg {
            Seg::Key(k) => current.as_object_mut()?.get_mut(k)?,
            Seg::Index(i) => current.as_array_mut()?.get_mut(*i)?,
            Seg::AnyIndex | Seg::NewIndex => return None,
        };
    }
    Some(current)
}

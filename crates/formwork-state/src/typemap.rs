//! Pattern → type-tag table driving field coercion.
//!
//! Form fields arrive as raw strings (or checkbox presence). The type map
//! declares, per path pattern, what typed JSON value a field extracts to.
//! Patterns use `<INDEX>` for any existing sequence index and `<EMPTY>` for
//! positions appended after initial population.

use crate::{Path, Seg, StateError, StateResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Primitive type tag for an extracted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Pass the raw text through unchanged. The default when no pattern matches.
    Str,
    /// Checkbox presence, extracted as `true`/`false`.
    Boolean,
    /// Small integer field, parsed strictly; parse failure is an error, not zero.
    Byte,
}

impl TypeTag {
    /// Stable lowercase name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Str => "string",
            TypeTag::Boolean => "boolean",
            TypeTag::Byte => "byte",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw value of one live form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawField {
    /// The string content of a text-like input.
    Text(String),
    /// Checkbox checked state.
    Checkbox(bool),
}

impl RawField {
    /// Create a text field value.
    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        RawField::Text(s.into())
    }

    /// A raw display form for error messages.
    fn describe(&self) -> String {
        match self {
            RawField::Text(s) => s.clone(),
            RawField::Checkbox(b) => b.to_string(),
        }
    }
}

/// Mapping from path pattern to type tag.
///
/// At most one entry can match a given concrete path: patterns are map keys,
/// so duplicates are rejected at insert time.
///
/// # Examples
///
/// ```
/// use formwork_state::{TypeMap, TypeTag, Path};
///
/// let mut map = TypeMap::new();
/// map.insert("settlementDays", TypeTag::Byte).unwrap();
/// map.insert("ID.<INDEX>.deleted", TypeTag::Boolean).unwrap();
///
/// assert_eq!(map.resolve(&Path::parse("settlementDays")), TypeTag::Byte);
/// assert_eq!(map.resolve(&Path::parse("ID.2.deleted")), TypeTag::Boolean);
/// assert_eq!(map.resolve(&Path::parse("name")), TypeTag::Str);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypeMap {
    entries: BTreeMap<Path, TypeTag>,
}

impl TypeMap {
    /// Create an empty type map.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern. Rejects exact duplicates.
    pub fn insert(&mut self, pattern: impl Into<Path>, tag: TypeTag) -> StateResult<()> {
        let pattern = pattern.into();
        if self.entries.contains_key(&pattern) {
            return Err(StateError::duplicate_pattern(pattern));
        }
        self.entries.insert(pattern, tag);
        Ok(())
    }

    /// Build a type map from `(pattern, tag)` pairs.
    pub fn from_entries<P: Into<Path>>(
        entries: impl IntoIterator<Item = (P, TypeTag)>,
    ) -> StateResult<Self> {
        let mut map = Self::new();
        for (pattern, tag) in entries {
            map.insert(pattern, tag)?;
        }
        Ok(map)
    }

    /// The number of registered patterns.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no patterns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the type tag for a concrete path.
    ///
    /// Every index segment is substituted with `<INDEX>` and the candidate is
    /// looked up. On a miss where the final segment is an index, the lookup
    /// is retried with `<EMPTY>` as the final segment, which covers elements
    /// appended after initial population. The default is string.
    pub fn resolve(&self, path: &Path) -> TypeTag {
        let candidate = path.as_pattern();
        if let Some(tag) = self.entries.get(&candidate) {
            return *tag;
        }
        if matches!(path.last(), Some(Seg::Index(_))) {
            let mut appended = candidate;
            appended.pop();
            appended.push(Seg::NewIndex);
            if let Some(tag) = self.entries.get(&appended) {
                return *tag;
            }
        }
        TypeTag::Str
    }

    /// Coerce a raw field value through the tag resolved for `path`.
    ///
    /// Coercion is strict: a `Byte` field that does not parse as an integer
    /// is an error rather than a silent zero.
    pub fn coerce(&self, path: &Path, raw: &RawField) -> StateResult<Value> {
        let tag = self.resolve(path);
        match (tag, raw) {
            (TypeTag::Str, RawField::Text(s)) => Ok(Value::String(s.clone())),
            (TypeTag::Boolean, RawField::Checkbox(b)) => Ok(Value::Bool(*b)),
            (TypeTag::Boolean, RawField::Text(s)) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(StateError::coercion_failed(path.clone(), s, tag.name())),
            },
            (TypeTag::Byte, RawField::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| StateError::coercion_failed(path.clone(), s, tag.name())),
            // A checkbox under a non-boolean tag still extracts its checked
            // state; the declared tag cannot apply to presence-only input.
            (TypeTag::Str, RawField::Checkbox(b)) => Ok(Value::Bool(*b)),
            (TypeTag::Byte, RawField::Checkbox(_)) => Err(StateError::coercion_failed(
                path.clone(),
                raw.describe(),
                tag.name(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map() -> TypeMap {
        TypeMap::from_entries([
            ("settlementDays", TypeTag::Byte),
            ("isEOM", TypeTag::Boolean),
            ("ID.<INDEX>.deleted", TypeTag::Boolean),
            ("attr.<EMPTY>", TypeTag::Byte),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_exact_and_index_substitution() {
        let m = map();
        assert_eq!(m.resolve(&Path::parse("settlementDays")), TypeTag::Byte);
        for i in [0usize, 1, 17] {
            let p = Path::parse(&format!("ID.{}.deleted", i));
            assert_eq!(m.resolve(&p), TypeTag::Boolean);
        }
    }

    #[test]
    fn test_resolve_appended_element_fallback() {
        let m = map();
        assert_eq!(m.resolve(&Path::parse("attr.5")), TypeTag::Byte);
    }

    #[test]
    fn test_resolve_defaults_to_string() {
        let m = map();
        assert_eq!(m.resolve(&Path::parse("no.such.entry")), TypeTag::Str);
        assert_eq!(m.resolve(&Path::parse("ID.0.Scheme")), TypeTag::Str);
    }

    #[test]
    fn test_duplicate_pattern_rejected() {
        let mut m = TypeMap::new();
        m.insert("a", TypeTag::Str).unwrap();
        let err = m.insert("a", TypeTag::Byte).unwrap_err();
        assert!(matches!(err, StateError::DuplicatePattern { .. }));
    }

    #[test]
    fn test_coerce_byte_strict() {
        let m = map();
        let p = Path::parse("settlementDays");
        assert_eq!(m.coerce(&p, &RawField::text("5")).unwrap(), json!(5));
        assert_eq!(m.coerce(&p, &RawField::text(" 12 ")).unwrap(), json!(12));

        let err = m.coerce(&p, &RawField::text("five")).unwrap_err();
        assert!(matches!(err, StateError::CoercionFailed { .. }));
    }

    #[test]
    fn test_coerce_boolean() {
        let m = map();
        let p = Path::parse("isEOM");
        assert_eq!(m.coerce(&p, &RawField::Checkbox(true)).unwrap(), json!(true));
        assert_eq!(m.coerce(&p, &RawField::text("true")).unwrap(), json!(true));
        assert_eq!(m.coerce(&p, &RawField::text("false")).unwrap(), json!(false));
        assert!(m.coerce(&p, &RawField::text("yes")).is_err());
    }

    #[test]
    fn test_coerce_string_passthrough() {
        let m = map();
        let p = Path::parse("name");
        assert_eq!(
            m.coerce(&p, &RawField::text("EUR deposit")).unwrap(),
            json!("EUR deposit")
        );
    }
}

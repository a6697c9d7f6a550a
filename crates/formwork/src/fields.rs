//! Live field state: the headless stand-in for rendered form inputs.
//!
//! After `dom()` the form's scalar leaves become named fields, keyed by their
//! dotted path. Collaborators (the view layer, or tests) mutate them the way
//! DOM events would; extraction reads them back in registration order.

use formwork_state::RawField;
use indexmap::IndexMap;
use serde_json::Value;

/// Insertion-ordered map of live field values.
#[derive(Clone, Debug, Default)]
pub struct FieldState {
    fields: IndexMap<String, RawField>,
}

impl FieldState {
    /// Create an empty field state.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents by flattening a document's scalar leaves.
    ///
    /// Booleans seed checkboxes; numbers and strings seed text inputs with
    /// their display form. Nulls and empty containers contribute no fields.
    pub fn seed_from(&mut self, doc: &Value) {
        self.fields.clear();
        let mut prefix = String::new();
        flatten(doc, &mut prefix, &mut self.fields);
    }

    /// Set the text of a field, registering it if new.
    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(name.into(), RawField::Text(value.into()));
    }

    /// Set a checkbox field, registering it if new.
    pub fn set_checked(&mut self, name: impl Into<String>, checked: bool) {
        self.fields.insert(name.into(), RawField::Checkbox(checked));
    }

    /// Get a field's raw value.
    pub fn get(&self, name: &str) -> Option<&RawField> {
        self.fields.get(name)
    }

    /// Remove a field (the analogue of removing its input from the page).
    pub fn remove(&mut self, name: &str) -> Option<RawField> {
        self.fields.shift_remove(name)
    }

    /// Iterate over fields in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of live fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no live fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn flatten(value: &Value, prefix: &mut String, out: &mut IndexMap<String, RawField>) {
    match value {
        Value::Object(obj) => {
            for (k, v) in obj {
                let len = prefix.len();
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(k);
                flatten(v, prefix, out);
                prefix.truncate(len);
            }
        }
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                let len = prefix.len();
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(&i.to_string());
                flatten(v, prefix, out);
                prefix.truncate(len);
            }
        }
        Value::Bool(b) => {
            out.insert(prefix.clone(), RawField::Checkbox(*b));
        }
        Value::String(s) => {
            out.insert(prefix.clone(), RawField::Text(s.clone()));
        }
        Value::Number(n) => {
            out.insert(prefix.clone(), RawField::Text(n.to_string()));
        }
        Value::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_flattens_scalar_leaves() {
        let mut fields = FieldState::new();
        fields.seed_from(&json!({
            "name": "EUR deposit",
            "settlementDays": 2,
            "isEOM": true,
            "externalIdBundle": {"ID": [{"Scheme": "ISDA", "Value": "GB"}]},
        }));

        assert_eq!(fields.get("name"), Some(&RawField::text("EUR deposit")));
        assert_eq!(fields.get("settlementDays"), Some(&RawField::text("2")));
        assert_eq!(fields.get("isEOM"), Some(&RawField::Checkbox(true)));
        assert_eq!(
            fields.get("externalIdBundle.ID.0.Scheme"),
            Some(&RawField::text("ISDA"))
        );
    }

    #[test]
    fn test_seed_skips_nulls_and_empty_containers() {
        let mut fields = FieldState::new();
        fields.seed_from(&json!({"a": null, "b": {}, "c": []}));
        assert!(fields.is_empty());
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut fields = FieldState::new();
        fields.set_text("b", "1");
        fields.set_text("a", "2");
        fields.set_checked("c", false);
        let names: Vec<_> = fields.iter().map(|(n, _)| n.to_owned()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut fields = FieldState::new();
        fields.set_text("a", "1");
        fields.set_text("b", "2");
        fields.set_text("a", "3");
        assert_eq!(fields.get("a"), Some(&RawField::text("3")));
        let names: Vec<_> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }
}

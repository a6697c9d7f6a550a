//! Template bodies and the explicit module table.
//!
//! The registry is built once at startup and passed by reference into form
//! construction. There is no global namespace to mutate: a view that needs a
//! module it never registered gets `FormError::UnknownModule` at construction
//! time, not an empty render later.

use crate::{FormError, FormResult};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder that receives the joined markup of a block's children.
pub const CHILDREN_SLOT: &str = "children";

/// Expand `{{key}}` placeholders in a template body.
///
/// `{{children}}` receives the pre-rendered child markup; every other key is
/// looked up in `vars`. Unknown placeholders expand to nothing. String values
/// interpolate bare; other JSON values interpolate in their JSON form.
pub fn expand(body: &str, vars: &BTreeMap<String, Value>, children: &str) -> String {
    let mut out = String::with_capacity(body.len() + children.len());
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if key == CHILDREN_SLOT {
                    out.push_str(children);
                } else if let Some(value) = vars.get(key) {
                    match value {
                        Value::String(s) => out.push_str(s),
                        other => out.push_str(&other.to_string()),
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated placeholder: emit the remainder verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// An explicit table of template modules.
///
/// # Examples
///
/// ```
/// use formwork::TemplateRegistry;
///
/// let mut registry = TemplateRegistry::new();
/// registry
///     .register("convention_forms.basic", "<fieldset>{{children}}</fieldset>")
///     .unwrap();
/// assert!(registry.get("convention_forms.basic").is_ok());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    modules: BTreeMap<String, String>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module's template body.
    ///
    /// Rejects empty names and duplicates.
    pub fn register(&mut self, module: impl Into<String>, body: impl Into<String>) -> FormResult<()> {
        let module = module.into();
        if module.trim().is_empty() {
            return Err(FormError::EmptyModuleName);
        }
        if self.modules.contains_key(&module) {
            return Err(FormError::duplicate_module(module));
        }
        self.modules.insert(module, body.into());
        Ok(())
    }

    /// Look up a module's template body.
    pub fn get(&self, module: &str) -> FormResult<&str> {
        self.modules
            .get(module)
            .map(String::as_str)
            .ok_or_else(|| FormError::unknown_module(module))
    }

    /// The number of registered modules.
    #[inline]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate over registered module names.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

//! The form: root block plus render/load/submit/compile orchestration.
//!
//! A form exclusively owns one document for the duration of an edit session.
//! Rendering and extraction are synchronous; the only asynchronous boundary
//! is the REST collaborator reached through the save path.

use crate::block::{Block, BlockConfig, Processor};
use crate::fields::FieldState;
use crate::rest::{ResourceClient, ResourceOutcome, ResourceRequest};
use crate::template::TemplateRegistry;
use crate::{FormError, FormResult, LoadEvent};
use formwork_state::{apply_op, get_at_path, set_at_path, Path, TypeMap};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Construction config for a form.
pub struct FormConfig {
    /// Template module for the root block.
    pub module: String,
    /// The initial document.
    pub data: Value,
    /// Document metadata, carried through submit outcomes.
    pub meta: Value,
    /// Pattern → type-tag table for field coercion.
    pub type_map: TypeMap,
    /// DOM mount selector; the caller mounts the returned markup there.
    pub selector: String,
    /// Static variables for the root template.
    pub extras: BTreeMap<String, Value>,
    /// Child blocks, in render order.
    pub children: Vec<Block>,
    /// Optional root-level extraction processor.
    pub processor: Option<Box<dyn Processor>>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            module: String::new(),
            data: Value::Object(Map::new()),
            meta: Value::Null,
            type_map: TypeMap::new(),
            selector: String::new(),
            extras: BTreeMap::new(),
            children: Vec::new(),
            processor: None,
        }
    }
}

impl FormConfig {
    /// Config with the required module and initial document.
    pub fn new(module: impl Into<String>, data: Value) -> Self {
        Self {
            module: module.into(),
            data,
            ..Self::default()
        }
    }
}

/// The successful payload of a submit.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitData {
    /// The extracted document.
    pub data: Value,
    /// The form's metadata.
    pub meta: Value,
}

/// A failed submit.
///
/// Extraction has no rollback: contributions applied before the failing
/// processor remain visible in `partial`.
#[derive(Clone, Debug)]
pub struct SubmitFailure {
    /// What went wrong.
    pub message: String,
    /// The candidate document as it stood when extraction stopped.
    pub partial: Value,
}

/// What `form:submit` consumers receive, one per submit attempt.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    /// Caller-supplied submission flags (e.g. `{"save_as_new": true}`).
    pub extras: Value,
    /// The extraction result.
    pub result: Result<SubmitData, SubmitFailure>,
}

impl SubmitOutcome {
    /// True when extraction succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of the save path: persisted, or rejected before reaching the client.
#[derive(Clone, Debug)]
pub enum SaveResult {
    /// The client was called; its outcome is inside (which may itself report
    /// a backend error).
    Saved(ResourceOutcome),
    /// Submit validation failed; the client was never called.
    Rejected(SubmitFailure),
}

type SubmitCallback = Box<dyn Fn(&SubmitOutcome)>;

/// The aggregate/root block of one edit session.
pub struct Form {
    root: Block,
    data: Value,
    meta: Value,
    type_map: TypeMap,
    selector: String,
    fields: FieldState,
    snapshot: Option<Value>,
    loaded: bool,
    in_flight: bool,
    submit_callbacks: Vec<SubmitCallback>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("module", &self.root.module())
            .field("selector", &self.selector)
            .field("loaded", &self.loaded)
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl Form {
    /// Construct a form against an explicit template registry.
    ///
    /// A missing module name is a configuration error here, never a silent
    /// empty render later.
    pub fn new(config: FormConfig, registry: &TemplateRegistry) -> FormResult<Self> {
        if config.module.trim().is_empty() {
            return Err(FormError::MissingTemplate);
        }
        let root = Block::new(
            BlockConfig {
                module: Some(config.module),
                template: None,
                extras: config.extras,
                children: config.children,
                processor: config.processor,
                content: Default::default(),
            },
            registry,
        )?;
        Ok(Self {
            root,
            data: config.data,
            meta: config.meta,
            type_map: config.type_map,
            selector: config.selector,
            fields: FieldState::new(),
            snapshot: None,
            loaded: false,
            in_flight: false,
            submit_callbacks: Vec::new(),
        })
    }

    /// The mount selector the caller should render the markup into.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The owned document as constructed.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The root block.
    pub fn root(&self) -> &Block {
        &self.root
    }

    /// Mutable access to the root block (row edits on content blocks).
    pub fn root_mut(&mut self) -> &mut Block {
        &mut self.root
    }

    /// The live field state.
    pub fn fields(&self) -> &FieldState {
        &self.fields
    }

    /// Mutable access to the live field state (the analogue of input events).
    pub fn fields_mut(&mut self) -> &mut FieldState {
        &mut self.fields
    }

    /// True once `dom()` has run and the load cascade completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Register a `form:load` callback on the root block.
    pub fn on_load(&mut self, callback: impl Fn(&LoadEvent<'_>) + 'static) {
        self.root.on_load(callback);
    }

    /// Register a `form:submit` callback.
    pub fn on_submit(&mut self, callback: impl Fn(&SubmitOutcome) + 'static) {
        self.submit_callbacks.push(Box::new(callback));
    }

    /// Render the tree, seed the live fields from the document, and fire the
    /// `form:load` cascade (all descendant markup exists before any handler
    /// runs; children are notified before the root).
    ///
    /// Returns the markup to mount at [`selector`](Self::selector). Also
    /// captures the post-load snapshot used by [`is_dirty`](Self::is_dirty).
    /// Rendering succeeds even when a processor rejects the document (a new
    /// record may not satisfy its required fields yet): the validation
    /// failure stays with `submit`, and the form renders without a snapshot.
    pub fn dom(&mut self) -> FormResult<String> {
        let markup = self.root.render();
        self.fields.seed_from(&self.data);
        self.root.notify_load(&markup);
        self.loaded = true;
        match self.extract() {
            Ok((snapshot, _)) => self.snapshot = Some(snapshot),
            Err((err, _)) => {
                self.snapshot = None;
                tracing::debug!(error = %err, "post-load snapshot unavailable");
            }
        }
        tracing::debug!(
            selector = %self.selector,
            fields = self.fields.len(),
            "form rendered and loaded"
        );
        Ok(markup)
    }

    /// Run extraction without firing `form:submit`.
    ///
    /// Pure read: neither the owned document, the field state, nor the
    /// rendered tree is touched. Used for comparison snapshots.
    pub fn compile(&self) -> FormResult<Value> {
        self.extract().map(|(doc, _)| doc).map_err(|(err, _)| err)
    }

    /// Whether a fresh extraction differs structurally from the post-load
    /// snapshot. Mapping-key order does not matter. Before `dom()`, or when
    /// the post-load extraction did not produce a snapshot, there is nothing
    /// to compare against and the form is not dirty.
    pub fn is_dirty(&self) -> FormResult<bool> {
        match &self.snapshot {
            Some(snapshot) => Ok(self.compile()? != *snapshot),
            None => Ok(false),
        }
    }

    /// Run extraction and deliver the outcome to `form:submit` consumers.
    ///
    /// Validation errors become a failure outcome, not an `Err`: nothing a
    /// processor raises propagates past the form boundary. On success the
    /// form is marked in flight until [`complete_submission`](Self::complete_submission);
    /// a submit during that window is rejected.
    pub fn submit(&mut self, extras: Value) -> SubmitOutcome {
        let result = if self.in_flight {
            Err(SubmitFailure {
                message: FormError::SubmitInFlight.to_string(),
                partial: Value::Null,
            })
        } else {
            match self.extract() {
                Ok((data, processors_run)) => {
                    self.in_flight = true;
                    tracing::debug!(processors_run, "form extraction succeeded");
                    Ok(SubmitData {
                        data,
                        meta: self.meta.clone(),
                    })
                }
                Err((err, partial)) => {
                    tracing::debug!(error = %err, "form extraction failed");
                    Err(SubmitFailure {
                        message: err.to_string(),
                        partial,
                    })
                }
            }
        };
        let outcome = SubmitOutcome { extras, result };
        for callback in &self.submit_callbacks {
            callback(&outcome);
        }
        outcome
    }

    /// Clear the in-flight flag once the collaborator has acknowledged the
    /// submission (or abandoned it).
    pub fn complete_submission(&mut self) {
        self.in_flight = false;
    }

    /// Submit and, on success, persist through the REST collaborator.
    ///
    /// The in-flight window spans the `put` call, then closes.
    pub fn save(
        &mut self,
        client: &dyn ResourceClient,
        id: Option<String>,
        extras: Value,
    ) -> SaveResult {
        let outcome = self.submit(extras);
        match outcome.result {
            Ok(submit) => {
                let response = client.put(ResourceRequest::write(id, submit.data, submit.meta));
                self.complete_submission();
                SaveResult::Saved(response)
            }
            Err(failure) => SaveResult::Rejected(failure),
        }
    }

    /// Extraction: coerce every live field through the type map and write it
    /// at its path into a candidate seeded from the owned document, then run
    /// content contributions and processors depth-first, children before
    /// their parent. Contributions are applied as each block completes, so a
    /// later failure leaves earlier writes in the returned partial document.
    ///
    /// Returns the candidate and the number of blocks that contributed, or
    /// the error plus the partial candidate.
    fn extract(&self) -> Result<(Value, usize), (FormError, Value)> {
        let mut candidate = self.data.clone();

        for (name, raw) in self.fields.iter() {
            let path = Path::parse(name);
            let mut coerce = || -> FormResult<()> {
                let value = self.type_map.coerce(&path, raw)?;
                set_at_path(&mut candidate, &path, value)?;
                Ok(())
            };
            if let Err(err) = coerce() {
                return Err((err, candidate));
            }
        }

        let mut processors_run = 0usize;
        let fields = &self.fields;
        let walk = self.root.for_each_post_order(&mut |block| {
            if let Some(patch) = block.content_contribution(fields) {
                for op in patch.iter() {
                    apply_op(&mut candidate, op)?;
                }
                processors_run += 1;
            }
            let patch = block.run_processor(&candidate)?;
            if !patch.is_empty() {
                processors_run += 1;
            }
            for op in patch.iter() {
                apply_op(&mut candidate, op)?;
            }
            Ok(())
        });
        match walk {
            Ok(()) => Ok((candidate, processors_run)),
            Err(err) => Err((err, candidate)),
        }
    }
}

/// Validation helper: the value at `path` must be present and, for strings,
/// non-blank. The admin views use this to refuse saving unnamed records.
pub fn require_field(doc: &Value, path: &Path) -> FormResult<()> {
    match get_at_path(doc, path) {
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(FormError::validation(format!("{path} is required")))
        }
        Some(Value::Null) | None => Err(FormError::validation(format!("{path} is required"))),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_state::{path, TypeTag};
    use serde_json::json;

    fn registry() -> TemplateRegistry {
        let mut r = TemplateRegistry::new();
        r.register("form", "<form>{{children}}</form>").unwrap();
        r.register("field", "<input name=\"{{name}}\">").unwrap();
        r
    }

    #[test]
    fn test_empty_module_is_configuration_error() {
        let err = Form::new(FormConfig::default(), &registry()).unwrap_err();
        assert!(matches!(err, FormError::MissingTemplate));
    }

    #[test]
    fn test_settlement_days_coerces_to_number() {
        let mut type_map = TypeMap::new();
        type_map.insert("settlementDays", TypeTag::Byte).unwrap();
        let mut form = Form::new(
            FormConfig {
                type_map,
                ..FormConfig::new("form", json!({"settlementDays": "5"}))
            },
            &registry(),
        )
        .unwrap();
        form.dom().unwrap();
        let compiled = form.compile().unwrap();
        assert_eq!(compiled["settlementDays"], json!(5));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let mut form = Form::new(
            FormConfig::new("form", json!({"name": "EUR deposit", "isEOM": true})),
            &registry(),
        )
        .unwrap();
        form.dom().unwrap();
        assert_eq!(form.compile().unwrap(), form.compile().unwrap());
    }

    #[test]
    fn test_dirty_after_field_edit() {
        let mut form = Form::new(
            FormConfig::new("form", json!({"name": "EUR deposit"})),
            &registry(),
        )
        .unwrap();
        form.dom().unwrap();
        assert!(!form.is_dirty().unwrap());

        form.fields_mut().set_text("name", "USD deposit");
        assert!(form.is_dirty().unwrap());

        form.fields_mut().set_text("name", "EUR deposit");
        assert!(!form.is_dirty().unwrap());
    }

    #[test]
    fn test_require_field() {
        let doc = json!({"name": "x", "empty": "  ", "n": 1});
        assert!(require_field(&doc, &path!("name")).is_ok());
        assert!(require_field(&doc, &path!("n")).is_ok());
        assert!(require_field(&doc, &path!("empty")).is_err());
        assert!(require_field(&doc, &path!("missing")).is_err());
    }
}

//! Blocks: composable form fragments.
//!
//! A block owns a template, static extras for interpolation, an ordered list
//! of child blocks, and an optional extraction processor. Variant behavior
//! (dropdowns, attribute tables, external-id bundles) is selected by a
//! content strategy rather than by subtyping.

use crate::template::{expand, TemplateRegistry};
use crate::{FormError, FormResult};
use formwork_state::{DocWriter, Op, Patch, Path, RawField};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::FieldState;

/// Extraction processor: writes a block's contribution through a `DocWriter`.
///
/// The processor sees the current candidate document (including earlier
/// contributions) and records operations; it never mutates the document
/// directly. Returning a validation error aborts the extraction pass.
pub trait Processor {
    /// Record this block's contribution to the candidate document.
    fn process(&self, doc: &Value, writer: &mut DocWriter) -> FormResult<()>;
}

impl<F> Processor for F
where
    F: Fn(&Value, &mut DocWriter) -> FormResult<()>,
{
    fn process(&self, doc: &Value, writer: &mut DocWriter) -> FormResult<()> {
        self(doc, writer)
    }
}

/// Notification delivered to `form:load` callbacks.
///
/// By the time any callback runs, the markup of every block in the tree is
/// present in `markup`; a parent's handler may address elements contributed
/// by its children.
#[derive(Clone, Copy, Debug)]
pub struct LoadEvent<'a> {
    /// Module name of the block that loaded (empty for inline templates).
    pub module: &'a str,
    /// The complete rendered markup of the form.
    pub markup: &'a str,
}

type LoadCallback = Box<dyn Fn(&LoadEvent<'_>)>;

/// One scheme/value pair in an external-id bundle editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdEntry {
    /// Identifier scheme (e.g. `"ISDA"`).
    pub scheme: String,
    /// Identifier value.
    pub value: String,
}

impl IdEntry {
    /// Create an entry.
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }
}

/// Content strategy for a block.
///
/// `Plain` blocks contribute nothing beyond their template, children, and
/// processor. The other variants are the structured sub-editors of the admin
/// UI, each owning its rows and acting as the authority for its field's
/// sub-tree during extraction.
#[derive(Debug, Default)]
pub enum BlockContent {
    /// No variant behavior.
    #[default]
    Plain,
    /// A select input. Extraction writes the live selection (falling back to
    /// the configured value) at `field`.
    Dropdown {
        /// Dotted field path the selection extracts to.
        field: String,
        /// Options, in display order.
        options: Vec<String>,
        /// Initially selected option.
        value: Option<String>,
    },
    /// A key/value attribute table. Extraction writes the rows as a mapping
    /// at `field`.
    Attributes {
        /// Dotted field path the mapping extracts to.
        field: String,
        /// Attribute rows, in display order.
        rows: Vec<(String, String)>,
    },
    /// An external-id bundle editor. Extraction writes
    /// `{"ID": [{"Scheme", "Value"}, ..]}` at `field`.
    ExternalIdBundle {
        /// Dotted field path the bundle extracts to.
        field: String,
        /// Identifier rows, in display order.
        ids: Vec<IdEntry>,
    },
}

impl BlockContent {
    /// Template variables this content contributes, layered over the block's
    /// static extras.
    fn render_vars(&self, vars: &mut BTreeMap<String, Value>) {
        match self {
            BlockContent::Plain => {}
            BlockContent::Dropdown {
                field,
                options,
                value,
            } => {
                let rendered: String = options
                    .iter()
                    .map(|opt| {
                        if Some(opt) == value.as_ref() {
                            format!("<option value=\"{opt}\" selected>{opt}</option>")
                        } else {
                            format!("<option value=\"{opt}\">{opt}</option>")
                        }
                    })
                    .collect();
                vars.insert("field".into(), Value::String(field.clone()));
                vars.insert("options".into(), Value::String(rendered));
            }
            BlockContent::Attributes { field, rows } => {
                let rendered: String = rows
                    .iter()
                    .map(|(k, v)| format!("<tr><td>{k}</td><td>{v}</td></tr>"))
                    .collect();
                vars.insert("field".into(), Value::String(field.clone()));
                vars.insert("rows".into(), Value::String(rendered));
            }
            BlockContent::ExternalIdBundle { field, ids } => {
                let rendered: String = ids
                    .iter()
                    .map(|id| format!("<tr><td>{}</td><td>{}</td></tr>", id.scheme, id.value))
                    .collect();
                vars.insert("field".into(), Value::String(field.clone()));
                vars.insert("rows".into(), Value::String(rendered));
            }
        }
    }

    /// The implicit extraction contribution of this content, if any.
    fn contribution(&self, fields: &FieldState) -> Option<Patch> {
        match self {
            BlockContent::Plain => None,
            BlockContent::Dropdown { field, value, .. } => {
                let selected = match fields.get(field) {
                    Some(RawField::Text(live)) => Some(live.clone()),
                    _ => value.clone(),
                };
                selected.map(|v| {
                    Patch::new().with_op(Op::set(Path::parse(field), Value::String(v)))
                })
            }
            BlockContent::Attributes { field, rows } => {
                let mut obj = Map::new();
                for (k, v) in rows {
                    obj.insert(k.clone(), Value::String(v.clone()));
                }
                Some(Patch::new().with_op(Op::set(Path::parse(field), Value::Object(obj))))
            }
            BlockContent::ExternalIdBundle { field, ids } => {
                let entries: Vec<Value> = ids
                    .iter()
                    .map(|id| {
                        let mut obj = Map::new();
                        obj.insert("Scheme".into(), Value::String(id.scheme.clone()));
                        obj.insert("Value".into(), Value::String(id.value.clone()));
                        Value::Object(obj)
                    })
                    .collect();
                let mut bundle = Map::new();
                bundle.insert("ID".into(), Value::Array(entries));
                Some(Patch::new().with_op(Op::set(Path::parse(field), Value::Object(bundle))))
            }
        }
    }
}

/// Construction config for a block.
///
/// Exactly one of `module` (a registry lookup) or `template` (an inline
/// body) must be supplied; an inline body wins when both are present.
pub struct BlockConfig {
    /// Module name, resolved against the template registry.
    pub module: Option<String>,
    /// Inline template body, bypassing the registry.
    pub template: Option<String>,
    /// Static variables for template interpolation.
    pub extras: BTreeMap<String, Value>,
    /// Initial children, in render order.
    pub children: Vec<Block>,
    /// Optional extraction processor.
    pub processor: Option<Box<dyn Processor>>,
    /// Content strategy.
    pub content: BlockContent,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            module: None,
            template: None,
            extras: BTreeMap::new(),
            children: Vec::new(),
            processor: None,
            content: BlockContent::Plain,
        }
    }
}

impl BlockConfig {
    /// Config for a registry module.
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            ..Self::default()
        }
    }

    /// Config for an inline template body.
    pub fn inline(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }
}

/// A composable form fragment.
pub struct Block {
    module: Option<String>,
    template: String,
    extras: BTreeMap<String, Value>,
    children: Vec<Block>,
    processor: Option<Box<dyn Processor>>,
    content: BlockContent,
    load_callbacks: Vec<LoadCallback>,
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("module", &self.module)
            .field("children", &self.children.len())
            .field("has_processor", &self.processor.is_some())
            .field("content", &self.content)
            .finish()
    }
}

impl Block {
    /// Construct a block, resolving its template against the registry.
    ///
    /// Fails fast: a config with neither module nor inline template, or a
    /// module the registry does not know, is rejected here rather than at
    /// render time.
    pub fn new(config: BlockConfig, registry: &TemplateRegistry) -> FormResult<Self> {
        let template = match (&config.template, &config.module) {
            (Some(inline), _) => inline.clone(),
            (None, Some(module)) => registry.get(module)?.to_owned(),
            (None, None) => return Err(FormError::MissingTemplate),
        };
        Ok(Self {
            module: config.module,
            template,
            extras: config.extras,
            children: config.children,
            processor: config.processor,
            content: config.content,
            load_callbacks: Vec::new(),
        })
    }

    /// The module name, if this block was built from the registry.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// This block's children, in render order.
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Mutable access to the children.
    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.children
    }

    /// Append a child block.
    pub fn add_child(&mut self, child: Block) {
        self.children.push(child);
    }

    /// The content strategy.
    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    /// Mutable access to the content strategy (row edits, reselection).
    pub fn content_mut(&mut self) -> &mut BlockContent {
        &mut self.content
    }

    /// Register a callback for this block's `form:load` notification.
    pub fn on_load(&mut self, callback: impl Fn(&LoadEvent<'_>) + 'static) {
        self.load_callbacks.push(Box::new(callback));
    }

    /// Render this block and its children to one contiguous fragment.
    ///
    /// Pure function of the template, extras, and child markup.
    pub fn render(&self) -> String {
        let children: String = self.children.iter().map(Block::render).collect();
        let mut vars = self.extras.clone();
        self.content.render_vars(&mut vars);
        expand(&self.template, &vars, &children)
    }

    /// Fire load callbacks depth-first, children before this block.
    pub(crate) fn notify_load(&self, markup: &str) {
        for child in &self.children {
            child.notify_load(markup);
        }
        let event = LoadEvent {
            module: self.module.as_deref().unwrap_or(""),
            markup,
        };
        for callback in &self.load_callbacks {
            callback(&event);
        }
        tracing::trace!(module = event.module, "block load notified");
    }

    /// The content contribution for this block, if any.
    pub(crate) fn content_contribution(&self, fields: &FieldState) -> Option<Patch> {
        self.content.contribution(fields)
    }

    /// Run this block's processor, if any, collecting its patch.
    pub(crate) fn run_processor(&self, doc: &Value) -> FormResult<Patch> {
        match &self.processor {
            Some(processor) => {
                let mut writer = DocWriter::new();
                processor.process(doc, &mut writer)?;
                Ok(writer.build())
            }
            None => Ok(Patch::new()),
        }
    }

    /// Visit the tree depth-first, children before their parent.
    pub(crate) fn for_each_post_order(
        &self,
        f: &mut impl FnMut(&Block) -> FormResult<()>,
    ) -> FormResult<()> {
        for child in &self.children {
            child.for_each_post_order(f)?;
        }
        f(self)
    }
}

//! Headless form data-binding engine.
//!
//! `formwork` builds nested form fragments from an explicit template table
//! and binds them bidirectionally to a JSON document through dotted, typed
//! field paths. It is the binding core of a reference-data admin UI: the
//! surrounding chrome (search grids, toolbars, dialogs, routing) consumes
//! this crate's contract and lives elsewhere.
//!
//! # Core concepts
//!
//! - **[`TemplateRegistry`]**: the module table, built at startup and passed
//!   by reference into form construction
//! - **[`Block`]**: one composable form fragment — template, extras,
//!   children, optional extraction [`Processor`], content strategy
//! - **[`Form`]**: the root block plus orchestration — `dom()` renders and
//!   fires the load cascade, `compile()` extracts without side effects,
//!   `submit()` extracts and delivers a [`SubmitOutcome`]
//! - **[`FieldState`]**: the live input values a view layer mutates in place
//!   of a browser DOM
//! - **[`ResourceClient`]**: the REST collaborator boundary the save path
//!   consumes
//!
//! # Quick start
//!
//! ```
//! use formwork::{Form, FormConfig, TemplateRegistry};
//! use formwork_state::{TypeMap, TypeTag};
//! use serde_json::json;
//!
//! let mut registry = TemplateRegistry::new();
//! registry.register("convention_forms.deposit", "<form>{{children}}</form>").unwrap();
//!
//! let mut type_map = TypeMap::new();
//! type_map.insert("settlementDays", TypeTag::Byte).unwrap();
//!
//! let mut form = Form::new(
//!     FormConfig {
//!         selector: "#OG-details".into(),
//!         type_map,
//!         ..FormConfig::new("convention_forms.deposit", json!({"settlementDays": "2"}))
//!     },
//!     &registry,
//! )
//! .unwrap();
//!
//! let markup = form.dom().unwrap();
//! assert!(markup.starts_with("<form>"));
//! assert_eq!(form.compile().unwrap()["settlementDays"], 2);
//! ```

mod block;
mod error;
mod fields;
mod form;
mod rest;
mod template;

pub use block::{Block, BlockConfig, BlockContent, IdEntry, LoadEvent, Processor};
pub use error::{FormError, FormResult};
pub use fields::FieldState;
pub use form::{
    require_field, Form, FormConfig, SaveResult, SubmitData, SubmitFailure, SubmitOutcome,
};
pub use rest::{ResourceClient, ResourceOutcome, ResourceRequest};
pub use template::{expand, TemplateRegistry, CHILDREN_SLOT};

//! Form lifecycle: render, load cascade, round-trip compile, dirty tracking.

use formwork::{Block, BlockConfig, Form, FormConfig, FormError, TemplateRegistry};
use formwork_state::{TypeMap, TypeTag};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn registry() -> TemplateRegistry {
    let mut r = TemplateRegistry::new();
    r.register("form.shell", "<form id=\"{{id}}\">{{children}}</form>")
        .unwrap();
    r.register("form.field", "<input name=\"{{name}}\">").unwrap();
    r
}

fn field_block(r: &TemplateRegistry, name: &str) -> Block {
    let mut config = BlockConfig::module("form.field");
    config.extras.insert("name".into(), json!(name));
    Block::new(config, r).unwrap()
}

#[test]
fn test_dom_renders_full_tree_into_one_fragment() {
    let r = registry();
    let mut form = Form::new(
        FormConfig {
            selector: "#OG-details".into(),
            children: vec![field_block(&r, "name"), field_block(&r, "settlementDays")],
            extras: [("id".to_string(), json!("deposit"))].into_iter().collect(),
            ..FormConfig::new("form.shell", json!({}))
        },
        &r,
    )
    .unwrap();

    let markup = form.dom().unwrap();
    assert_eq!(
        markup,
        "<form id=\"deposit\"><input name=\"name\"><input name=\"settlementDays\"></form>"
    );
    assert_eq!(form.selector(), "#OG-details");
    assert!(form.is_loaded());
}

#[test]
fn test_load_cascade_descendants_before_root_with_full_markup() {
    let r = registry();
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut grandchild = field_block(&r, "inner");
    let seen = order.clone();
    grandchild.on_load(move |event| {
        // Markup contributed by every block is already present.
        assert!(event.markup.contains("<input name=\"inner\">"));
        seen.borrow_mut().push("grandchild");
    });

    let mut child = Block::new(
        BlockConfig {
            children: vec![grandchild],
            ..BlockConfig::module("form.shell")
        },
        &r,
    )
    .unwrap();
    let seen = order.clone();
    child.on_load(move |_| seen.borrow_mut().push("child"));

    let mut form = Form::new(
        FormConfig {
            children: vec![child],
            ..FormConfig::new("form.shell", json!({}))
        },
        &r,
    )
    .unwrap();
    let seen = order.clone();
    form.on_load(move |_| seen.borrow_mut().push("root"));

    form.dom().unwrap();
    assert_eq!(*order.borrow(), ["grandchild", "child", "root"]);
}

#[test]
fn test_round_trip_projects_through_declared_coercions() {
    let r = registry();
    let type_map = TypeMap::from_entries([
        ("settlementDays", TypeTag::Byte),
        ("isEOM", TypeTag::Boolean),
    ])
    .unwrap();
    let mut form = Form::new(
        FormConfig {
            type_map,
            ..FormConfig::new(
                "form.shell",
                json!({
                    "name": "EUR deposit",
                    "settlementDays": "5",
                    "isEOM": "true",
                }),
            )
        },
        &r,
    )
    .unwrap();
    form.dom().unwrap();

    let compiled = form.compile().unwrap();
    assert_eq!(
        compiled,
        json!({"name": "EUR deposit", "settlementDays": 5, "isEOM": true})
    );
}

#[test]
fn test_compile_is_idempotent_and_side_effect_free() {
    let r = registry();
    let mut form = Form::new(
        FormConfig::new(
            "form.shell",
            json!({"name": "x", "externalIdBundle": {"ID": [{"Scheme": "ISDA", "Value": "GB"}]}}),
        ),
        &r,
    )
    .unwrap();
    form.dom().unwrap();

    let first = form.compile().unwrap();
    let second = form.compile().unwrap();
    assert_eq!(first, second);
    // The owned document is untouched by compile.
    assert_eq!(form.data()["name"], json!("x"));
}

#[test]
fn test_dirty_tracks_field_edits_structurally() {
    let r = registry();
    let mut form = Form::new(
        FormConfig::new("form.shell", json!({"name": "EUR deposit", "days": "2"})),
        &r,
    )
    .unwrap();
    assert!(!form.is_dirty().unwrap()); // nothing to compare before dom()

    form.dom().unwrap();
    assert!(!form.is_dirty().unwrap());

    form.fields_mut().set_text("days", "3");
    assert!(form.is_dirty().unwrap());

    form.fields_mut().set_text("days", "2");
    assert!(!form.is_dirty().unwrap());
}

#[test]
fn test_block_without_module_or_template_fails_construction() {
    let r = registry();
    let err = Block::new(BlockConfig::default(), &r).unwrap_err();
    assert!(matches!(err, FormError::MissingTemplate));

    let err = Form::new(FormConfig::new("", json!({})), &r).unwrap_err();
    assert!(matches!(err, FormError::MissingTemplate));
}

#[test]
fn test_unknown_module_fails_at_construction_not_render() {
    let r = registry();
    let err = Form::new(FormConfig::new("form.missing", json!({})), &r).unwrap_err();
    assert!(matches!(err, FormError::UnknownModule { .. }));
}

#[test]
fn test_dom_can_rerender_and_reseed() {
    let r = registry();
    let mut form = Form::new(FormConfig::new("form.shell", json!({"name": "a"})), &r).unwrap();
    form.dom().unwrap();
    form.fields_mut().set_text("name", "edited");
    assert!(form.is_dirty().unwrap());

    // Re-rendering reseeds the fields from the owned document.
    form.dom().unwrap();
    assert!(!form.is_dirty().unwrap());
}

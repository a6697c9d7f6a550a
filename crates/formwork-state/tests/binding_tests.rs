//! Cross-module tests: type-map resolution driving coercion, and patches
//! built by a writer applied through the path resolver.

use formwork_state::{
    apply_op, apply_patch, DocWriter, Op, Patch, Path, RawField, StateError, TypeMap, TypeTag,
};
use serde_json::json;

fn type_map() -> TypeMap {
    TypeMap::from_entries([
        ("settlementDays", TypeTag::Byte),
        ("isEOM", TypeTag::Boolean),
        ("externalIdBundle.ID.<INDEX>.deleted", TypeTag::Boolean),
        ("tenors.<EMPTY>", TypeTag::Byte),
    ])
    .unwrap()
}

#[test]
fn test_resolve_holds_for_all_substituted_indices() {
    let map = type_map();
    for i in 0..20usize {
        let path = Path::parse(&format!("externalIdBundle.ID.{i}.deleted"));
        assert_eq!(map.resolve(&path), TypeTag::Boolean);
    }
}

#[test]
fn test_resolve_falls_back_to_string_for_unmatched_paths() {
    let map = type_map();
    for p in ["name", "externalIdBundle.ID.0.Scheme", "a.b.c"] {
        assert_eq!(map.resolve(&Path::parse(p)), TypeTag::Str);
    }
}

#[test]
fn test_appended_element_resolves_through_empty_token() {
    let map = type_map();
    // An element appended after initial population has no <INDEX> entry but
    // matches the <EMPTY> pattern for its final segment.
    assert_eq!(map.resolve(&Path::parse("tenors.3")), TypeTag::Byte);
}

#[test]
fn test_coerced_fields_write_through_resolver() {
    let map = type_map();
    let mut doc = json!({"externalIdBundle": {"ID": [{"Scheme": "ISDA"}]}});

    for (name, raw) in [
        ("settlementDays", RawField::text("5")),
        ("isEOM", RawField::Checkbox(true)),
        ("externalIdBundle.ID.0.deleted", RawField::text("false")),
    ] {
        let path = Path::parse(name);
        let value = map.coerce(&path, &raw).unwrap();
        apply_op(&mut doc, &Op::set(path, value)).unwrap();
    }

    assert_eq!(doc["settlementDays"], json!(5));
    assert_eq!(doc["isEOM"], json!(true));
    assert_eq!(doc["externalIdBundle"]["ID"][0]["deleted"], json!(false));
}

#[test]
fn test_writer_patch_builds_nested_structure_from_nothing() {
    let mut w = DocWriter::new();
    w.set(Path::parse("name"), json!("EUR deposit"));
    w.append(
        Path::parse("externalIdBundle.ID"),
        json!({"Scheme": "ISDA", "Value": "GB"}),
    );
    w.merge_object(Path::parse("attributes"), json!({"DESK": "FX"}));

    let out = apply_patch(&json!({}), &w.build()).unwrap();
    assert_eq!(
        out,
        json!({
            "name": "EUR deposit",
            "externalIdBundle": {"ID": [{"Scheme": "ISDA", "Value": "GB"}]},
            "attributes": {"DESK": "FX"},
        })
    );
}

#[test]
fn test_strict_coercion_rejects_bad_numeric_input() {
    let map = type_map();
    let path = Path::parse("settlementDays");
    for bad in ["", "five", "2.5", "0x10"] {
        let err = map.coerce(&path, &RawField::text(bad)).unwrap_err();
        assert!(
            matches!(err, StateError::CoercionFailed { .. }),
            "expected coercion failure for {bad:?}"
        );
    }
}

#[test]
fn test_failed_patch_leaves_prior_ops_applied_in_place() {
    let mut doc = json!({"stale": true, "ID": "not-an-array"});
    let patch = Patch::new()
        .with_op(Op::delete(Path::parse("stale")))
        .with_op(Op::append(Path::parse("ID"), json!(1)));

    let mut failed_at = None;
    for (i, op) in patch.iter().enumerate() {
        if let Err(err) = apply_op(&mut doc, op) {
            failed_at = Some((i, err));
            break;
        }
    }

    let (index, err) = failed_at.expect("second op must fail");
    assert_eq!(index, 1);
    assert!(matches!(err, StateError::TypeMismatch { .. }));
    // The first op's effect is still present.
    assert_eq!(doc.get("stale"), None);
}

//! Tests for component property schemas.

use exproj_foundation::ErrorKind;
use exproj_model::{PropertySchema, PropertyType};
use serde_json::json;

fn health_schema() -> PropertySchema {
    let mut schema = PropertySchema::new();
    schema.add(&[], "health", PropertyType::Number).unwrap();
    schema
}

// =============================================================================
// Worked example
// =============================================================================

#[test]
fn add_nested_then_retype_discards_subtree() {
    let mut schema = health_schema();
    schema.add(&[], "stats", PropertyType::Object).unwrap();
    schema.add(&["stats"], "armor", PropertyType::Number).unwrap();
    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "health": {"type": "number"},
            "stats": {"type": "object", "nested": {"armor": {"type": "number"}}}
        })
    );

    let dropped = schema.retype(&[], "stats", PropertyType::String).unwrap();
    assert_eq!(dropped.unwrap().len(), 1);
    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "health": {"type": "number"},
            "stats": {"type": "string"}
        })
    );
}

// =============================================================================
// Sibling uniqueness
// =============================================================================

#[test]
fn duplicate_sibling_is_rejected_at_any_depth() {
    let mut schema = health_schema();
    let err = schema.add(&[], "health", PropertyType::String).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateProperty { .. }));

    schema.add(&[], "stats", PropertyType::Object).unwrap();
    schema.add(&["stats"], "health", PropertyType::Number).unwrap();
    assert!(schema.add(&["stats"], "health", PropertyType::Number).is_err());
}

#[test]
fn rename_onto_sibling_is_rejected() {
    let mut schema = health_schema();
    schema.add(&[], "mana", PropertyType::Number).unwrap();
    assert!(schema.rename(&[], "mana", "health").unwrap_err().is_invariant_violation());
    assert!(schema.get("mana").is_some());
}

#[test]
fn rename_keeps_position_and_children() {
    let mut schema = health_schema();
    schema.add(&[], "stats", PropertyType::Object).unwrap();
    schema.add(&["stats"], "armor", PropertyType::Number).unwrap();
    schema.add(&[], "speed", PropertyType::Number).unwrap();

    schema.rename(&[], "stats", "attributes").unwrap();
    let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["health", "attributes", "speed"]);
    assert!(schema.at(&["attributes"]).unwrap().get("armor").is_some());
}

// =============================================================================
// Paths and expansion
// =============================================================================

#[test]
fn unexpanded_object_is_materialized_on_add() {
    let json = json!({"stats": {"type": "object"}});
    let mut schema: PropertySchema = serde_json::from_value(json).unwrap();
    assert!(schema.at(&["stats"]).is_none());

    schema.add(&["stats"], "armor", PropertyType::Number).unwrap();
    assert_eq!(schema.at(&["stats"]).unwrap().len(), 1);
}

#[test]
fn expand_only_applies_to_objects() {
    let mut schema = health_schema();
    let err = schema.expand(&["health"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotAnObject(_)));
    assert!(schema.expand(&["missing"]).is_err());
    schema.expand(&[]).unwrap();
}

#[test]
fn path_through_scalar_is_rejected() {
    let mut schema = health_schema();
    assert!(schema.add(&["health"], "x", PropertyType::Number).is_err());
    assert!(schema.add(&["nowhere"], "x", PropertyType::Number).is_err());
}

#[test]
fn delete_removes_subtree() {
    let mut schema = health_schema();
    schema.add(&[], "stats", PropertyType::Object).unwrap();
    schema.add(&["stats"], "armor", PropertyType::Number).unwrap();

    let removed = schema.delete(&[], "stats").unwrap();
    assert_eq!(removed.ty, PropertyType::Object);
    assert_eq!(removed.nested.unwrap().len(), 1);
    assert!(schema.get("stats").is_none());
    assert!(schema.delete(&[], "stats").is_err());
}

#[test]
fn retype_to_object_keeps_children_and_scalar_has_none() {
    let mut schema = health_schema();
    assert!(schema.retype(&[], "health", PropertyType::Object).unwrap().is_none());
    schema.add(&["health"], "max", PropertyType::Number).unwrap();
    assert!(schema.retype(&[], "health", PropertyType::Object).unwrap().is_none());
    assert_eq!(schema.at(&["health"]).unwrap().len(), 1);
}

#[test]
fn type_names_parse_case_insensitively() {
    assert_eq!(PropertyType::parse("number").unwrap(), PropertyType::Number);
    assert_eq!(PropertyType::parse("Boolean").unwrap(), PropertyType::Boolean);
    assert!(PropertyType::parse("integer").is_err());
}

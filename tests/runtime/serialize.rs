//! Tests for the project file codec.

use std::fs;

use exproj_foundation::{EntityKind, ErrorKind};
use exproj_model::ProjectDocument;
use exproj_runtime::serialize::{from_str, load_from_file, save_to_file, to_string};
use tempfile::TempDir;

// =============================================================================
// Text
// =============================================================================

#[test]
fn pretty_output_is_indented_json() {
    let text = to_string(&ProjectDocument::starter("demo"), true).unwrap();
    assert!(text.starts_with("{\n"));
    assert!(text.contains("\"type\": \"PROJECT\""));
    assert!(text.contains("\"lastOpened\""));
}

#[test]
fn compact_and_pretty_parse_to_the_same_document() {
    let doc = ProjectDocument::starter("demo");
    let pretty = from_str(&to_string(&doc, true).unwrap()).unwrap();
    let compact = from_str(&to_string(&doc, false).unwrap()).unwrap();
    assert_eq!(pretty, doc);
    assert_eq!(compact, doc);
}

#[test]
fn malformed_text_is_a_parse_error() {
    let err = from_str("{ \"name\": ").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse(_)));
}

#[test]
fn duplicate_ids_in_file_are_rejected() {
    let mut doc = ProjectDocument::starter("demo");
    let actor = doc.actors[0].clone();
    let mut json = serde_json::to_value(&doc).unwrap();
    json["actors"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::to_value(&actor).unwrap());
    assert!(from_str(&json.to_string()).unwrap_err().is_invariant_violation());

    doc.create(EntityKind::Level, "ok").unwrap();
    assert!(from_str(&to_string(&doc, false).unwrap()).is_ok());
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn save_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deeper/game.exProj");
    save_to_file(&ProjectDocument::starter("demo"), &path, true).unwrap();
    assert!(path.is_file());
    assert_eq!(load_from_file(&path).unwrap().unwrap().name, "demo");
}

#[test]
fn missing_file_loads_as_none() {
    let dir = TempDir::new().unwrap();
    assert!(load_from_file(dir.path().join("absent.exProj")).unwrap().is_none());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.exProj");
    fs::write(&path, "not json").unwrap();
    let err = load_from_file(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse(_)));
}

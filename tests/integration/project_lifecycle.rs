//! Full project lifecycle through the service and the project file.

use std::fs;
use std::path::Path;

use exproj_foundation::{EntityKind, Identifier};
use exproj_model::{BuiltinComponent, ComponentRef, NodeType, PartialDocument, PropertyType};
use exproj_runtime::{
    OrderEdit, ProjectHandle, ProjectService, ProjectStore, SchemaEdit, ScriptedChooser,
};
use serde_json::{Value, json};
use tempfile::TempDir;

fn spawn_service() -> ProjectService {
    ProjectService::spawn(ProjectStore::default(), ScriptedChooser::new()).unwrap()
}

fn read_file(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn add(path: &[&str], name: &str, ty: PropertyType) -> SchemaEdit {
    SchemaEdit::Add {
        path: path.iter().map(|s| (*s).to_string()).collect(),
        name: name.to_string(),
        ty,
    }
}

/// Builds a small game: a level placed in the root scene, a health component
/// on the default actor, and a timer running a script.
fn build_game(handle: &ProjectHandle) -> (Identifier, Identifier, Identifier, Identifier) {
    let doc = handle.get().unwrap();
    let scene = doc.scenes[0].id;
    let actor = doc.actors[0].id;

    let level = handle.create(EntityKind::Level, "world1").unwrap();
    handle.edit_scene_order(scene, OrderEdit::Append(level)).unwrap();
    handle.edit_scene_order(scene, OrderEdit::Append(actor)).unwrap();
    handle.edit_scene_order(scene, OrderEdit::MoveUp(1)).unwrap();

    let health = handle.create(EntityKind::Component, "health").unwrap();
    handle
        .edit_schema(health, add(&[], "health", PropertyType::Number))
        .unwrap();
    handle
        .edit_schema(health, add(&[], "stats", PropertyType::Object))
        .unwrap();
    handle
        .edit_schema(health, add(&["stats"], "armor", PropertyType::Number))
        .unwrap();
    handle
        .attach_component(actor, ComponentRef::Custom(health))
        .unwrap();
    handle
        .attach_component(actor, ComponentRef::Builtin(BuiltinComponent::Body))
        .unwrap();

    let script = handle.create(EntityKind::Script, "spawner").unwrap();
    handle.set_script_source(script, "spawn()").unwrap();
    let timer = handle.create(EntityKind::Timer, "wave").unwrap();
    handle.configure_timer(timer, 3000.0, true, Some(script)).unwrap();

    (level, health, script, timer)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn create_edit_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("games").join("Space.exProj");

    let service = spawn_service();
    let handle = service.handle();
    handle.new_project(path.clone()).unwrap();
    let (level, health, script, timer) = build_game(&handle);
    let written = handle.get().unwrap();
    service.shutdown();

    let service = spawn_service();
    let handle = service.handle();
    handle.open_project(path).unwrap();
    let reopened = handle.get().unwrap();
    assert_eq!(reopened, written);

    for id in [level, health, script, timer] {
        assert!(handle.find_by_id(id).unwrap().is_some());
    }
    let actor = &reopened.actors[0];
    assert_eq!(reopened.scenes[0].data.elements[0].id, actor.id);
    assert_eq!(reopened.scenes[0].data.elements[1].id, level);
}

#[test]
fn file_on_disk_matches_project_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Space.exProj");

    let service = spawn_service();
    let handle = service.handle();
    handle.new_project(path.clone()).unwrap();
    let (_, health, script, timer) = build_game(&handle);

    let file = read_file(&path);
    assert_eq!(file["type"], "PROJECT");
    assert_eq!(file["name"], "myProject");
    assert_eq!(file["camera"][0]["name"], "DefaultCamera");
    assert_eq!(
        file["components"][0]["properties"],
        json!({
            "health": {"type": "number"},
            "stats": {"type": "object", "nested": {"armor": {"type": "number"}}}
        })
    );
    assert_eq!(
        file["actors"][0]["components"],
        json!([health.to_string(), "Body"])
    );
    assert_eq!(file["timers"][0]["id"], timer.to_string());
    assert_eq!(file["timers"][0]["script"], script.to_string());
    assert_eq!(file["scripts"][0]["code"], "spawn()");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"name\": \"myProject\""));
}

#[test]
fn retype_and_delete_are_written_through() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Space.exProj");

    let service = spawn_service();
    let handle = service.handle();
    handle.new_project(path.clone()).unwrap();
    let (level, health, script, _) = build_game(&handle);

    let discarded = handle
        .edit_schema(
            health,
            SchemaEdit::Retype {
                path: vec![],
                name: "stats".to_string(),
                ty: PropertyType::String,
            },
        )
        .unwrap();
    assert!(discarded.unwrap().get("armor").is_some());
    assert_eq!(
        read_file(&path)["components"][0]["properties"],
        json!({"health": {"type": "number"}, "stats": {"type": "string"}})
    );

    assert_eq!(handle.delete(health).unwrap().detached, 1);
    assert_eq!(handle.delete(script).unwrap().detached, 1);
    assert_eq!(handle.delete(level).unwrap().detached, 1);

    let file = read_file(&path);
    assert_eq!(file["actors"][0]["components"], json!(["Body"]));
    assert!(file["timers"][0].get("script").is_none());
    assert_eq!(file["scenes"][0]["elements"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Tree
// =============================================================================

#[test]
fn tree_tracks_the_open_project() {
    let dir = TempDir::new().unwrap();
    let service = spawn_service();
    let handle = service.handle();
    handle.new_project(dir.path().join("Space.exProj")).unwrap();

    let first = handle.project_tree().unwrap();
    assert_eq!(first.children().len(), 9);
    assert_eq!(first, handle.project_tree().unwrap());

    build_game(&handle);
    let tree = handle.project_tree().unwrap();
    assert_eq!(tree.children().len(), 11);
    let timers = tree.section("timers").unwrap();
    assert_eq!(timers.children()[0].title, "Wave");
    assert_eq!(timers.children()[0].node_type, NodeType::Element);

    handle
        .update(PartialDocument::new().with_name("Renamed"))
        .unwrap();
    assert_eq!(handle.project_tree().unwrap().title, "Renamed");
}

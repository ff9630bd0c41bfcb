//! Tests for the project service thread and its handle.

use std::path::PathBuf;
use std::thread;

use exproj_foundation::{EntityKind, ErrorKind, Identifier};
use exproj_model::{BuiltinComponent, ComponentRef, PartialDocument};
use exproj_runtime::{OrderEdit, ProjectService, ProjectStore, ScriptedChooser};
use tempfile::TempDir;

fn spawn() -> ProjectService {
    ProjectService::spawn(ProjectStore::default(), ScriptedChooser::new()).unwrap()
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn project_selected_loads_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Game.exProj");
    {
        let service = spawn();
        let handle = service.handle();
        handle.new_project(path.clone()).unwrap();
        handle.update(PartialDocument::new().with_name("Saved")).unwrap();
        service.shutdown();
    }

    let service = spawn();
    let handle = service.handle();
    assert_eq!(handle.get().unwrap().name, "Untitled");
    handle.open_project(path).unwrap();
    assert_eq!(handle.get().unwrap().name, "Saved");
}

#[test]
fn project_selected_without_file_keeps_document() {
    let dir = TempDir::new().unwrap();
    let service = spawn();
    let handle = service.handle();
    handle.open_project(dir.path().join("Missing.exProj")).unwrap();

    let doc = handle.get().unwrap();
    assert_eq!(doc.name, "Untitled");
    assert_eq!(doc.entity_count(), 0);

    // the path is configured now, so saving creates the file
    handle.save().unwrap();
    assert!(dir.path().join("Missing.exProj").is_file());
}

#[test]
fn requests_before_any_project_fail_to_persist() {
    let service = spawn();
    let handle = service.handle();
    let err = handle.create(EntityKind::Actor, "Hero").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoProjectPath));
    assert!(handle.get().is_ok());
}

// =============================================================================
// Requests
// =============================================================================

#[test]
fn edits_persist_through_the_handle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Game.exProj");
    let service = spawn();
    let handle = service.handle();
    handle.new_project(path).unwrap();

    let doc = handle.get().unwrap();
    let scene = doc.scenes[0].id;
    let actor = doc.actors[0].id;
    handle
        .attach_component(actor, ComponentRef::Builtin(BuiltinComponent::Transform))
        .unwrap();
    handle.edit_scene_order(scene, OrderEdit::Append(actor)).unwrap();

    let reloaded = handle.load().unwrap();
    assert_eq!(reloaded.scenes[0].data.elements.len(), 1);
    assert_eq!(
        handle.detach_component(actor, 0).unwrap(),
        ComponentRef::Builtin(BuiltinComponent::Transform)
    );

    let deletion = handle.delete(actor).unwrap();
    assert_eq!(deletion.detached, 1);
    assert!(handle.find_by_id(actor).unwrap().is_none());
}

#[test]
fn handles_from_many_threads_share_one_document() {
    let dir = TempDir::new().unwrap();
    let service = spawn();
    let handle = service.handle();
    handle.new_project(dir.path().join("Game.exProj")).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let handle = handle.clone();
            thread::spawn(move || {
                for j in 0..5 {
                    handle.create(EntityKind::Level, format!("level-{i}-{j}")).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(handle.get().unwrap().levels.len(), 20);
    assert_eq!(handle.load().unwrap().levels.len(), 20);
}

#[test]
fn chooser_is_consulted_for_paths() {
    let chooser = ScriptedChooser::new()
        .with_existing(Some(PathBuf::from("Old.exProj")))
        .with_new(None);
    let service = ProjectService::spawn(ProjectStore::default(), chooser).unwrap();
    let handle = service.handle();
    assert_eq!(
        handle.choose_existing_project_path().unwrap(),
        Some(PathBuf::from("Old.exProj"))
    );
    assert_eq!(handle.choose_new_project_path().unwrap(), None);
}

#[test]
fn handle_reports_closed_service() {
    let service = spawn();
    let handle = service.handle();
    service.shutdown();
    assert!(matches!(handle.get().unwrap_err().kind, ErrorKind::ServiceClosed));
}

#[test]
fn dropping_the_service_drains_queue_then_closes_handles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Game.exProj");
    let service = spawn();
    let handle = service.handle();
    handle.new_project(path.clone()).unwrap();
    drop(service);

    assert!(path.is_file());
    assert!(matches!(handle.save().unwrap_err().kind, ErrorKind::ServiceClosed));
    let other = handle.clone();
    assert!(matches!(
        other.find_by_id(Identifier::generate()).unwrap_err().kind,
        ErrorKind::ServiceClosed
    ));
}

//! Tests for the project document aggregate.

use exproj_foundation::{EntityKind, ErrorKind, Identifier};
use exproj_model::{
    Actor, BuiltinComponent, Component, ComponentRef, Entity, EntityRecord, LevelData,
    PartialDocument, ProjectDocument, Scene, TimerData,
};

// =============================================================================
// Construction
// =============================================================================

#[test]
fn default_document_is_empty_and_untitled() {
    let doc = ProjectDocument::default();
    assert_eq!(doc.name, "Untitled");
    assert_eq!(doc.entity_count(), 0);
}

#[test]
fn starter_document_has_root_scene_actor_and_camera() {
    let doc = ProjectDocument::starter("myProject");
    assert_eq!(doc.name, "myProject");
    assert_eq!(doc.entity_count(), 3);
    assert_eq!(doc.scenes[0].name, "Root");
    assert_eq!(doc.actors[0].name, "DefaultActor");
    assert_eq!(doc.cameras[0].name, "DefaultCamera");
    assert!(doc.validate().is_ok());
}

// =============================================================================
// Cross-collection lookup
// =============================================================================

#[test]
fn every_kind_is_found_by_id() {
    let mut doc = ProjectDocument::empty("all");
    let ids: Vec<(EntityKind, Identifier)> = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind, doc.create(kind, "thing").unwrap()))
        .collect();

    for (kind, id) in ids {
        let record = doc.find_by_id(id).unwrap();
        assert_eq!(record.kind(), kind);
        assert_eq!(record.id(), id);
        assert_eq!(doc.locate(id).map(|(k, _)| k), Some(kind));
    }
}

#[test]
fn unknown_id_is_absent_not_an_error() {
    let doc = ProjectDocument::starter("p");
    assert!(doc.find_by_id(Identifier::generate()).is_none());
}

#[test]
fn typed_get_checks_kind() {
    let mut doc = ProjectDocument::empty("p");
    let level = doc.create(EntityKind::Level, "World1").unwrap();
    assert_eq!(doc.get::<LevelData>(level).unwrap().name, "World1");
    assert!(doc.get::<TimerData>(level).is_none());

    let err = doc.get_mut::<TimerData>(level).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::WrongKind {
            expected: EntityKind::Timer,
            actual: EntityKind::Level,
            ..
        }
    ));
}

// =============================================================================
// Identifier uniqueness
// =============================================================================

#[test]
fn same_id_in_two_collections_is_rejected() {
    let mut doc = ProjectDocument::empty("p");
    let id = doc.insert(Scene::new("Main")).unwrap();
    let err = doc.insert(Actor::with_id(id, "Hero")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateIdentifier(dup) if dup == id));
    assert_eq!(doc.entity_count(), 1);
}

#[test]
fn merge_that_duplicates_ids_is_rejected() {
    let doc = ProjectDocument::starter("p");
    let scene_id = doc.scenes[0].id;
    let partial = PartialDocument::new()
        .with_actors(vec![Actor::with_id(scene_id, "Clash")].into_iter().collect());
    assert!(doc.merged(partial).unwrap_err().is_invariant_violation());
}

#[test]
fn mistagged_entity_is_rejected_on_insert() {
    let mut doc = ProjectDocument::empty("p");
    let mut actor = Actor::new("Hero");
    actor.kind = EntityKind::Camera;
    assert!(doc.insert(actor).is_err());
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn rename_keeps_name_verbatim() {
    let mut doc = ProjectDocument::starter("p");
    let actor = doc.actors[0].id;
    doc.rename(actor, "  player one ").unwrap();
    assert_eq!(doc.find_by_id(actor).unwrap().name(), "  player one ");
    assert!(doc.rename(Identifier::generate(), "x").is_err());
}

#[test]
fn delete_drops_references_everywhere() {
    let mut doc = ProjectDocument::starter("p");
    let scene = doc.scenes[0].id;
    let actor = doc.actors[0].id;
    let component = doc.create(EntityKind::Component, "health").unwrap();
    let script = doc.create(EntityKind::Script, "tick").unwrap();
    let timer = doc.create(EntityKind::Timer, "clock").unwrap();

    doc.place_in_scene(scene, actor).unwrap();
    doc.attach_component(actor, ComponentRef::Custom(component))
        .unwrap();
    doc.attach_component(actor, ComponentRef::Builtin(BuiltinComponent::Motion))
        .unwrap();
    doc.configure_timer(timer, 250.0, true, Some(script)).unwrap();

    let deletion = doc.delete(component).unwrap();
    assert_eq!(deletion.record.kind(), EntityKind::Component);
    assert_eq!(deletion.detached, 1);
    assert_eq!(
        doc.actors[0].data.components,
        vec![ComponentRef::Builtin(BuiltinComponent::Motion)]
    );

    assert_eq!(doc.delete(script).unwrap().detached, 1);
    assert_eq!(doc.get::<TimerData>(timer).unwrap().data.script, None);

    assert_eq!(doc.delete(actor).unwrap().detached, 1);
    assert!(doc.scenes[0].data.elements.is_empty());
    assert!(doc.find_by_id(actor).is_none());
}

#[test]
fn custom_attachment_must_name_a_component() {
    let mut doc = ProjectDocument::starter("p");
    let actor = doc.actors[0].id;
    let camera = doc.cameras[0].id;
    assert!(doc.attach_component(actor, ComponentRef::Custom(camera)).is_err());
    assert!(doc.detach_component(actor, 0).is_err());
}

#[test]
fn timer_script_must_be_a_script() {
    let mut doc = ProjectDocument::empty("p");
    let timer = doc.create(EntityKind::Timer, "clock").unwrap();
    let level = doc.create(EntityKind::Level, "World").unwrap();
    assert!(doc.configure_timer(timer, 1.0, false, Some(level)).is_err());
    doc.configure_timer(timer, 1.0, false, None).unwrap();
    assert!((doc.get::<TimerData>(timer).unwrap().data.interval - 1.0).abs() < f64::EPSILON);
}

// =============================================================================
// Partial merge
// =============================================================================

#[test]
fn merge_replaces_only_present_fields() {
    let doc = ProjectDocument::starter("p");
    let components: im::Vector<Component> = vec![Component::new("health")].into_iter().collect();
    let merged = doc
        .merged(PartialDocument::new().with_name("X").with_components(components))
        .unwrap();

    assert_eq!(merged.name, "X");
    assert_eq!(merged.components.len(), 1);
    assert_eq!(merged.scenes, doc.scenes);
    assert_eq!(merged.actors, doc.actors);
    assert_eq!(merged.cameras, doc.cameras);
    assert_eq!(merged.last_opened, doc.last_opened);
}

#[test]
fn partial_document_parses_camel_case_keys() {
    let partial: PartialDocument =
        serde_json::from_str(r#"{"name": "X", "engineConfig": {"fps": 30}, "camera": []}"#)
            .unwrap();
    assert_eq!(partial.name.as_deref(), Some("X"));
    assert_eq!(partial.engine_config.unwrap().fps, 30);
    assert_eq!(partial.cameras.map(|c| c.len()), Some(0));
    assert!(partial.scenes.is_none());
}

// =============================================================================
// File shape
// =============================================================================

#[test]
fn document_json_uses_project_file_field_names() {
    let doc = ProjectDocument::starter("demo");
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["type"], "PROJECT");
    assert_eq!(json["name"], "demo");
    assert!(json["lastOpened"].is_i64());
    assert_eq!(json["camera"][0]["type"], "CAMERA");
    assert_eq!(json["camera"][0]["name"], "DefaultCamera");
    for key in [
        "scenes",
        "actors",
        "screenElements",
        "levels",
        "components",
        "systems",
        "postProcessors",
        "particles",
        "scripts",
        "timers",
    ] {
        assert!(json[key].is_array(), "missing {key}");
    }
    assert_eq!(json["engineConfig"]["size"]["width"], 800);
}

#[test]
fn file_without_timers_or_scripts_still_loads() {
    let json = r#"{
        "type": "PROJECT",
        "name": "old",
        "lastOpened": 1700000000000,
        "scenes": [],
        "actors": [],
        "screenElements": [],
        "levels": [],
        "camera": [],
        "components": [],
        "systems": [],
        "postProcessors": [],
        "particles": [],
        "engineConfig": {}
    }"#;
    let doc: ProjectDocument = serde_json::from_str(json).unwrap();
    assert_eq!(doc.name, "old");
    assert!(doc.timers.is_empty());
    assert!(doc.scripts.is_empty());
    assert_eq!(doc.engine_config.fps, 60);
}

#[test]
fn lookup_record_serializes_like_its_entity() {
    let mut doc = ProjectDocument::empty("p");
    let entity = Entity::<LevelData>::new("World1");
    let id = doc.insert(entity.clone()).unwrap();
    let record = doc.find_by_id(id).unwrap();
    assert_eq!(record, EntityRecord::from(entity.clone()));
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        serde_json::to_value(&entity).unwrap()
    );
}

//! Tests for shell command parsing and execution.

use exproj_foundation::{EntityKind, Identifier};
use exproj_runtime::{
    Command, ProjectService, ProjectStore, ReaderEditor, ScriptedChooser, Shell, parse_command,
};
use tempfile::TempDir;

fn shell_in(dir: &TempDir) -> (ProjectService, Shell<ReaderEditor<&'static [u8]>>) {
    let service = ProjectService::spawn(ProjectStore::default(), ScriptedChooser::new()).unwrap();
    let handle = service.handle();
    handle.new_project(dir.path().join("Game.exProj")).unwrap();
    let shell = Shell::with_editor(ReaderEditor::new(&b""[..]), handle).without_banner();
    (service, shell)
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn parses_create_with_multi_word_name() {
    match parse_command("create level Boss Arena").unwrap() {
        Command::Create(kind, name) => {
            assert_eq!(kind, EntityKind::Level);
            assert_eq!(name, "Boss Arena");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_update_json() {
    match parse_command(r#"update {"name": "X"}"#).unwrap() {
        Command::Update(partial) => assert_eq!(partial.name.as_deref(), Some("X")),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_unknown_and_incomplete_commands() {
    assert!(parse_command("explode").is_err());
    assert!(parse_command("find").is_err());
    assert!(parse_command("find nope").is_err());
    assert!(parse_command("create level").is_err());
    assert!(parse_command(&format!("prop add {} . hp integer", Identifier::generate())).is_err());
}

// =============================================================================
// Execution
// =============================================================================

#[test]
fn create_then_tree_shows_entity() {
    let dir = TempDir::new().unwrap();
    let (_service, mut shell) = shell_in(&dir);

    let out = shell
        .execute(parse_command("create level world1").unwrap())
        .unwrap();
    assert!(out.starts_with("created LEVEL "));

    let tree = shell.execute(Command::Tree).unwrap();
    assert!(tree.starts_with("myProject\n"));
    assert!(tree.contains("  Levels\n"));
    assert!(tree.contains("    World1 ["));
}

#[test]
fn retype_warns_about_lost_properties() {
    let dir = TempDir::new().unwrap();
    let (_service, mut shell) = shell_in(&dir);
    let out = shell
        .execute(parse_command("create component stats").unwrap())
        .unwrap();
    let id = out.rsplit(' ').next().unwrap().to_string();

    for line in [
        format!("prop add {id} . armor object"),
        format!("prop add {id} armor rating number"),
    ] {
        assert_eq!(shell.execute(parse_command(&line).unwrap()).unwrap(), "");
    }
    let warning = shell
        .execute(parse_command(&format!("prop retype {id} . armor string")).unwrap())
        .unwrap();
    assert_eq!(warning, "warning: 'armor' lost its nested properties: rating");
}

#[test]
fn get_prints_the_document_as_json() {
    let dir = TempDir::new().unwrap();
    let (_service, mut shell) = shell_in(&dir);
    let out = shell.execute(Command::Get).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["name"], "myProject");
}

#[test]
fn open_without_path_and_no_answer_cancels() {
    let dir = TempDir::new().unwrap();
    let (_service, mut shell) = shell_in(&dir);
    assert_eq!(shell.execute(Command::Open(None)).unwrap(), "cancelled");
}

#[test]
fn run_stops_at_end_of_input() {
    let dir = TempDir::new().unwrap();
    let service = ProjectService::spawn(ProjectStore::default(), ScriptedChooser::new()).unwrap();
    let handle = service.handle();
    handle.new_project(dir.path().join("Game.exProj")).unwrap();

    let input: &'static [u8] = b"create actor Hero\nrename nope x\nquit\ncreate actor Ghost\n";
    let mut shell = Shell::with_editor(ReaderEditor::new(input), handle.clone()).without_banner();
    shell.run().unwrap();

    let names: Vec<String> = handle
        .get()
        .unwrap()
        .actors
        .iter()
        .map(|a| a.name.clone())
        .collect();
    assert_eq!(names, ["DefaultActor", "Hero"]);
}

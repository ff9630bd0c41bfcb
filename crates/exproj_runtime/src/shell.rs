//! Interactive shell over a [`ProjectHandle`].
//!
//! Each line is parsed into a [`Command`] and sent to the service as one
//! request, so the shell never touches the document directly.

use std::fmt::Write as _;
use std::path::PathBuf;

use exproj_foundation::{EntityKind, Error, ErrorKind, Identifier, Result};
use exproj_model::{ComponentRef, PartialDocument, PropertyType, TreeNode};

use crate::editor::{LineEditor, ReadResult, RustylineEditor, is_balanced};
use crate::service::{OrderEdit, ProjectHandle, SchemaEdit};

const HELP: &str = "\
commands:
  get                                   print the document as JSON
  update <json>                         merge top-level fields and save
  load | save                           reload from / write to the project file
  tree                                  print the navigation tree
  find <id>                             print the entity with this id
  open [path] | new [path]              open or create a project (prompts without a path)
  create <kind> <name>                  add an entity
  rename <id> <name>                    rename an entity
  delete <id>                           delete an entity and references to it
  prop add <component> <path> <name> <type>
  prop rename <component> <path> <old> <new>
  prop retype <component> <path> <name> <type>
  prop delete <component> <path> <name>
  prop expand <component> <path>        paths are dotted; '.' is the root
  order add <scene> <id>
  order remove|up|down <scene> <index>
  attach <actor> <component> | detach <actor> <index>
  timer <timer> <interval> <repeat> [script]
  script <script> <code>
  help | quit";

/// One parsed shell command.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum Command {
    Get,
    Update(PartialDocument),
    Load,
    Save,
    Tree,
    Find(Identifier),
    Open(Option<PathBuf>),
    New(Option<PathBuf>),
    Create(EntityKind, String),
    Rename(Identifier, String),
    Delete(Identifier),
    Prop(Identifier, SchemaEdit),
    Order(Identifier, OrderEdit),
    Attach(Identifier, ComponentRef),
    Detach(Identifier, usize),
    Timer {
        timer: Identifier,
        interval: f64,
        repeat: bool,
        script: Option<Identifier>,
    },
    Script(Identifier, String),
    Help,
    Quit,
}

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(i) => (&input[..i], input[i..].trim_start()),
        None => (input, ""),
    }
}

fn words<'a, const N: usize>(input: &'a str, usage: &str) -> Result<[&'a str; N]> {
    let parts: Vec<&'a str> = input.split_whitespace().collect();
    <[&'a str; N]>::try_from(parts).map_err(|_| Error::invalid_input(format!("usage: {usage}")))
}

fn id(word: &str) -> Result<Identifier> {
    word.parse()
}

fn index(word: &str) -> Result<usize> {
    word.parse()
        .map_err(|_| Error::invalid_input(format!("not an index: {word}")))
}

fn path(word: &str) -> Vec<String> {
    if word == "." {
        Vec::new()
    } else {
        word.split('.').map(str::to_string).collect()
    }
}

fn rest<'a>(input: &'a str, usage: &str) -> Result<&'a str> {
    if input.is_empty() {
        Err(Error::invalid_input(format!("usage: {usage}")))
    } else {
        Ok(input)
    }
}

/// Parses one line of shell input.
///
/// # Errors
///
/// Returns an error describing the expected usage if the line is malformed.
pub fn parse_command(line: &str) -> Result<Command> {
    let (word, args) = split_word(line.trim());
    let command = match word {
        "get" => Command::Get,
        "update" => {
            let json = rest(args, "update <json>")?;
            let partial = serde_json::from_str(json)
                .map_err(|e| Error::invalid_input(format!("invalid update: {e}")))?;
            Command::Update(partial)
        }
        "load" => Command::Load,
        "save" => Command::Save,
        "tree" => Command::Tree,
        "find" => {
            let [target] = words::<1>(args, "find <id>")?;
            Command::Find(id(target)?)
        }
        "open" => Command::Open((!args.is_empty()).then(|| PathBuf::from(args))),
        "new" => Command::New((!args.is_empty()).then(|| PathBuf::from(args))),
        "create" => {
            let (kind, name) = split_word(args);
            let name = rest(name, "create <kind> <name>")?;
            Command::Create(kind.parse()?, name.to_string())
        }
        "rename" => {
            let (target, name) = split_word(args);
            let name = rest(name, "rename <id> <name>")?;
            Command::Rename(id(target)?, name.to_string())
        }
        "delete" => {
            let [target] = words::<1>(args, "delete <id>")?;
            Command::Delete(id(target)?)
        }
        "prop" => parse_prop(args)?,
        "order" => parse_order(args)?,
        "attach" => {
            let [actor, component] = words::<2>(args, "attach <actor> <component>")?;
            Command::Attach(id(actor)?, component.parse()?)
        }
        "detach" => {
            let [actor, position] = words::<2>(args, "detach <actor> <index>")?;
            Command::Detach(id(actor)?, index(position)?)
        }
        "timer" => parse_timer(args)?,
        "script" => {
            let (target, code) = split_word(args);
            let code = rest(code, "script <script> <code>")?;
            Command::Script(id(target)?, code.to_string())
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(Error::invalid_input(format!(
                "unknown command: {other} (try 'help')"
            )));
        }
    };
    Ok(command)
}

fn parse_prop(args: &str) -> Result<Command> {
    let (action, args) = split_word(args);
    let (component, edit) = match action {
        "add" => {
            let [c, p, name, ty] = words::<4>(args, "prop add <component> <path> <name> <type>")?;
            let edit = SchemaEdit::Add {
                path: path(p),
                name: name.to_string(),
                ty: PropertyType::parse(ty)?,
            };
            (c, edit)
        }
        "rename" => {
            let [c, p, old, new] = words::<4>(args, "prop rename <component> <path> <old> <new>")?;
            let edit = SchemaEdit::Rename {
                path: path(p),
                old_name: old.to_string(),
                new_name: new.to_string(),
            };
            (c, edit)
        }
        "retype" => {
            let [c, p, name, ty] = words::<4>(args, "prop retype <component> <path> <name> <type>")?;
            let edit = SchemaEdit::Retype {
                path: path(p),
                name: name.to_string(),
                ty: PropertyType::parse(ty)?,
            };
            (c, edit)
        }
        "delete" => {
            let [c, p, name] = words::<3>(args, "prop delete <component> <path> <name>")?;
            let edit = SchemaEdit::Delete {
                path: path(p),
                name: name.to_string(),
            };
            (c, edit)
        }
        "expand" => {
            let [c, p] = words::<2>(args, "prop expand <component> <path>")?;
            (c, SchemaEdit::Expand { path: path(p) })
        }
        other => {
            return Err(Error::invalid_input(format!(
                "unknown prop action: {other}"
            )));
        }
    };
    Ok(Command::Prop(id(component)?, edit))
}

fn parse_order(args: &str) -> Result<Command> {
    let (action, args) = split_word(args);
    let [scene, target] = words::<2>(args, "order add|remove|up|down <scene> <id|index>")?;
    let edit = match action {
        "add" => OrderEdit::Append(id(target)?),
        "remove" => OrderEdit::Remove(index(target)?),
        "up" => OrderEdit::MoveUp(index(target)?),
        "down" => OrderEdit::MoveDown(index(target)?),
        other => {
            return Err(Error::invalid_input(format!(
                "unknown order action: {other}"
            )));
        }
    };
    Ok(Command::Order(id(scene)?, edit))
}

fn parse_timer(args: &str) -> Result<Command> {
    const USAGE: &str = "timer <timer> <interval> <repeat> [script]";
    let parts: Vec<&str> = args.split_whitespace().collect();
    let (timer, interval, repeat, script) = match parts.as_slice() {
        [t, i, r] => (*t, *i, *r, None),
        [t, i, r, s] => (*t, *i, *r, Some(*s)),
        _ => return Err(Error::invalid_input(format!("usage: {USAGE}"))),
    };
    Ok(Command::Timer {
        timer: id(timer)?,
        interval: interval
            .parse()
            .map_err(|_| Error::invalid_input(format!("not a number: {interval}")))?,
        repeat: repeat
            .parse()
            .map_err(|_| Error::invalid_input(format!("not true or false: {repeat}")))?,
        script: script.map(id).transpose()?,
    })
}

/// Renders a tree as indented lines: titles, with element ids in brackets.
#[must_use]
pub fn render_tree(tree: &TreeNode) -> String {
    fn walk(node: &TreeNode, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        if node.children.is_some() {
            let _ = writeln!(out, "{indent}{}", node.title);
        } else {
            let _ = writeln!(out, "{indent}{} [{}]", node.title, node.id);
        }
        for child in node.children() {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(tree, 0, &mut out);
    out
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::new(ErrorKind::Internal(format!("failed to render JSON: {e}"))))
}

/// The interactive shell.
pub struct Shell<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Connection to the project service.
    handle: ProjectHandle,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line JSON).
    continuation_prompt: String,
}

impl<E: LineEditor> Shell<E> {
    /// Creates a shell reading from `editor`.
    pub fn with_editor(editor: E, handle: ProjectHandle) -> Self {
        Self {
            editor,
            handle,
            show_banner: true,
            prompt: "exproj> ".to_string(),
            continuation_prompt: "...... ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Runs the shell until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            println!("exproj {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));
        }

        while let Some(line) = self.read_input()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.editor.add_history(&line);

            match parse_command(trimmed) {
                Ok(Command::Quit) => break,
                Ok(command) => match self.execute(command) {
                    Ok(output) if output.is_empty() => {}
                    Ok(output) => println!("{}", output.trim_end()),
                    Err(e) => print_error(&e),
                },
                Err(e) => print_error(&e),
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Reads one command, continuing across lines while JSON is open.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let prompt = if first_line {
                &self.prompt
            } else {
                &self.continuation_prompt
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);
                    if is_balanced(&input) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("Input cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    return if first_line {
                        Ok(None)
                    } else {
                        Err(Error::invalid_input("unexpected end of input in JSON"))
                    };
                }
            }
        }
    }

    /// Executes a command against the service and returns the text to show.
    ///
    /// # Errors
    ///
    /// Returns the service's error for the request.
    pub fn execute(&mut self, command: Command) -> Result<String> {
        let handle = &self.handle;
        match command {
            Command::Get => to_json(&handle.get()?),
            Command::Update(partial) => {
                let doc = handle.update(partial)?;
                Ok(format!("updated '{}'", doc.name))
            }
            Command::Load => {
                let doc = handle.load()?;
                Ok(format!("loaded '{}'", doc.name))
            }
            Command::Save => {
                handle.save()?;
                Ok("saved".to_string())
            }
            Command::Tree => Ok(render_tree(&handle.project_tree()?)),
            Command::Find(target) => match handle.find_by_id(target)? {
                Some(record) => to_json(&record),
                None => Ok(format!("not found: {target}")),
            },
            Command::Open(path) => {
                let path = match path {
                    Some(path) => Some(path),
                    None => handle.choose_existing_project_path()?,
                };
                match path {
                    Some(path) => {
                        handle.open_project(path.clone())?;
                        Ok(format!("opening {}", path.display()))
                    }
                    None => Ok("cancelled".to_string()),
                }
            }
            Command::New(path) => {
                let path = match path {
                    Some(path) => Some(path),
                    None => handle.choose_new_project_path()?,
                };
                match path {
                    Some(path) => {
                        handle.new_project(path.clone())?;
                        Ok(format!("creating {}", path.display()))
                    }
                    None => Ok("cancelled".to_string()),
                }
            }
            Command::Create(kind, name) => {
                let created = handle.create(kind, name)?;
                Ok(format!("created {kind} {created}"))
            }
            Command::Rename(target, name) => {
                handle.rename(target, name)?;
                Ok(String::new())
            }
            Command::Delete(target) => {
                let deletion = handle.delete(target)?;
                Ok(format!(
                    "deleted {} '{}' ({} reference(s) dropped)",
                    deletion.record.kind(),
                    deletion.record.name(),
                    deletion.detached
                ))
            }
            Command::Prop(component, edit) => {
                let retyped = match &edit {
                    SchemaEdit::Retype { name, .. } => Some(name.clone()),
                    _ => None,
                };
                let discarded = handle.edit_schema(component, edit)?;
                Ok(match (discarded, retyped) {
                    (Some(dropped), Some(name)) => {
                        let names: Vec<&str> = dropped.iter().map(|(n, _)| n).collect();
                        format!(
                            "warning: '{name}' lost its nested properties: {}",
                            names.join(", ")
                        )
                    }
                    _ => String::new(),
                })
            }
            Command::Order(scene, edit) => {
                handle.edit_scene_order(scene, edit)?;
                Ok(String::new())
            }
            Command::Attach(actor, component) => {
                handle.attach_component(actor, component)?;
                Ok(String::new())
            }
            Command::Detach(actor, position) => {
                let detached = handle.detach_component(actor, position)?;
                Ok(format!("detached {}", describe_component(detached)))
            }
            Command::Timer {
                timer,
                interval,
                repeat,
                script,
            } => {
                handle.configure_timer(timer, interval, repeat, script)?;
                Ok(String::new())
            }
            Command::Script(script, code) => {
                handle.set_script_source(script, code)?;
                Ok(String::new())
            }
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok(String::new()),
        }
    }
}

impl Shell<RustylineEditor> {
    /// Creates a shell with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(handle: ProjectHandle) -> Result<Self> {
        Ok(Self::with_editor(RustylineEditor::new()?, handle))
    }
}

fn describe_component(component: ComponentRef) -> String {
    match component {
        ComponentRef::Builtin(builtin) => builtin.to_string(),
        ComponentRef::Custom(id) => id.to_string(),
    }
}

fn print_error(error: &Error) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
}

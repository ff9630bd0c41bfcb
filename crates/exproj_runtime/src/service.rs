//! Request/response service owning the project store.
//!
//! [`ProjectService::spawn`] moves a [`ProjectStore`] onto its own thread.
//! Callers talk to it through cloneable [`ProjectHandle`]s over a bounded
//! channel. The thread handles one message at a time, so every document
//! operation, including file I/O, runs to completion before the next begins.

use std::fmt;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use exproj_foundation::{EntityKind, Error, ErrorKind, Identifier, Result};
use exproj_model::{
    ComponentRef, Deletion, EntityRecord, PartialDocument, ProjectDocument, PropertySchema,
    PropertyType, TreeNode,
};
use log::{debug, error, info, warn};

use crate::chooser::PathChooser;
use crate::store::ProjectStore;

/// An edit to one component's property schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaEdit {
    /// Adds a property under `path`.
    Add {
        /// Path of the mapping receiving the property.
        path: Vec<String>,
        /// New property name.
        name: String,
        /// Declared type.
        ty: PropertyType,
    },
    /// Renames a property in place.
    Rename {
        /// Path of the mapping holding the property.
        path: Vec<String>,
        /// Current name.
        old_name: String,
        /// New name.
        new_name: String,
    },
    /// Changes a property's declared type.
    Retype {
        /// Path of the mapping holding the property.
        path: Vec<String>,
        /// Property name.
        name: String,
        /// New type.
        ty: PropertyType,
    },
    /// Removes a property and everything under it.
    Delete {
        /// Path of the mapping holding the property.
        path: Vec<String>,
        /// Property name.
        name: String,
    },
    /// Materializes the child mapping of the object property at `path`.
    Expand {
        /// Path of the object property.
        path: Vec<String>,
    },
}

/// An edit to one scene's element order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderEdit {
    /// Places an entity at the end.
    Append(Identifier),
    /// Removes the entry at an index.
    Remove(usize),
    /// Moves the entry at an index one step earlier.
    MoveUp(usize),
    /// Moves the entry at an index one step later.
    MoveDown(usize),
}

/// Fire-and-forget notifications from the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// Open the project file at this path.
    ProjectSelected(PathBuf),
    /// Create a new project file at this path.
    NewProject(PathBuf),
}

impl fmt::Display for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectSelected(path) => write!(f, "project-selected {}", path.display()),
            Self::NewProject(path) => write!(f, "new-project {}", path.display()),
        }
    }
}

/// A request the service answers.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum Request {
    Get,
    Update(PartialDocument),
    Load,
    Save,
    GetProjectTreeData,
    GetDataById(Identifier),
    ChooseExistingProjectPath,
    ChooseNewProjectPath,
    Create {
        kind: EntityKind,
        name: String,
    },
    Rename {
        id: Identifier,
        name: String,
    },
    Delete(Identifier),
    EditSchema {
        component: Identifier,
        edit: SchemaEdit,
    },
    EditSceneOrder {
        scene: Identifier,
        edit: OrderEdit,
    },
    AttachComponent {
        actor: Identifier,
        component: ComponentRef,
    },
    DetachComponent {
        actor: Identifier,
        index: usize,
    },
    ConfigureTimer {
        timer: Identifier,
        interval: f64,
        repeat: bool,
        script: Option<Identifier>,
    },
    SetScriptSource {
        script: Identifier,
        code: String,
    },
}

impl Request {
    /// Returns the request's name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Update(_) => "update",
            Self::Load => "load",
            Self::Save => "save",
            Self::GetProjectTreeData => "getProjectTreeData",
            Self::GetDataById(_) => "getDataByID",
            Self::ChooseExistingProjectPath => "chooseExistingProjectPath",
            Self::ChooseNewProjectPath => "chooseNewProjectPath",
            Self::Create { .. } => "create",
            Self::Rename { .. } => "rename",
            Self::Delete(_) => "delete",
            Self::EditSchema { .. } => "editSchema",
            Self::EditSceneOrder { .. } => "editSceneOrder",
            Self::AttachComponent { .. } => "attachComponent",
            Self::DetachComponent { .. } => "detachComponent",
            Self::ConfigureTimer { .. } => "configureTimer",
            Self::SetScriptSource { .. } => "setScriptSource",
        }
    }
}

/// The service's answer to a [`Request`].
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum Response {
    Document(ProjectDocument),
    Tree(TreeNode),
    Entity(Option<EntityRecord>),
    Path(Option<PathBuf>),
    Created(Identifier),
    Deleted(Deletion),
    /// Nested properties discarded by a schema edit, if any.
    Discarded(Option<PropertySchema>),
    Detached(ComponentRef),
    Done,
}

enum Message {
    Request(Request, Sender<Result<Response>>),
    Event(UiEvent),
    Shutdown,
}

/// The thread owning a [`ProjectStore`].
///
/// Dropping the service stops the thread after the messages already queued.
pub struct ProjectService {
    handle: ProjectHandle,
    thread: Option<JoinHandle<()>>,
}

impl ProjectService {
    /// Starts the service thread.
    ///
    /// `chooser` answers path-choosing requests on the service thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<C>(store: ProjectStore, chooser: C) -> Result<Self>
    where
        C: PathChooser + Send + 'static,
    {
        let capacity = store.config().channel_capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        debug!("project service channel created (capacity: {capacity})");

        let thread = thread::Builder::new()
            .name("exproj-store".to_string())
            .spawn(move || run(store, chooser, &receiver))
            .map_err(|e| Error::io(format!("failed to spawn project service: {e}")))?;

        Ok(Self {
            handle: ProjectHandle { sender },
            thread: Some(thread),
        })
    }

    /// Returns a new handle to the service.
    #[must_use]
    pub fn handle(&self) -> ProjectHandle {
        self.handle.clone()
    }

    /// Stops the service after the messages already queued and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.handle.sender.send(Message::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("project service thread panicked");
            }
        }
    }
}

impl Drop for ProjectService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<C: PathChooser>(mut store: ProjectStore, mut chooser: C, receiver: &Receiver<Message>) {
    debug!("project service started");
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Request(request, reply) => {
                let name = request.name();
                debug!("request: {name}");
                let response = handle_request(&mut store, &mut chooser, request);
                if let Err(e) = &response {
                    debug!("request {name} failed: {e}");
                }
                if reply.send(response).is_err() {
                    debug!("requester for {name} went away before the reply");
                }
            }
            Message::Event(event) => {
                if let Err(e) = handle_event(&mut store, &event) {
                    error!("{event} failed: {e}");
                }
            }
            Message::Shutdown => break,
        }
    }
    debug!("project service stopped");
}

fn handle_event(store: &mut ProjectStore, event: &UiEvent) -> Result<()> {
    match event {
        UiEvent::ProjectSelected(path) => {
            store.set_path(path)?;
            store.load()?;
            info!("opened project at {}", path.display());
        }
        UiEvent::NewProject(path) => {
            store.set_path(path)?;
            store.reset_to_defaults();
            store.save()?;
            info!("created project at {}", path.display());
        }
    }
    Ok(())
}

fn handle_request<C: PathChooser>(
    store: &mut ProjectStore,
    chooser: &mut C,
    request: Request,
) -> Result<Response> {
    match request {
        Request::Get => Ok(Response::Document(store.snapshot())),
        Request::Update(partial) => store.update(partial).map(Response::Document),
        Request::Load => {
            store.load()?;
            Ok(Response::Document(store.snapshot()))
        }
        Request::Save => store.save().map(|()| Response::Done),
        Request::GetProjectTreeData => Ok(Response::Tree(store.project_tree())),
        Request::GetDataById(id) => Ok(Response::Entity(store.find_by_id(id))),
        Request::ChooseExistingProjectPath => chooser.choose_existing().map(Response::Path),
        Request::ChooseNewProjectPath => chooser.choose_new().map(Response::Path),
        Request::Create { kind, name } => store
            .apply(|doc| doc.create(kind, &name))
            .map(Response::Created),
        Request::Rename { id, name } => store
            .apply(|doc| doc.rename(id, &name))
            .map(|()| Response::Done),
        Request::Delete(id) => {
            let deletion = store.apply(|doc| doc.delete(id))?;
            if deletion.detached > 0 {
                warn!(
                    "deleting {} {} dropped {} reference(s) to it",
                    deletion.record.kind(),
                    id,
                    deletion.detached
                );
            }
            Ok(Response::Deleted(deletion))
        }
        Request::EditSchema { component, edit } => {
            let discarded = store.apply(|doc| {
                let schema = doc.component_schema_mut(component)?;
                apply_schema_edit(schema, &edit)
            })?;
            if discarded.is_some() {
                warn!("schema edit on component {component} discarded nested properties");
            }
            Ok(Response::Discarded(discarded))
        }
        Request::EditSceneOrder { scene, edit } => store
            .apply(|doc| match edit {
                OrderEdit::Append(entity) => doc.place_in_scene(scene, entity),
                OrderEdit::Remove(index) => doc.remove_from_scene(scene, index).map(drop),
                OrderEdit::MoveUp(index) => doc.move_scene_element_up(scene, index),
                OrderEdit::MoveDown(index) => doc.move_scene_element_down(scene, index),
            })
            .map(|()| Response::Done),
        Request::AttachComponent { actor, component } => store
            .apply(|doc| doc.attach_component(actor, component))
            .map(|()| Response::Done),
        Request::DetachComponent { actor, index } => store
            .apply(|doc| doc.detach_component(actor, index))
            .map(Response::Detached),
        Request::ConfigureTimer {
            timer,
            interval,
            repeat,
            script,
        } => store
            .apply(|doc| doc.configure_timer(timer, interval, repeat, script))
            .map(|()| Response::Done),
        Request::SetScriptSource { script, code } => store
            .apply(|doc| doc.set_script_source(script, code))
            .map(|()| Response::Done),
    }
}

/// Applies `edit` and returns any non-empty nested mapping it discarded.
fn apply_schema_edit(schema: &mut PropertySchema, edit: &SchemaEdit) -> Result<Option<PropertySchema>> {
    fn segments(path: &[String]) -> Vec<&str> {
        path.iter().map(String::as_str).collect()
    }

    match edit {
        SchemaEdit::Add { path, name, ty } => {
            schema.add(&segments(path), name, *ty)?;
            Ok(None)
        }
        SchemaEdit::Rename {
            path,
            old_name,
            new_name,
        } => {
            schema.rename(&segments(path), old_name, new_name)?;
            Ok(None)
        }
        SchemaEdit::Retype { path, name, ty } => schema.retype(&segments(path), name, *ty),
        SchemaEdit::Delete { path, name } => {
            let node = schema.delete(&segments(path), name)?;
            Ok(node.nested.filter(|nested| !nested.is_empty()))
        }
        SchemaEdit::Expand { path } => {
            schema.expand(&segments(path))?;
            Ok(None)
        }
    }
}

/// A cloneable connection to a [`ProjectService`].
#[derive(Clone)]
pub struct ProjectHandle {
    sender: Sender<Message>,
}

fn unexpected(request: &'static str, response: &Response) -> Error {
    Error::new(ErrorKind::Internal(format!(
        "unexpected response to {request}: {response:?}"
    )))
}

macro_rules! expect_response {
    ($self:ident, $request:expr, $variant:ident) => {{
        let request = $request;
        let name = request.name();
        match $self.request(request)? {
            Response::$variant(value) => Ok(value),
            other => Err(unexpected(name, &other)),
        }
    }};
    ($self:ident, $request:expr) => {{
        let request = $request;
        let name = request.name();
        match $self.request(request)? {
            Response::Done => Ok(()),
            other => Err(unexpected(name, &other)),
        }
    }};
}

impl ProjectHandle {
    /// Sends a request and waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns the request's own error, or [`ErrorKind::ServiceClosed`] if
    /// the service has stopped.
    pub fn request(&self, request: Request) -> Result<Response> {
        let (reply, response) = bounded(1);
        self.sender
            .send(Message::Request(request, reply))
            .map_err(|_| Error::new(ErrorKind::ServiceClosed))?;
        response
            .recv()
            .map_err(|_| Error::new(ErrorKind::ServiceClosed))?
    }

    /// Queues a UI event without waiting for it to be handled.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ServiceClosed`] if the service has stopped.
    pub fn send_event(&self, event: UiEvent) -> Result<()> {
        self.sender
            .send(Message::Event(event))
            .map_err(|_| Error::new(ErrorKind::ServiceClosed))
    }

    /// Fires a "project selected" event for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ServiceClosed`] if the service has stopped.
    pub fn open_project(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send_event(UiEvent::ProjectSelected(path.into()))
    }

    /// Fires a "new project" event for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ServiceClosed`] if the service has stopped.
    pub fn new_project(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send_event(UiEvent::NewProject(path.into()))
    }

    /// Returns the current document.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn get(&self) -> Result<ProjectDocument> {
        expect_response!(self, Request::Get, Document)
    }

    /// Merges `partial` into the document, saves, and returns the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the merge is rejected or saving fails.
    pub fn update(&self, partial: PartialDocument) -> Result<ProjectDocument> {
        expect_response!(self, Request::Update(partial), Document)
    }

    /// Reloads the document from disk and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<ProjectDocument> {
        expect_response!(self, Request::Load, Document)
    }

    /// Saves the document.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured or writing fails.
    pub fn save(&self) -> Result<()> {
        expect_response!(self, Request::Save)
    }

    /// Returns the navigation tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn project_tree(&self) -> Result<TreeNode> {
        expect_response!(self, Request::GetProjectTreeData, Tree)
    }

    /// Looks up an entity of any kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn find_by_id(&self, id: Identifier) -> Result<Option<EntityRecord>> {
        expect_response!(self, Request::GetDataById(id), Entity)
    }

    /// Asks the user for an existing project file.
    ///
    /// # Errors
    ///
    /// Returns an error if the chooser fails.
    pub fn choose_existing_project_path(&self) -> Result<Option<PathBuf>> {
        expect_response!(self, Request::ChooseExistingProjectPath, Path)
    }

    /// Asks the user where to create a project file.
    ///
    /// # Errors
    ///
    /// Returns an error if the chooser fails.
    pub fn choose_new_project_path(&self) -> Result<Option<PathBuf>> {
        expect_response!(self, Request::ChooseNewProjectPath, Path)
    }

    /// Creates an entity and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if saving fails.
    pub fn create(&self, kind: EntityKind, name: impl Into<String>) -> Result<Identifier> {
        let name = name.into();
        expect_response!(self, Request::Create { kind, name }, Created)
    }

    /// Renames an entity and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not exist or saving fails.
    pub fn rename(&self, id: Identifier, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        expect_response!(self, Request::Rename { id, name })
    }

    /// Deletes an entity with its references and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not exist or saving fails.
    pub fn delete(&self, id: Identifier) -> Result<Deletion> {
        expect_response!(self, Request::Delete(id), Deleted)
    }

    /// Edits a component's property schema and saves. Returns the nested
    /// properties the edit discarded, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `component` is not a component, the edit is
    /// rejected, or saving fails.
    pub fn edit_schema(
        &self,
        component: Identifier,
        edit: SchemaEdit,
    ) -> Result<Option<PropertySchema>> {
        expect_response!(self, Request::EditSchema { component, edit }, Discarded)
    }

    /// Edits a scene's element order and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the edit is rejected or saving fails.
    pub fn edit_scene_order(&self, scene: Identifier, edit: OrderEdit) -> Result<()> {
        expect_response!(self, Request::EditSceneOrder { scene, edit })
    }

    /// Attaches a component to an actor and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if either side does not resolve or saving fails.
    pub fn attach_component(&self, actor: Identifier, component: ComponentRef) -> Result<()> {
        expect_response!(self, Request::AttachComponent { actor, component })
    }

    /// Detaches an actor's component by index and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds or saving fails.
    pub fn detach_component(&self, actor: Identifier, index: usize) -> Result<ComponentRef> {
        expect_response!(self, Request::DetachComponent { actor, index }, Detached)
    }

    /// Sets a timer's interval, repeat flag, and script, then saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer or script does not resolve or saving fails.
    pub fn configure_timer(
        &self,
        timer: Identifier,
        interval: f64,
        repeat: bool,
        script: Option<Identifier>,
    ) -> Result<()> {
        expect_response!(
            self,
            Request::ConfigureTimer {
                timer,
                interval,
                repeat,
                script,
            }
        )
    }

    /// Replaces a script's source and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if `script` is not a script or saving fails.
    pub fn set_script_source(&self, script: Identifier, code: impl Into<String>) -> Result<()> {
        let code = code.into();
        expect_response!(self, Request::SetScriptSource { script, code })
    }
}

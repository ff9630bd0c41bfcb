//! The project document.
//!
//! `ProjectDocument` exclusively owns every entity collection and the engine
//! configuration. Collections are persistent vectors, so cloning a document to
//! hand a snapshot to a caller shares structure instead of copying entities.
//!
//! Identifiers are unique across the union of all collections. Every insertion
//! path (typed insert, `create`, merge, validation after load) enforces this.

use std::collections::HashSet;

use exproj_foundation::{EntityKind, Error, ErrorKind, Identifier, Result, Timestamp};
use im::Vector;
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::entity::{
    Actor, ActorData, Camera, CameraData, Component, ComponentData, ComponentRef, Entity,
    EntityData, EntityRecord, Level, LevelData, Particle, ParticleData, PostProcessor,
    PostProcessorData, Scene, SceneData, ScreenElement, ScreenElementData, Script, ScriptData,
    System, SystemData, Timer, TimerData,
};
use crate::schema::PropertySchema;

/// Runs `$body` with `$data` bound to the payload type for `$kind`.
macro_rules! dispatch {
    ($kind:expr, $data:ident => $body:expr) => {
        match $kind {
            EntityKind::Scene => {
                type $data = SceneData;
                $body
            }
            EntityKind::Actor => {
                type $data = ActorData;
                $body
            }
            EntityKind::ScreenElement => {
                type $data = ScreenElementData;
                $body
            }
            EntityKind::Level => {
                type $data = LevelData;
                $body
            }
            EntityKind::Camera => {
                type $data = CameraData;
                $body
            }
            EntityKind::Component => {
                type $data = ComponentData;
                $body
            }
            EntityKind::System => {
                type $data = SystemData;
                $body
            }
            EntityKind::PostProcessor => {
                type $data = PostProcessorData;
                $body
            }
            EntityKind::Particle => {
                type $data = ParticleData;
                $body
            }
            EntityKind::Timer => {
                type $data = TimerData;
                $body
            }
            EntityKind::Script => {
                type $data = ScriptData;
                $body
            }
        }
    };
}

/// Document-level `type` tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentTag {
    /// The only tag a project document carries.
    #[default]
    #[serde(rename = "PROJECT")]
    Project,
}

/// The root aggregate: one per open project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Always `PROJECT`.
    #[serde(rename = "type", default)]
    pub tag: DocumentTag,
    /// Project name.
    pub name: String,
    /// When the document was last updated.
    #[serde(default)]
    pub last_opened: Timestamp,
    /// Scenes.
    #[serde(default)]
    pub scenes: Vector<Scene>,
    /// Actors.
    #[serde(default)]
    pub actors: Vector<Actor>,
    /// Screen elements.
    #[serde(default)]
    pub screen_elements: Vector<ScreenElement>,
    /// Levels.
    #[serde(default)]
    pub levels: Vector<Level>,
    /// Cameras.
    #[serde(default, rename = "camera", alias = "cameras")]
    pub cameras: Vector<Camera>,
    /// Custom components.
    #[serde(default)]
    pub components: Vector<Component>,
    /// Systems.
    #[serde(default)]
    pub systems: Vector<System>,
    /// Post-processors.
    #[serde(default)]
    pub post_processors: Vector<PostProcessor>,
    /// Particle emitters.
    #[serde(default)]
    pub particles: Vector<Particle>,
    /// Engine settings.
    #[serde(default)]
    pub engine_config: EngineConfig,
    /// Scripts.
    #[serde(default)]
    pub scripts: Vector<Script>,
    /// Timers.
    #[serde(default)]
    pub timers: Vector<Timer>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::empty("Untitled")
    }
}

/// Result of deleting an entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Deletion {
    /// The removed entity.
    pub record: EntityRecord,
    /// Number of references to it that were dropped elsewhere in the document.
    pub detached: usize,
}

impl ProjectDocument {
    /// Creates a document with no entities and default engine settings.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            tag: DocumentTag::Project,
            name: name.into(),
            last_opened: Timestamp::now(),
            scenes: Vector::new(),
            actors: Vector::new(),
            screen_elements: Vector::new(),
            levels: Vector::new(),
            cameras: Vector::new(),
            components: Vector::new(),
            systems: Vector::new(),
            post_processors: Vector::new(),
            particles: Vector::new(),
            engine_config: EngineConfig::default(),
            scripts: Vector::new(),
            timers: Vector::new(),
        }
    }

    /// Creates the starter document for a new project: one scene, one actor,
    /// one camera, and default engine settings.
    #[must_use]
    pub fn starter(name: impl Into<String>) -> Self {
        let mut doc = Self::empty(name);
        doc.scenes.push_back(Scene::new("Root"));
        doc.actors.push_back(Actor::new("DefaultActor"));
        doc.cameras.push_back(Camera::new("DefaultCamera"));
        doc
    }

    /// Sets `last_opened` to the current time.
    pub fn touch(&mut self) {
        self.last_opened = Timestamp::now();
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds the entity with this identifier in any collection.
    ///
    /// Collections are scanned in [`EntityKind::ALL`] order and the first match
    /// wins; with unique identifiers it is also the only match.
    #[must_use]
    pub fn find_by_id(&self, id: Identifier) -> Option<EntityRecord> {
        EntityKind::ALL
            .into_iter()
            .find_map(|kind| dispatch!(kind, D => self.get::<D>(id).cloned().map(EntityRecord::from)))
    }

    /// Returns the kind and collection index of the entity with this identifier.
    #[must_use]
    pub fn locate(&self, id: Identifier) -> Option<(EntityKind, usize)> {
        EntityKind::ALL.into_iter().find_map(|kind| {
            dispatch!(kind, D => D::collection(self).iter().position(|e| e.id == id))
                .map(|index| (kind, index))
        })
    }

    /// Returns true if any collection holds this identifier.
    #[must_use]
    pub fn contains(&self, id: Identifier) -> bool {
        self.locate(id).is_some()
    }

    /// Returns the entity with this identifier from `D`'s collection.
    #[must_use]
    pub fn get<D: EntityData>(&self, id: Identifier) -> Option<&Entity<D>> {
        D::collection(self).iter().find(|e| e.id == id)
    }

    /// Returns mutable access to the entity with this identifier in `D`'s
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns an error if no entity has this identifier, or if it lives in a
    /// different collection.
    pub fn get_mut<D: EntityData>(&mut self, id: Identifier) -> Result<&mut Entity<D>> {
        let index = self.require_kind(id, D::KIND)?;
        D::collection_mut(self)
            .get_mut(index)
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Returns the number of entities of this kind.
    #[must_use]
    pub fn len(&self, kind: EntityKind) -> usize {
        dispatch!(kind, D => D::collection(self).len())
    }

    /// Returns the total number of entities across all collections.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        EntityKind::ALL.into_iter().map(|kind| self.len(kind)).sum()
    }

    /// Returns `(id, name)` for every entity of this kind, in collection order.
    #[must_use]
    pub fn entries(&self, kind: EntityKind) -> Vec<(Identifier, &str)> {
        dispatch!(kind, D => D::collection(self)
            .iter()
            .map(|e| (e.id, e.name.as_str()))
            .collect())
    }

    fn require_kind(&self, id: Identifier, expected: EntityKind) -> Result<usize> {
        match self.locate(id) {
            Some((kind, index)) if kind == expected => Ok(index),
            Some((kind, _)) => Err(Error::wrong_kind(id, expected, kind)),
            None => Err(Error::entity_not_found(id)),
        }
    }

    // =========================================================================
    // Typed CRUD
    // =========================================================================

    /// Appends an entity to its collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is already in use anywhere in the
    /// document, or if the entity's tag disagrees with its payload.
    pub fn insert<D: EntityData>(&mut self, entity: Entity<D>) -> Result<Identifier> {
        if !entity.is_well_tagged() {
            return Err(Error::invalid_input(format!(
                "entity {} is tagged {} but has a {} payload",
                entity.id, entity.kind, D::KIND
            )));
        }
        if self.contains(entity.id) {
            return Err(Error::duplicate_identifier(entity.id));
        }
        let id = entity.id;
        D::collection_mut(self).push_back(entity);
        Ok(id)
    }

    /// Creates an entity of `kind` with a fresh identifier and default payload.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated identifier collides.
    pub fn create(&mut self, kind: EntityKind, name: &str) -> Result<Identifier> {
        dispatch!(kind, D => self.insert(Entity::<D>::new(name)))
    }

    /// Renames an entity. The name is stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if no entity has this identifier.
    pub fn rename(&mut self, id: Identifier, name: &str) -> Result<()> {
        let (kind, index) = self.locate(id).ok_or_else(|| Error::entity_not_found(id))?;
        dispatch!(kind, D => {
            if let Some(entity) = D::collection_mut(self).get_mut(index) {
                entity.name = name.to_string();
            }
        });
        Ok(())
    }

    /// Removes an entity and drops every reference to it: scene placements,
    /// actor component attachments, and timer script links.
    ///
    /// # Errors
    ///
    /// Returns an error if no entity has this identifier.
    pub fn delete(&mut self, id: Identifier) -> Result<Deletion> {
        let (kind, index) = self.locate(id).ok_or_else(|| Error::entity_not_found(id))?;
        let record = dispatch!(kind, D => EntityRecord::from(D::collection_mut(self).remove(index)));

        let mut detached = 0;
        for scene in self.scenes.iter_mut() {
            let before = scene.data.elements.len();
            scene.data.elements.retain(|e| e.id != id);
            detached += before - scene.data.elements.len();
        }
        for actor in self.actors.iter_mut() {
            let before = actor.data.components.len();
            actor
                .data
                .components
                .retain(|c| *c != ComponentRef::Custom(id));
            detached += before - actor.data.components.len();
        }
        for timer in self.timers.iter_mut() {
            if timer.data.script == Some(id) {
                timer.data.script = None;
                detached += 1;
            }
        }

        Ok(Deletion { record, detached })
    }

    /// Attaches a component to an actor.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not an actor, or if a custom reference
    /// does not name an existing component.
    pub fn attach_component(&mut self, actor: Identifier, component: ComponentRef) -> Result<()> {
        if let ComponentRef::Custom(id) = component {
            self.require_kind(id, EntityKind::Component)?;
        }
        self.get_mut::<ActorData>(actor)?
            .data
            .components
            .push(component);
        Ok(())
    }

    /// Detaches the component at `index` from an actor.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not an actor or `index` is out of bounds.
    pub fn detach_component(&mut self, actor: Identifier, index: usize) -> Result<ComponentRef> {
        let components = &mut self.get_mut::<ActorData>(actor)?.data.components;
        if index >= components.len() {
            return Err(Error::new(ErrorKind::IndexOutOfBounds {
                index,
                length: components.len(),
            }));
        }
        Ok(components.remove(index))
    }

    /// Sets a timer's interval, repeat flag, and script.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not finite, `timer` is not a timer,
    /// or `script` is not a script.
    pub fn configure_timer(
        &mut self,
        timer: Identifier,
        interval: f64,
        repeat: bool,
        script: Option<Identifier>,
    ) -> Result<()> {
        check_finite("timer interval", interval)?;
        if let Some(script) = script {
            self.require_kind(script, EntityKind::Script)?;
        }
        let data = &mut self.get_mut::<TimerData>(timer)?.data;
        data.interval = interval;
        data.repeat = repeat;
        data.script = script;
        Ok(())
    }

    /// Replaces a script's source text.
    ///
    /// # Errors
    ///
    /// Returns an error if `script` is not a script.
    pub fn set_script_source(&mut self, script: Identifier, code: impl Into<String>) -> Result<()> {
        self.get_mut::<ScriptData>(script)?.data.code = code.into();
        Ok(())
    }

    /// Returns mutable access to a scene.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a scene.
    pub fn scene_mut(&mut self, id: Identifier) -> Result<&mut Scene> {
        self.get_mut::<SceneData>(id)
    }

    /// Returns mutable access to a component's property schema.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a component.
    pub fn component_schema_mut(&mut self, id: Identifier) -> Result<&mut PropertySchema> {
        Ok(&mut self.get_mut::<ComponentData>(id)?.data.properties)
    }

    // =========================================================================
    // Merge and validation
    // =========================================================================

    /// Returns a copy of this document with the fields present in `partial`
    /// replaced. Absent fields are untouched; `last_opened` is not changed.
    ///
    /// # Errors
    ///
    /// Returns an error, and leaves nothing merged, if the result would break
    /// identifier uniqueness or carry mistagged entities.
    pub fn merged(&self, partial: PartialDocument) -> Result<Self> {
        let mut doc = self.clone();
        let PartialDocument {
            name,
            scenes,
            actors,
            screen_elements,
            levels,
            cameras,
            components,
            systems,
            post_processors,
            particles,
            engine_config,
            scripts,
            timers,
        } = partial;

        if let Some(name) = name {
            doc.name = name;
        }
        if let Some(scenes) = scenes {
            doc.scenes = scenes;
        }
        if let Some(actors) = actors {
            doc.actors = actors;
        }
        if let Some(screen_elements) = screen_elements {
            doc.screen_elements = screen_elements;
        }
        if let Some(levels) = levels {
            doc.levels = levels;
        }
        if let Some(cameras) = cameras {
            doc.cameras = cameras;
        }
        if let Some(components) = components {
            doc.components = components;
        }
        if let Some(systems) = systems {
            doc.systems = systems;
        }
        if let Some(post_processors) = post_processors {
            doc.post_processors = post_processors;
        }
        if let Some(particles) = particles {
            doc.particles = particles;
        }
        if let Some(engine_config) = engine_config {
            doc.engine_config = engine_config;
        }
        if let Some(scripts) = scripts {
            doc.scripts = scripts;
        }
        if let Some(timers) = timers {
            doc.timers = timers;
        }

        doc.validate()?;
        Ok(doc)
    }

    /// Checks the document invariants: every entity's tag matches its
    /// collection, no identifier appears twice across collections, and every
    /// number the file stores is finite.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning in [`EntityKind::ALL`] order.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entity_count());
        for kind in EntityKind::ALL {
            dispatch!(kind, D => {
                for entity in D::collection(self) {
                    if !entity.is_well_tagged() {
                        return Err(Error::invalid_input(format!(
                            "entity {} in the {} collection is tagged {}",
                            entity.id, kind, entity.kind
                        )));
                    }
                    if !seen.insert(entity.id) {
                        return Err(Error::duplicate_identifier(entity.id));
                    }
                }
            });
        }
        for timer in &self.timers {
            check_finite("timer interval", timer.data.interval)?;
        }
        check_finite("pixel ratio", self.engine_config.pixel_ratio)
    }
}

/// Rejects NaN and infinities, which JSON cannot represent.
fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("{field} must be a finite number, got {value}")))
    }
}

/// A partial update: only the fields that are `Some` replace the document's.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct PartialDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vector<Scene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vector<Actor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_elements: Option<Vector<ScreenElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vector<Level>>,
    #[serde(
        default,
        rename = "camera",
        alias = "cameras",
        skip_serializing_if = "Option::is_none"
    )]
    pub cameras: Option<Vector<Camera>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vector<Component>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systems: Option<Vector<System>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_processors: Option<Vector<PostProcessor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<Vector<Particle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_config: Option<EngineConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vector<Script>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timers: Option<Vector<Timer>>,
}

impl PartialDocument {
    /// Creates an empty partial update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = Some(config);
        self
    }

    /// Sets the components collection.
    #[must_use]
    pub fn with_components(mut self, components: Vector<Component>) -> Self {
        self.components = Some(components);
        self
    }

    /// Sets the scenes collection.
    #[must_use]
    pub fn with_scenes(mut self, scenes: Vector<Scene>) -> Self {
        self.scenes = Some(scenes);
        self
    }

    /// Sets the actors collection.
    #[must_use]
    pub fn with_actors(mut self, actors: Vector<Actor>) -> Self {
        self.actors = Some(actors);
        self
    }
}

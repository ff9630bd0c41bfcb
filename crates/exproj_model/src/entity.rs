//! Entity records.
//!
//! Every entity shares the `{type, id, name}` header; the kind-specific payload
//! is flattened next to it so files keep the shape the editor has always written.

use std::fmt;
use std::str::FromStr;

use exproj_foundation::{EntityKind, Error, Identifier, Result};
use im::Vector;
use serde::{Deserialize, Serialize};

use crate::document::ProjectDocument;
use crate::scene_order::SceneElement;
use crate::schema::PropertySchema;

/// Kind-specific payload of an entity.
pub trait EntityData: Clone + Default + PartialEq + fmt::Debug {
    /// The kind tag entities with this payload carry.
    const KIND: EntityKind;

    /// The document collection holding entities of this kind.
    fn collection(doc: &ProjectDocument) -> &Vector<Entity<Self>>;

    /// Mutable access to the document collection holding entities of this kind.
    fn collection_mut(doc: &mut ProjectDocument) -> &mut Vector<Entity<Self>>;
}

/// A named, identified entity with a kind-specific payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity<D> {
    /// Kind tag, written as `type`.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Globally unique identifier.
    pub id: Identifier,
    /// Name, stored verbatim.
    pub name: String,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub data: D,
}

impl<D: EntityData> Entity<D> {
    /// Creates an entity with a fresh identifier and a default payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Identifier::generate(), name)
    }

    /// Creates an entity with the given identifier and a default payload.
    #[must_use]
    pub fn with_id(id: Identifier, name: impl Into<String>) -> Self {
        Self {
            kind: D::KIND,
            id,
            name: name.into(),
            data: D::default(),
        }
    }

    /// Replaces the payload.
    #[must_use]
    pub fn with_data(mut self, data: D) -> Self {
        self.data = data;
        self
    }

    /// Returns true if the kind tag agrees with the payload type.
    #[must_use]
    pub fn is_well_tagged(&self) -> bool {
        self.kind == D::KIND
    }
}

/// Scene payload: the ordered placement list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    /// Render/update order of entities placed into the scene.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<SceneElement>,
}

/// Actor payload: attached components.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorData {
    /// Attached components, in attachment order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentRef>,
}

/// Custom component payload: the property schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Named property definitions.
    #[serde(default, skip_serializing_if = "PropertySchema::is_empty")]
    pub properties: PropertySchema,
}

/// Timer payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerData {
    /// Interval in milliseconds.
    #[serde(default)]
    pub interval: f64,
    /// Whether the timer re-arms after firing.
    #[serde(default)]
    pub repeat: bool,
    /// Script run when the timer fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Identifier>,
}

/// Script payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptData {
    /// Source text.
    #[serde(default)]
    pub code: String,
    /// Kind of entity the script is written for.
    #[serde(rename = "scriptType", default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<EntityKind>,
}

macro_rules! plain_payloads {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
            pub struct $name {}
        )*
    };
}

plain_payloads! {
    /// Level payload.
    LevelData;
    /// Camera payload.
    CameraData;
    /// System payload.
    SystemData;
    /// Post-processor payload.
    PostProcessorData;
    /// Particle payload.
    ParticleData;
    /// Screen element payload.
    ScreenElementData;
}

macro_rules! entity_data {
    ($($data:ident => $kind:ident, $field:ident;)*) => {
        $(
            impl EntityData for $data {
                const KIND: EntityKind = EntityKind::$kind;

                fn collection(doc: &ProjectDocument) -> &Vector<Entity<Self>> {
                    &doc.$field
                }

                fn collection_mut(doc: &mut ProjectDocument) -> &mut Vector<Entity<Self>> {
                    &mut doc.$field
                }
            }

            impl From<Entity<$data>> for EntityRecord {
                fn from(entity: Entity<$data>) -> Self {
                    Self::$kind(entity)
                }
            }
        )*
    };
}

entity_data! {
    SceneData => Scene, scenes;
    ActorData => Actor, actors;
    ScreenElementData => ScreenElement, screen_elements;
    LevelData => Level, levels;
    CameraData => Camera, cameras;
    ComponentData => Component, components;
    SystemData => System, systems;
    PostProcessorData => PostProcessor, post_processors;
    ParticleData => Particle, particles;
    TimerData => Timer, timers;
    ScriptData => Script, scripts;
}

/// A scene.
pub type Scene = Entity<SceneData>;
/// An actor.
pub type Actor = Entity<ActorData>;
/// A level.
pub type Level = Entity<LevelData>;
/// A camera.
pub type Camera = Entity<CameraData>;
/// A custom component.
pub type Component = Entity<ComponentData>;
/// A system.
pub type System = Entity<SystemData>;
/// A post-processor.
pub type PostProcessor = Entity<PostProcessorData>;
/// A particle emitter.
pub type Particle = Entity<ParticleData>;
/// A screen element.
pub type ScreenElement = Entity<ScreenElementData>;
/// A timer.
pub type Timer = Entity<TimerData>;
/// A script.
pub type Script = Entity<ScriptData>;

/// Components every actor can use without defining them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BuiltinComponent {
    /// Input actions.
    Actions,
    /// Pointer events.
    Pointer,
    /// Position, rotation, scale.
    Transform,
    /// Drawing.
    Graphics,
    /// Velocity and acceleration.
    Motion,
    /// Physics body.
    Body,
    /// Collision shape.
    Collider,
}

impl BuiltinComponent {
    /// All built-in components.
    pub const ALL: [BuiltinComponent; 7] = [
        Self::Actions,
        Self::Pointer,
        Self::Transform,
        Self::Graphics,
        Self::Motion,
        Self::Body,
        Self::Collider,
    ];
}

impl fmt::Display for BuiltinComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A component attached to an actor: a built-in by name, or a custom
/// component by identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentRef {
    /// A built-in component.
    Builtin(BuiltinComponent),
    /// A custom component entity.
    Custom(Identifier),
}

impl FromStr for ComponentRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(builtin) = BuiltinComponent::ALL
            .into_iter()
            .find(|b| b.to_string().eq_ignore_ascii_case(s))
        {
            return Ok(Self::Builtin(builtin));
        }
        s.parse().map(Self::Custom)
    }
}

/// An entity of any kind, as returned by cross-collection lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum EntityRecord {
    Scene(Scene),
    Actor(Actor),
    Level(Level),
    Camera(Camera),
    Component(Component),
    System(System),
    PostProcessor(PostProcessor),
    Particle(Particle),
    ScreenElement(ScreenElement),
    Timer(Timer),
    Script(Script),
}

impl EntityRecord {
    /// Returns the entity's kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Scene(_) => EntityKind::Scene,
            Self::Actor(_) => EntityKind::Actor,
            Self::Level(_) => EntityKind::Level,
            Self::Camera(_) => EntityKind::Camera,
            Self::Component(_) => EntityKind::Component,
            Self::System(_) => EntityKind::System,
            Self::PostProcessor(_) => EntityKind::PostProcessor,
            Self::Particle(_) => EntityKind::Particle,
            Self::ScreenElement(_) => EntityKind::ScreenElement,
            Self::Timer(_) => EntityKind::Timer,
            Self::Script(_) => EntityKind::Script,
        }
    }

    /// Returns the entity's identifier.
    #[must_use]
    pub fn id(&self) -> Identifier {
        match self {
            Self::Scene(e) => e.id,
            Self::Actor(e) => e.id,
            Self::Level(e) => e.id,
            Self::Camera(e) => e.id,
            Self::Component(e) => e.id,
            Self::System(e) => e.id,
            Self::PostProcessor(e) => e.id,
            Self::Particle(e) => e.id,
            Self::ScreenElement(e) => e.id,
            Self::Timer(e) => e.id,
            Self::Script(e) => e.id,
        }
    }

    /// Returns the entity's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scene(e) => &e.name,
            Self::Actor(e) => &e.name,
            Self::Level(e) => &e.name,
            Self::Camera(e) => &e.name,
            Self::Component(e) => &e.name,
            Self::System(e) => &e.name,
            Self::PostProcessor(e) => &e.name,
            Self::Particle(e) => &e.name,
            Self::ScreenElement(e) => &e.name,
            Self::Timer(e) => &e.name,
            Self::Script(e) => &e.name,
        }
    }
}

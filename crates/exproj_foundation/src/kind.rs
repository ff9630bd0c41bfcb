//! Entity kind tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// The kind tag carried by every entity record.
///
/// Serialized as the upper-case tag used in project files (`"SCENE"`,
/// `"SCREENELEMENT"`, ...).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    /// A scene.
    Scene,
    /// An actor.
    Actor,
    /// A level.
    Level,
    /// A camera.
    Camera,
    /// A custom component with a property schema.
    Component,
    /// A system.
    System,
    /// A post-processor.
    #[serde(rename = "POSTPROCESSOR")]
    PostProcessor,
    /// A particle emitter.
    Particle,
    /// A screen (UI) element.
    #[serde(rename = "SCREENELEMENT")]
    ScreenElement,
    /// A timer.
    Timer,
    /// A script.
    Script,
}

impl EntityKind {
    /// Every kind, in the order `find_by_id` scans collections.
    pub const ALL: [EntityKind; 11] = [
        Self::Scene,
        Self::Actor,
        Self::ScreenElement,
        Self::Level,
        Self::Camera,
        Self::Component,
        Self::System,
        Self::PostProcessor,
        Self::Particle,
        Self::Timer,
        Self::Script,
    ];

    /// Returns the tag as written in project files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Scene => "SCENE",
            Self::Actor => "ACTOR",
            Self::Level => "LEVEL",
            Self::Camera => "CAMERA",
            Self::Component => "COMPONENT",
            Self::System => "SYSTEM",
            Self::PostProcessor => "POSTPROCESSOR",
            Self::Particle => "PARTICLE",
            Self::ScreenElement => "SCREENELEMENT",
            Self::Timer => "TIMER",
            Self::Script => "SCRIPT",
        }
    }

    /// Returns true if entities of this kind can be placed into a scene's
    /// element order.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        matches!(
            self,
            Self::Actor | Self::Level | Self::Timer | Self::ScreenElement | Self::Camera
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Parses a kind case-insensitively, accepting both the file tag
    /// (`postprocessor`) and the hyphenated section form (`post-processor`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == normalized)
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput(format!("unknown entity kind: {s}"))))
    }
}

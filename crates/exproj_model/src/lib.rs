//! Project document model for Exproj.
//!
//! This crate provides:
//! - [`ProjectDocument`] - The root aggregate owning every entity collection
//! - [`Entity`] - Named, identified records with kind-specific payloads
//! - [`PropertySchema`] - Recursive property definitions for custom components
//! - [`SceneElement`] - Per-scene placement order
//! - [`project_tree`] - The derived navigation tree

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document;
pub mod engine;
pub mod entity;
pub mod scene_order;
pub mod schema;
pub mod tree;

pub use document::{Deletion, DocumentTag, PartialDocument, ProjectDocument};
pub use engine::{CanvasSize, DisplayMode, EngineConfig};
pub use entity::{
    Actor, ActorData, BuiltinComponent, Camera, CameraData, Component, ComponentData,
    ComponentRef, Entity, EntityData, EntityRecord, Level, LevelData, Particle, ParticleData,
    PostProcessor, PostProcessorData, Scene, SceneData, ScreenElement, ScreenElementData, Script,
    ScriptData, System, SystemData, Timer, TimerData,
};
pub use scene_order::SceneElement;
pub use schema::{PropertyNode, PropertySchema, PropertyType};
pub use tree::{NodeType, TreeNode, capitalize_first, project_tree};

//! Exproj - project document engine for a game-engine authoring tool
//!
//! This crate re-exports all layers of the Exproj system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: exproj_runtime     store, persistence, service actor, shell
//! Layer 1: exproj_model       entities, document, property schemas, tree projection
//! Layer 0: exproj_foundation  Core types (Identifier, Timestamp, Error)
//! ```

pub use exproj_foundation as foundation;
pub use exproj_model as model;
pub use exproj_runtime as runtime;

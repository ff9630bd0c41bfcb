//! Core identifiers, timestamps, and error types for Exproj.
//!
//! This crate provides:
//! - [`Identifier`] - Globally unique entity identifiers
//! - [`EntityKind`] - The closed set of entity kinds a project holds
//! - [`Timestamp`] - Millisecond wall-clock timestamps
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod id;
mod kind;
mod timestamp;

pub use error::{Error, ErrorContext, ErrorKind, PropertyPath};
pub use id::Identifier;
pub use kind::EntityKind;
pub use timestamp::Timestamp;

/// Result type alias using Exproj's Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! Project store, persistence, service, and shell for Exproj.
//!
//! This crate provides:
//! - [`ProjectStore`] - The open document and the file it lives in
//! - [`ProjectService`] - A thread owning the store, answering requests in order
//! - [`PathChooser`] - Asking the user for project file paths
//! - [`Shell`] - Interactive command shell over a service handle
//! - JSON serialization of project files

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chooser;
pub mod config;
pub mod editor;
pub mod serialize;
pub mod service;
pub mod shell;
pub mod store;

pub use chooser::{PathChooser, PromptChooser, ScriptedChooser};
pub use config::StoreConfig;
pub use editor::{LineEditor, ReadResult, ReaderEditor, RustylineEditor, StdinEditor};
pub use service::{
    OrderEdit, ProjectHandle, ProjectService, Request, Response, SchemaEdit, UiEvent,
};
pub use shell::{Command, Shell, parse_command, render_tree};
pub use store::ProjectStore;

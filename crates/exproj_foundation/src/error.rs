//! Error types for the Exproj system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::id::Identifier;
use crate::kind::EntityKind;

/// The main error type for Exproj operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: Identifier) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a duplicate identifier error.
    #[must_use]
    pub fn duplicate_identifier(id: Identifier) -> Self {
        Self::new(ErrorKind::DuplicateIdentifier(id))
    }

    /// Creates a wrong kind error.
    #[must_use]
    pub fn wrong_kind(id: Identifier, expected: EntityKind, actual: EntityKind) -> Self {
        Self::new(ErrorKind::WrongKind {
            id,
            expected,
            actual,
        })
    }

    /// Creates a duplicate sibling property error.
    #[must_use]
    pub fn duplicate_property(path: PropertyPath, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateProperty {
            path,
            name: name.into(),
        })
    }

    /// Creates a property not found error.
    #[must_use]
    pub fn property_not_found(path: PropertyPath, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::PropertyNotFound {
            path,
            name: name.into(),
        })
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse(message.into()))
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput(message.into()))
    }

    /// Returns true if this error rejects a mutation because it would break
    /// a document invariant.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DuplicateIdentifier(_) | ErrorKind::DuplicateProperty { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The project file exists but is not a well-formed document.
    #[error("parse error: {0}")]
    Parse(String),

    /// Directory creation, read, or write failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// An identifier would appear more than once across all collections.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(Identifier),

    /// A sibling property with the same name already exists.
    #[error("duplicate property '{name}' at {path}")]
    DuplicateProperty {
        /// Path of the mapping holding the siblings.
        path: PropertyPath,
        /// The colliding name.
        name: String,
    },

    /// No property with this name exists at the path.
    #[error("property not found: '{name}' at {path}")]
    PropertyNotFound {
        /// Path of the mapping that was searched.
        path: PropertyPath,
        /// The missing name.
        name: String,
    },

    /// A path segment addresses a property that cannot hold children.
    #[error("property at {0} is not an object")]
    NotAnObject(PropertyPath),

    /// No entity with this identifier exists.
    #[error("entity not found: {0}")]
    EntityNotFound(Identifier),

    /// The entity exists but is of a different kind than required.
    #[error("entity {id} is a {actual}, expected {expected}")]
    WrongKind {
        /// The entity that was looked up.
        id: Identifier,
        /// The kind the operation requires.
        expected: EntityKind,
        /// The kind the entity actually has.
        actual: EntityKind,
    },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: usize,
        /// The actual length of the collection.
        length: usize,
    },

    /// No project root and file name have been configured.
    #[error("no project path configured")]
    NoProjectPath,

    /// A request could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The document-owning service has shut down.
    #[error("project service is not running")]
    ServiceClosed,

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Path from a component's root schema down to a nested mapping.
///
/// The empty path addresses the root mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    /// Returns the root path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns true if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this path extended by one segment.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }
}

impl<S: Into<String>> FromIterator<S> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for PropertyPath {
    fn from(segments: &[&str]) -> Self {
        segments.iter().copied().collect()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// File path or request name.
    pub source: Option<String>,
    /// Stack of operations that led to the error.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

//! Project file serialization using JSON.
//!
//! Project files are UTF-8 JSON, pretty-printed with two-space indentation
//! unless compact output is requested.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use exproj_foundation::{Error, ErrorContext, ErrorKind, Result};
use exproj_model::ProjectDocument;

/// Serializes a document to JSON text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_string(doc: &ProjectDocument, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    text.map_err(|e| Error::new(ErrorKind::Internal(format!("failed to serialize project: {e}"))))
}

/// Parses a document from JSON text and checks its invariants.
///
/// # Errors
///
/// Returns a parse error if the text is not a well-formed project document
/// or carries mistagged entities, and a duplicate identifier error if an
/// identifier appears twice.
pub fn from_str(text: &str) -> Result<ProjectDocument> {
    let doc: ProjectDocument =
        serde_json::from_str(text).map_err(|e| Error::parse(format!("invalid project file: {e}")))?;
    doc.validate().map_err(|e| match e.kind {
        ErrorKind::InvalidInput(message) => Error::parse(format!("invalid project file: {message}")),
        _ => e,
    })?;
    Ok(doc)
}

/// Saves a document to a file, creating missing parent directories.
///
/// Overwrites the file if it exists.
///
/// # Errors
///
/// Returns an error if a directory cannot be created, the file cannot be
/// written, or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(doc: &ProjectDocument, path: P, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let context = || ErrorContext::new().with_source(path.display().to_string());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::io(format!(
                "failed to create directory '{}': {e}",
                parent.display()
            ))
            .with_context(context())
        })?;
    }

    let text = to_string(doc, pretty)?;
    fs::write(path, text).map_err(|e| {
        Error::io(format!("failed to write file '{}': {e}", path.display())).with_context(context())
    })
}

/// Loads a document from a file.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Option<ProjectDocument>> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(
                Error::io(format!("failed to read file '{}': {e}", path.display()))
                    .with_context(ErrorContext::new().with_source(path.display().to_string())),
            );
        }
    };

    from_str(&text)
        .map(Some)
        .map_err(|e| e.with_context(ErrorContext::new().with_source(path.display().to_string())))
}

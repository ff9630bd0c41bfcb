//! The project store: the single owner of the open document and its file.

use std::path::{Path, PathBuf};

use exproj_foundation::{Error, ErrorKind, Identifier, Result};
use exproj_model::{EntityRecord, PartialDocument, ProjectDocument, TreeNode, project_tree};
use log::{debug, info};

use crate::config::StoreConfig;
use crate::serialize;

/// Holds the open project document and where it is persisted.
///
/// The file lives at `<root>/<file_name>`. Both parts are pure configuration;
/// nothing touches the disk until [`load`](Self::load) or [`save`](Self::save).
#[derive(Debug)]
pub struct ProjectStore {
    /// The open document.
    document: ProjectDocument,

    /// Directory holding the project file.
    root: Option<PathBuf>,

    /// Project file name within `root`.
    file_name: Option<String>,

    config: StoreConfig,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ProjectStore {
    /// Creates a store holding an empty `Untitled` document and no path.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            document: ProjectDocument::default(),
            root: None,
            file_name: None,
            config,
        }
    }

    /// Replaces the held document without persisting it.
    #[must_use]
    pub fn with_document(mut self, document: ProjectDocument) -> Self {
        self.document = document;
        self
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Sets the directory holding the project file.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = Some(root.into());
    }

    /// Sets the project file name.
    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    /// Splits a full project file path into root and file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no file name component.
    pub fn set_path(&mut self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::invalid_input(format!("not a project file path: {}", path.display()))
            })?;
        self.set_file_name(file_name);
        self.set_root(path.parent().map(Path::to_path_buf).unwrap_or_default());
        Ok(())
    }

    /// Returns the configured project file path.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoProjectPath`] unless both root and file name are set.
    pub fn path(&self) -> Result<PathBuf> {
        match (&self.root, &self.file_name) {
            (Some(root), Some(name)) => Ok(root.join(name)),
            _ => Err(Error::new(ErrorKind::NoProjectPath)),
        }
    }

    /// Replaces the document with a fresh starter document.
    pub fn reset_to_defaults(&mut self) {
        self.document = ProjectDocument::starter(&self.config.default_project_name);
        debug!("reset project to defaults");
    }

    /// Returns the open document.
    #[must_use]
    pub const fn document(&self) -> &ProjectDocument {
        &self.document
    }

    /// Returns a snapshot of the open document. Collections are shared with
    /// the store until either side changes them.
    #[must_use]
    pub fn snapshot(&self) -> ProjectDocument {
        self.document.clone()
    }

    /// Merges `partial` into the document, refreshes `lastOpened`, and saves.
    ///
    /// Fields absent from `partial` keep their current values.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the document unchanged if the merge would
    /// break a document invariant. If the merge succeeds but saving fails, the
    /// merged document is kept and the save error is returned.
    pub fn update(&mut self, partial: PartialDocument) -> Result<ProjectDocument> {
        let mut merged = self.document.merged(partial)?;
        merged.touch();
        self.document = merged;
        self.save()?;
        Ok(self.snapshot())
    }

    /// Applies an edit to a copy of the document and, if it succeeds, installs
    /// the copy, refreshes `lastOpened`, and saves.
    ///
    /// # Errors
    ///
    /// Returns the edit's error with the document unchanged, or the save error
    /// with the edited document kept.
    pub fn apply<T>(&mut self, edit: impl FnOnce(&mut ProjectDocument) -> Result<T>) -> Result<T> {
        let mut next = self.document.clone();
        let output = edit(&mut next)?;
        next.touch();
        self.document = next;
        self.save()?;
        Ok(output)
    }

    /// Reloads the document from the project file.
    ///
    /// Returns `false`, keeping the current document, if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured or the file cannot be read
    /// or parsed.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.path()?;
        match serialize::load_from_file(&path)? {
            Some(document) => {
                info!("loaded project '{}' from {}", document.name, path.display());
                self.document = document;
                Ok(true)
            }
            None => {
                debug!("no project file at {}, keeping current document", path.display());
                Ok(false)
            }
        }
    }

    /// Writes the full document to the project file.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = self.path()?;
        serialize::save_to_file(&self.document, &path, self.config.pretty)?;
        debug!("saved project '{}' to {}", self.document.name, path.display());
        Ok(())
    }

    /// Finds an entity of any kind by identifier.
    #[must_use]
    pub fn find_by_id(&self, id: Identifier) -> Option<EntityRecord> {
        self.document.find_by_id(id)
    }

    /// Builds the navigation tree for the open document.
    #[must_use]
    pub fn project_tree(&self) -> TreeNode {
        project_tree(&self.document)
    }
}

//! Project path selection.
//!
//! Choosing a path is the only user interaction the service performs on its
//! own. `None` means the user cancelled.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use exproj_foundation::{Error, Result};

use crate::config::StoreConfig;
use crate::editor::{LineEditor, ReadResult};

/// Asks the user for a project file path.
pub trait PathChooser {
    /// Chooses an existing project file to open.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be asked, or names a file that is
    /// not a project file.
    fn choose_existing(&mut self) -> Result<Option<PathBuf>>;

    /// Chooses where to create a new project file.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be asked.
    fn choose_new(&mut self) -> Result<Option<PathBuf>>;
}

impl<C: PathChooser + ?Sized> PathChooser for Box<C> {
    fn choose_existing(&mut self) -> Result<Option<PathBuf>> {
        (**self).choose_existing()
    }

    fn choose_new(&mut self) -> Result<Option<PathBuf>> {
        (**self).choose_new()
    }
}

/// Prompts for paths on a line editor.
pub struct PromptChooser<E> {
    editor: E,
    extension: String,
    default_file_name: String,
}

impl<E: LineEditor> PromptChooser<E> {
    /// Creates a chooser that reads answers from `editor`.
    pub fn new(editor: E, config: &StoreConfig) -> Self {
        Self {
            editor,
            extension: config.extension.clone(),
            default_file_name: config.default_file_name(),
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.read_line(prompt)? {
            ReadResult::Line(line) => Ok(Some(line.trim().to_string())),
            ReadResult::Interrupted | ReadResult::Eof => Ok(None),
        }
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

impl<E: LineEditor> PathChooser for PromptChooser<E> {
    fn choose_existing(&mut self) -> Result<Option<PathBuf>> {
        let prompt = format!("open project (*.{}): ", self.extension);
        let Some(answer) = self.ask(&prompt)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(answer);
        if !self.has_extension(&path) {
            return Err(Error::invalid_input(format!(
                "not a .{} file: {}",
                self.extension,
                path.display()
            )));
        }
        Ok(Some(path))
    }

    fn choose_new(&mut self) -> Result<Option<PathBuf>> {
        let prompt = format!("new project [{}]: ", self.default_file_name);
        let Some(answer) = self.ask(&prompt)? else {
            return Ok(None);
        };

        let mut path = if answer.is_empty() {
            PathBuf::from(&self.default_file_name)
        } else {
            PathBuf::from(answer)
        };
        if !self.has_extension(&path) {
            let mut name = path.into_os_string();
            name.push(".");
            name.push(&self.extension);
            path = PathBuf::from(name);
        }
        Ok(Some(path))
    }
}

/// Answers from a prepared list, then cancels.
///
/// Used for non-interactive runs and in tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChooser {
    existing: VecDeque<Option<PathBuf>>,
    new: VecDeque<Option<PathBuf>>,
}

impl ScriptedChooser {
    /// Creates a chooser that cancels every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an answer for the next `choose_existing` call.
    #[must_use]
    pub fn with_existing(mut self, path: Option<PathBuf>) -> Self {
        self.existing.push_back(path);
        self
    }

    /// Queues an answer for the next `choose_new` call.
    #[must_use]
    pub fn with_new(mut self, path: Option<PathBuf>) -> Self {
        self.new.push_back(path);
        self
    }
}

impl PathChooser for ScriptedChooser {
    fn choose_existing(&mut self) -> Result<Option<PathBuf>> {
        Ok(self.existing.pop_front().flatten())
    }

    fn choose_new(&mut self) -> Result<Option<PathBuf>> {
        Ok(self.new.pop_front().flatten())
    }
}

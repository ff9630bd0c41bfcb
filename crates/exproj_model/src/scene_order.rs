//! Per-scene element ordering.
//!
//! Each scene records which actors, levels, timers, screen elements, and
//! cameras are placed into it, and in what order they render and update.
//! Entries are never deduplicated: the same entity may be placed twice.

use exproj_foundation::{EntityKind, Error, ErrorKind, Identifier, Result};
use serde::{Deserialize, Serialize};

use crate::document::ProjectDocument;
use crate::entity::SceneData;

/// One placement in a scene's element order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneElement {
    /// Kind of the placed entity.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Identifier of the placed entity.
    pub id: Identifier,
    /// Name of the placed entity when it was placed.
    pub name: String,
}

impl SceneData {
    /// Appends an entry at the end of the order.
    pub fn push_element(&mut self, element: SceneElement) {
        self.elements.push(element);
    }

    /// Removes the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn remove_element(&mut self, index: usize) -> Result<SceneElement> {
        self.check_index(index)?;
        Ok(self.elements.remove(index))
    }

    /// Swaps the entry at `index` with the one before it.
    ///
    /// Moving the first entry up is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn move_element_up(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if index > 0 {
            self.elements.swap(index - 1, index);
        }
        Ok(())
    }

    /// Swaps the entry at `index` with the one after it.
    ///
    /// Moving the last entry down is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn move_element_down(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if index + 1 < self.elements.len() {
            self.elements.swap(index, index + 1);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.elements.len() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::IndexOutOfBounds {
                index,
                length: self.elements.len(),
            }))
        }
    }
}

impl ProjectDocument {
    /// Places `entity` at the end of `scene`'s element order.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing, if `scene` is not a
    /// scene, or if `entity` is of a kind that cannot be placed.
    pub fn place_in_scene(&mut self, scene: Identifier, entity: Identifier) -> Result<()> {
        let record = self
            .find_by_id(entity)
            .ok_or_else(|| Error::entity_not_found(entity))?;
        if !record.kind().is_placeable() {
            return Err(Error::invalid_input(format!(
                "{} entities cannot be placed into a scene",
                record.kind()
            )));
        }
        let element = SceneElement {
            kind: record.kind(),
            id: record.id(),
            name: record.name().to_string(),
        };
        self.scene_mut(scene)?.data.push_element(element);
        Ok(())
    }

    /// Removes the entry at `index` from `scene`'s element order.
    ///
    /// # Errors
    ///
    /// Returns an error if `scene` is not a scene or `index` is out of bounds.
    pub fn remove_from_scene(&mut self, scene: Identifier, index: usize) -> Result<SceneElement> {
        self.scene_mut(scene)?.data.remove_element(index)
    }

    /// Moves the entry at `index` one step earlier in `scene`'s order.
    ///
    /// # Errors
    ///
    /// Returns an error if `scene` is not a scene or `index` is out of bounds.
    pub fn move_scene_element_up(&mut self, scene: Identifier, index: usize) -> Result<()> {
        self.scene_mut(scene)?.data.move_element_up(index)
    }

    /// Moves the entry at `index` one step later in `scene`'s order.
    ///
    /// # Errors
    ///
    /// Returns an error if `scene` is not a scene or `index` is out of bounds.
    pub fn move_scene_element_down(&mut self, scene: Identifier, index: usize) -> Result<()> {
        self.scene_mut(scene)?.data.move_element_down(index)
    }
}

//! Property schemas for custom components.
//!
//! A schema is a tree of named property nodes. Every edit is addressed by a
//! path of property names from the root mapping down to the mapping being
//! edited; the empty path is the root.

use exproj_foundation::{Error, ErrorKind, PropertyPath, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a property.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Text.
    String,
    /// Numeric value.
    Number,
    /// True or false.
    Boolean,
    /// 2D vector.
    Vector,
    /// Nested named properties.
    Object,
}

impl PropertyType {
    /// Parses a type name as written in project files.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known type.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" | "bool" => Ok(Self::Boolean),
            "vector" => Ok(Self::Vector),
            "object" => Ok(Self::Object),
            other => Err(Error::invalid_input(format!("unknown property type: {other}"))),
        }
    }
}

/// One node of a property schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: PropertyType,
    /// Child properties; only meaningful for `object` nodes and absent until
    /// first materialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<PropertySchema>,
}

impl PropertyNode {
    /// Creates a node; `object` nodes start with an empty child mapping.
    #[must_use]
    pub fn new(ty: PropertyType) -> Self {
        let nested = (ty == PropertyType::Object).then(PropertySchema::default);
        Self { ty, nested }
    }
}

/// Mapping from property name to node, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySchema(IndexMap<String, PropertyNode>);

impl PropertySchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of properties at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no properties at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the properties at this level, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Returns the property with this name at this level.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyNode> {
        self.0.get(name)
    }

    /// Returns the mapping addressed by `path`, if it exists.
    #[must_use]
    pub fn at(&self, path: &[&str]) -> Option<&PropertySchema> {
        let mut current = self;
        for segment in path {
            current = current.0.get(*segment)?.nested.as_ref()?;
        }
        Some(current)
    }

    /// Adds a property to the mapping at `path`.
    ///
    /// Object nodes along the path that have never been expanded get an
    /// empty child mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve to an object, or if a
    /// sibling with this name already exists.
    pub fn add(&mut self, path: &[&str], name: &str, ty: PropertyType) -> Result<()> {
        let siblings = self
            .siblings_mut(path, true)?
            .ok_or_else(|| Error::new(ErrorKind::Internal("materialized path missing".into())))?;
        if siblings.contains_key(name) {
            return Err(Error::duplicate_property(PropertyPath::from(path), name));
        }
        siblings.insert(name.to_string(), PropertyNode::new(ty));
        Ok(())
    }

    /// Renames a property, keeping its position, type, and children.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist or if `new_name`
    /// collides with another sibling.
    pub fn rename(&mut self, path: &[&str], old_name: &str, new_name: &str) -> Result<()> {
        let siblings = self.existing_siblings_mut(path, old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if siblings.contains_key(new_name) {
            return Err(Error::duplicate_property(PropertyPath::from(path), new_name));
        }
        let entries = std::mem::take(siblings);
        *siblings = entries
            .into_iter()
            .map(|(name, node)| {
                if name == old_name {
                    (new_name.to_string(), node)
                } else {
                    (name, node)
                }
            })
            .collect();
        Ok(())
    }

    /// Changes a property's declared type.
    ///
    /// Narrowing an object to any other type drops its children; the dropped
    /// mapping is returned (when non-empty) so the caller can warn about it.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist.
    pub fn retype(
        &mut self,
        path: &[&str],
        name: &str,
        ty: PropertyType,
    ) -> Result<Option<PropertySchema>> {
        let siblings = self.existing_siblings_mut(path, name)?;
        let node = siblings
            .get_mut(name)
            .ok_or_else(|| Error::property_not_found(PropertyPath::from(path), name))?;
        node.ty = ty;
        if ty == PropertyType::Object {
            node.nested.get_or_insert_with(PropertySchema::default);
            Ok(None)
        } else {
            Ok(node.nested.take().filter(|nested| !nested.is_empty()))
        }
    }

    /// Removes a property and its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist.
    pub fn delete(&mut self, path: &[&str], name: &str) -> Result<PropertyNode> {
        let siblings = self.existing_siblings_mut(path, name)?;
        siblings
            .shift_remove(name)
            .ok_or_else(|| Error::property_not_found(PropertyPath::from(path), name))
    }

    /// Materializes an empty child mapping on the object node at `path`.
    ///
    /// Does nothing if the node already has children; the root is always
    /// materialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or is not an object.
    pub fn expand(&mut self, path: &[&str]) -> Result<()> {
        let Some((last, parent)) = path.split_last() else {
            return Ok(());
        };
        let siblings = self.existing_siblings_mut(parent, last)?;
        let node = siblings
            .get_mut(*last)
            .ok_or_else(|| Error::property_not_found(PropertyPath::from(parent), *last))?;
        if node.ty != PropertyType::Object {
            return Err(Error::new(ErrorKind::NotAnObject(PropertyPath::from(path))));
        }
        node.nested.get_or_insert_with(PropertySchema::default);
        Ok(())
    }

    /// Resolves the sibling mapping that must contain `name`.
    fn existing_siblings_mut(
        &mut self,
        path: &[&str],
        name: &str,
    ) -> Result<&mut IndexMap<String, PropertyNode>> {
        let siblings = self
            .siblings_mut(path, false)?
            .ok_or_else(|| Error::property_not_found(PropertyPath::from(path), name))?;
        if siblings.contains_key(name) {
            Ok(siblings)
        } else {
            Err(Error::property_not_found(PropertyPath::from(path), name))
        }
    }

    /// Walks `path` down to a child mapping.
    ///
    /// Returns `Ok(None)` when an object along the way has no children yet
    /// and `materialize` is false.
    fn siblings_mut(
        &mut self,
        path: &[&str],
        materialize: bool,
    ) -> Result<Option<&mut IndexMap<String, PropertyNode>>> {
        let mut current = &mut self.0;
        for (depth, segment) in path.iter().enumerate() {
            let node = current
                .get_mut(*segment)
                .ok_or_else(|| Error::property_not_found(PropertyPath::from(&path[..depth]), *segment))?;
            if node.ty != PropertyType::Object {
                return Err(Error::new(ErrorKind::NotAnObject(PropertyPath::from(
                    &path[..=depth],
                ))));
            }
            if materialize {
                current = &mut node.nested.get_or_insert_with(PropertySchema::default).0;
            } else {
                match node.nested.as_mut() {
                    Some(nested) => current = &mut nested.0,
                    None => return Ok(None),
                }
            }
        }
        Ok(Some(current))
    }
}

//! Navigation tree derived from a project document.
//!
//! The tree is a disposable snapshot: it owns copies of titles and
//! identifiers and holds no reference back into the document.

use exproj_foundation::EntityKind;
use serde::{Deserialize, Serialize};

use crate::document::ProjectDocument;

/// Role of a node in the navigation tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// The single root.
    Project,
    /// One per entity kind.
    Section,
    /// One per entity.
    Element,
}

/// A node of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Project name, section key, or entity identifier.
    pub id: String,
    /// Node role.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display title.
    pub title: String,
    /// Child nodes; element nodes have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Returns the children, or an empty slice for element nodes.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Finds the section node with the given key.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&TreeNode> {
        self.children()
            .iter()
            .find(|n| n.node_type == NodeType::Section && n.id == key)
    }
}

/// Section key, section title, entity kind, and whether the section is shown
/// even when empty.
const SECTIONS: [(&str, &str, EntityKind, bool); 11] = [
    ("scenes", "Scenes", EntityKind::Scene, true),
    ("actors", "Actors", EntityKind::Actor, true),
    ("screen-elements", "Screen-Elements", EntityKind::ScreenElement, true),
    ("levels", "Levels", EntityKind::Level, true),
    ("components", "Components", EntityKind::Component, true),
    ("systems", "Systems", EntityKind::System, true),
    ("camera", "Camera", EntityKind::Camera, true),
    ("post-processors", "Post-Processors", EntityKind::PostProcessor, true),
    ("particles", "Particles", EntityKind::Particle, true),
    ("timers", "Timers", EntityKind::Timer, false),
    ("scripts", "Scripts", EntityKind::Script, false),
];

/// Returns the section key used for entities of this kind.
#[must_use]
pub fn section_key(kind: EntityKind) -> &'static str {
    SECTIONS
        .iter()
        .find(|(_, _, k, _)| *k == kind)
        .map_or("", |(key, _, _, _)| key)
}

/// Builds the navigation tree for `doc`.
///
/// The result depends only on the document: calling this twice on an
/// unchanged document gives equal trees.
#[must_use]
pub fn project_tree(doc: &ProjectDocument) -> TreeNode {
    let sections = SECTIONS
        .iter()
        .filter(|(_, _, kind, always)| *always || doc.len(*kind) > 0)
        .map(|(key, title, kind, _)| TreeNode {
            id: (*key).to_string(),
            node_type: NodeType::Section,
            title: (*title).to_string(),
            children: Some(
                doc.entries(*kind)
                    .into_iter()
                    .map(|(id, name)| TreeNode {
                        id: id.to_string(),
                        node_type: NodeType::Element,
                        title: capitalize_first(name),
                        children: None,
                    })
                    .collect(),
            ),
        })
        .collect();

    TreeNode {
        id: doc.name.clone(),
        node_type: NodeType::Project,
        title: doc.name.clone(),
        children: Some(sections),
    }
}

/// Upper-cases the first character of `name`, leaving the rest untouched.
#[must_use]
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Nodes of the lineage graph.

use crate::layout::Position;
use serde::{Deserialize, Serialize};
use village_core::{Character, CharacterMetadata};

/// One character placed in the lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Character id.
    pub id: String,

    pub name: String,

    /// Lineage depth, 0 for roots and orphans.
    pub generation: u32,

    pub position: Position,

    /// Parsed metadata, or the placeholder when unreadable.
    pub metadata: CharacterMetadata,

    /// The record this node was built from.
    pub character: Character,
}

impl GraphNode {
    pub(crate) fn new(character: &Character, generation: u32, position: Position) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            generation,
            position,
            metadata: character.metadata_lossy(),
            character: character.clone(),
        }
    }

    /// Image URL for rendering, if the metadata had one.
    pub fn image(&self) -> Option<&str> {
        self.metadata.image.as_deref()
    }
}

/// Lightweight node summary for query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    pub generation: u32,
    pub image: Option<String>,
}

impl From<&GraphNode> for NodeInfo {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            generation: node.generation,
            image: node.metadata.image.clone(),
        }
    }
}

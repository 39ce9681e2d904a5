//! Edge types for the lineage graph.
//!
//! Every edge points from a parent to a child. The parent slot is kept so a
//! renderer can tell the two parents apart.

use serde::{Deserialize, Serialize};

/// The type of relationship between two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Source is a parent of target.
    Parent,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
        }
    }
}

/// Edge weight stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The kind of relationship.
    pub kind: EdgeKind,

    /// Index of the parent slot on the child record.
    pub slot: usize,
}

impl Edge {
    /// Creates a parent edge for the given slot.
    pub fn parent(slot: usize) -> Self {
        Self {
            kind: EdgeKind::Parent,
            slot,
        }
    }
}

/// A simplified edge for export/visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Parent id.
    pub source: String,
    /// Child id.
    pub target: String,
    pub kind: EdgeKind,
}

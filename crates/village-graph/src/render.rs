//! Render-ready export of a lineage graph.
//!
//! The `{nodes, links}` shape is what force-directed canvas renderers take
//! as input. Positions are the initial layout; the renderer may relax them.

use crate::edge::{EdgeKind, GraphEdge};
use crate::node::GraphNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub x: f64,
    pub y: f64,
    pub description: String,
    pub image: Option<String>,
}

impl From<&GraphNode> for RenderNode {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            level: node.generation,
            x: node.position.x,
            y: node.position.y,
            description: node.metadata.description.clone(),
            image: node.metadata.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl From<GraphEdge> for RenderLink {
    fn from(edge: GraphEdge) -> Self {
        Self {
            source: edge.source,
            target: edge.target,
            kind: edge.kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
}

impl RenderGraph {
    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

//! Core graph data structure.
//!
//! The LineageGraph wraps petgraph and adds indexes for id and generation
//! lookups. It is produced by [`crate::LineageBuilder`] and never edited in
//! place afterwards; a new character list means a new graph.

use crate::edge::{Edge, GraphEdge};
use crate::node::{GraphNode, NodeInfo};
use crate::render::{RenderGraph, RenderLink, RenderNode};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The bloodline graph of one character set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraph {
    /// Nodes in input order; edges point parent → child.
    pub(crate) graph: DiGraph<GraphNode, Edge>,

    /// Maps character ids to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Node indexes grouped by generation, each group in input order.
    generation_index: BTreeMap<u32, Vec<NodeId>>,
}

impl Default for LineageGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl LineageGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            generation_index: BTreeMap::new(),
        }
    }

    /// Adds a node. Returns the existing index if the id is already present.
    pub(crate) fn add_node(&mut self, node: GraphNode) -> NodeId {
        if let Some(&existing) = self.id_index.get(&node.id) {
            return existing;
        }

        let id = node.id.clone();
        let generation = node.generation;
        let index = self.graph.add_node(node);

        self.id_index.insert(id, index);
        self.generation_index
            .entry(generation)
            .or_default()
            .push(index);

        index
    }

    pub(crate) fn add_edge(&mut self, parent: NodeId, child: NodeId, edge: Edge) {
        self.graph.add_edge(parent, child, edge);
    }

    /// Gets a node by character id.
    pub fn get_by_id(&self, id: &str) -> Option<&GraphNode> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&GraphNode> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a character id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// True when a character with this id is in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Generation of a character, if present.
    pub fn generation_of(&self, id: &str) -> Option<u32> {
        self.get_by_id(id).map(|node| node.generation)
    }

    /// Nodes of generation 0 (roots and orphans), in input order.
    pub fn roots(&self) -> Vec<&GraphNode> {
        self.generation(0)
    }

    /// Nodes of one generation, in input order.
    pub fn generation(&self, generation: u32) -> Vec<&GraphNode> {
        self.generation_index
            .get(&generation)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Character ids grouped by generation.
    pub fn generations(&self) -> BTreeMap<u32, Vec<String>> {
        self.generation_index
            .iter()
            .map(|(generation, indexes)| {
                let ids = indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .map(|node| node.id.clone())
                    .collect();
                (*generation, ids)
            })
            .collect()
    }

    /// Deepest generation, or `None` for an empty graph.
    pub fn max_generation(&self) -> Option<u32> {
        self.generation_index.keys().next_back().copied()
    }

    /// Parents of a node present in the graph.
    pub fn parents_of(&self, index: NodeId) -> Vec<&GraphNode> {
        self.neighbors(index, Direction::Incoming)
    }

    /// Children of a node.
    pub fn children_of(&self, index: NodeId) -> Vec<&GraphNode> {
        self.neighbors(index, Direction::Outgoing)
    }

    /// Neighbors in input order, without duplicates.
    fn neighbors(&self, index: NodeId, direction: Direction) -> Vec<&GraphNode> {
        let mut indexes: Vec<NodeId> = self.graph.neighbors_directed(index, direction).collect();
        indexes.sort();
        indexes.dedup();
        indexes
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Searches for nodes whose name contains the query, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<&GraphNode> {
        let query_lower = query.to_lowercase();
        self.graph
            .node_weights()
            .filter(|node| node.name.to_lowercase().contains(&query_lower))
            .collect()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Returns all edges with parent and child ids, in creation order.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .filter_map(|edge_ref| {
                let source = self.graph.node_weight(edge_ref.source())?;
                let target = self.graph.node_weight(edge_ref.target())?;
                Some(GraphEdge {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    kind: edge_ref.weight().kind,
                })
            })
            .collect()
    }

    /// Converts the graph into the `{nodes, links}` shape renderers consume.
    pub fn to_render_graph(&self) -> RenderGraph {
        RenderGraph {
            nodes: self.nodes().map(RenderNode::from).collect(),
            links: self
                .export_edges()
                .into_iter()
                .map(RenderLink::from)
                .collect(),
        }
    }

    /// Summary for a node.
    pub fn info(&self, index: NodeId) -> Option<NodeInfo> {
        self.get(index).map(NodeInfo::from)
    }
}

/// Graph statistics for the info endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub generations: usize,
    pub roots: usize,
}

impl LineageGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            generations: self.generation_index.len(),
            roots: self.roots().len(),
        }
    }
}
